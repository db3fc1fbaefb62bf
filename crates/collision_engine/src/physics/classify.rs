//! Interaction classification
//!
//! Decides what a touching pair means this tick: nothing, a mount, a
//! platform ride or a plain bump. Classification only reads the two bodies;
//! acting on the result is left to the collision system.

use log::trace;

use crate::core::config::PhysicsConfig;
use crate::ecs::components::{AttachmentKind, CollisionFlags};
use crate::ecs::EntityId;
use crate::physics::collision::{swept_intersection, OctAxis, PlatformSides, SweptHit};
use crate::physics::platform::{platform_candidate, PlatformCandidate};
use crate::physics::BodyRef;

/// Why a pair does not interact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// One side has collisions disabled
    CollisionDisabled,
    /// Neither side has an interaction size and neither is a platform
    NoInteractionSize,
    /// An item touching something that is not a platform
    ItemContact,
    /// One side recently dismounted the other
    DismountCooldown,
    /// One side is riding the other as a mount
    AlreadyMounted,
    /// Both sides are immovable
    BothImmovable,
    /// The swept volumes never overlap this tick
    Apart,
}

/// Outcome of classifying a pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interaction {
    /// Nothing happens
    Reject(RejectReason),
    /// `rider` climbs onto `carrier`
    Mount {
        /// Body getting on
        rider: EntityId,
        /// The mount
        carrier: EntityId,
    },
    /// One side rests on the other
    Platform(PlatformCandidate),
    /// Hand over to impulse resolution
    Bump,
}

fn rejection(a: BodyRef<'_>, b: BodyRef<'_>) -> Option<RejectReason> {
    let (fa, fb) = (a.flags(), b.flags());

    if !fa.contains(CollisionFlags::CAN_COLLIDE) || !fb.contains(CollisionFlags::CAN_COLLIDE) {
        return Some(RejectReason::CollisionDisabled);
    }
    let platform_a = fa.contains(CollisionFlags::PLATFORM);
    let platform_b = fb.contains(CollisionFlags::PLATFORM);
    if !a.collider.has_interaction_size() && !b.collider.has_interaction_size() && !platform_a && !platform_b {
        return Some(RejectReason::NoInteractionSize);
    }
    let loose_item = |flags: CollisionFlags, platform: bool| flags.contains(CollisionFlags::ITEM) && !platform;
    if (loose_item(fa, platform_a) && !platform_b) || (loose_item(fb, platform_b) && !platform_a) {
        return Some(RejectReason::ItemContact);
    }
    if a.cooldown.is_some_and(|c| c.from == b.id) || b.cooldown.is_some_and(|c| c.from == a.id) {
        return Some(RejectReason::DismountCooldown);
    }
    if a.attachment.is_attached_to(b.id, AttachmentKind::Mount)
        || b.attachment.is_attached_to(a.id, AttachmentKind::Mount)
    {
        return Some(RejectReason::AlreadyMounted);
    }
    if a.is_immovable() && b.is_immovable() {
        return Some(RejectReason::BothImmovable);
    }
    None
}

/// Which sides of a pair are tested as carriers
pub fn platform_sides(a: BodyRef<'_>, b: BodyRef<'_>) -> PlatformSides {
    let mut sides = PlatformSides::empty();
    sides.set(PlatformSides::A_CARRIES_B, a.can_carry(b.body));
    sides.set(PlatformSides::B_CARRIES_A, b.can_carry(a.body));
    sides
}

/// Swept test of a pair, using the full volume for carriers and the minimal
/// volume otherwise
pub fn sweep(a: BodyRef<'_>, b: BodyRef<'_>, config: &PhysicsConfig) -> Option<SweptHit> {
    let sides = platform_sides(a, b);
    swept_intersection(
        &a.moving(sides.contains(PlatformSides::A_CARRIES_B)),
        &b.moving(sides.contains(PlatformSides::B_CARRIES_A)),
        sides,
        config.platform_tolerance,
    )
}

/// Rejection rules plus the swept test, returning the hit for a pair that
/// may interact
pub fn detect(a: BodyRef<'_>, b: BodyRef<'_>, config: &PhysicsConfig) -> Result<SweptHit, RejectReason> {
    if let Some(reason) = rejection(a, b) {
        return Err(reason);
    }
    sweep(a, b, config).ok_or(RejectReason::Apart)
}

/// Whether the pair can interact at all this tick
pub fn detect_collision(a: BodyRef<'_>, b: BodyRef<'_>, config: &PhysicsConfig) -> bool {
    detect(a, b, config).is_ok()
}

fn can_mount(rider: BodyRef<'_>, mount: BodyRef<'_>) -> bool {
    rider.collider.has(CollisionFlags::RIDER)
        && !rider.is_immovable()
        && !rider.attachment.is_mounted()
        && rider.mounted_by.is_none()
        && mount.is_free_mount()
}

fn mount_reached(rider: BodyRef<'_>, mount: BodyRef<'_>, config: &PhysicsConfig) -> bool {
    let rider_volume = rider.minimal_volume();
    let mount_volume = mount.full_volume();
    let offset = mount_volume.center() - rider_volume.center();
    offset.xy().norm() < config.mount_tolerance && rider_volume.bottom() < mount_volume.top()
}

fn raw_vertical_overlap(a: BodyRef<'_>, b: BodyRef<'_>) -> f32 {
    let (va, vb) = (a.minimal_volume(), b.minimal_volume());
    va.hi(OctAxis::Z).min(vb.hi(OctAxis::Z)) - va.lo(OctAxis::Z).max(vb.lo(OctAxis::Z))
}

/// Classify a pair whose swept test produced `hit`
pub fn classify(a: BodyRef<'_>, b: BodyRef<'_>, hit: &SweptHit, config: &PhysicsConfig) -> Interaction {
    if let Some(reason) = rejection(a, b) {
        return Interaction::Reject(reason);
    }

    for (rider, mount) in [(a, b), (b, a)] {
        if can_mount(rider, mount) && mount_reached(rider, mount, config) {
            trace!("{:?} reaches mount {:?}", rider.id, mount.id);
            return Interaction::Mount {
                rider: rider.id,
                carrier: mount.id,
            };
        }
    }

    let a_rides_b = platform_candidate(a, b, config);
    let b_rides_a = platform_candidate(b, a, config);
    let chosen = match (a_rides_b, b_rides_a) {
        (Some(first), Some(second)) => {
            // Stacked platforms: keep the assignment closest to the plain overlap
            let raw = raw_vertical_overlap(a, b);
            if (second.depth - raw).abs() < (first.depth - raw).abs() {
                Some(second)
            } else {
                Some(first)
            }
        }
        (first, second) => first.or(second),
    };
    if let Some(candidate) = chosen {
        trace!(
            "{:?} may rest on {:?} at height {:.3} (tmin {:.3})",
            candidate.rider,
            candidate.carrier,
            candidate.height,
            hit.tmin
        );
        return Interaction::Platform(candidate);
    }

    Interaction::Bump
}
