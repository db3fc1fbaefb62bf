//! Attachment maintenance
//!
//! Runs at the start of every tick, before any pair is classified, so a rider
//! that lost its carrier is free to collide normally in the same tick.

use log::debug;

use crate::core::config::PhysicsConfig;
use crate::ecs::components::{Attachment, AttachmentKind};
use crate::ecs::{EntityId, World};

/// Why a link was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetachReason {
    /// The carrier no longer exists
    CarrierGone,
    /// The rider's footprint no longer overlaps the carrier's
    LostOverlap,
    /// The rider is above the carrier by more than the tolerance band
    LiftedOff,
    /// The mount no longer points back at the rider
    MountReleased,
}

/// A link dropped during maintenance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detachment {
    /// The released body
    pub rider: EntityId,
    /// Its former carrier
    pub carrier: EntityId,
    /// Platform or mount
    pub kind: AttachmentKind,
    /// What broke the link
    pub reason: DetachReason,
}

fn check(world: &World, rider: EntityId, link: Attachment, config: &PhysicsConfig) -> Option<DetachReason> {
    let body = world.get(rider)?;
    let Some(carrier) = world.get(link.carrier) else {
        return Some(DetachReason::CarrierGone);
    };

    match link.kind {
        AttachmentKind::Platform => {
            let footprint = body.minimal_volume();
            let surface = carrier.full_volume();
            if !footprint.overlaps_horizontally(&surface) {
                Some(DetachReason::LostOverlap)
            } else if footprint.bottom() > surface.top() + config.platform_tolerance {
                Some(DetachReason::LiftedOff)
            } else {
                None
            }
        }
        AttachmentKind::Mount => (carrier.mounted_by != Some(rider)).then_some(DetachReason::MountReleased),
    }
}

/// Validate every link and drop the broken ones
///
/// Also clears mount back-references whose rider is gone or no longer riding.
pub fn maintain_attachments(world: &mut World, config: &PhysicsConfig) -> Vec<Detachment> {
    let broken: Vec<Detachment> = world
        .iter()
        .filter_map(|(rider, body)| {
            let link = body.attachment.current()?;
            let reason = check(world, rider, link, config)?;
            Some(Detachment {
                rider,
                carrier: link.carrier,
                kind: link.kind,
                reason,
            })
        })
        .collect();

    for detachment in &broken {
        world.detach(detachment.rider);
        debug!(
            "{:?} detached from {:?} ({:?}, {:?})",
            detachment.rider, detachment.carrier, detachment.kind, detachment.reason
        );
    }

    let stale_mounts: Vec<EntityId> = world
        .iter()
        .filter(|(mount, body)| {
            body.mounted_by.is_some_and(|rider| {
                !world
                    .get(rider)
                    .is_some_and(|r| r.attachment.is_attached_to(*mount, AttachmentKind::Mount))
            })
        })
        .map(|(mount, _)| mount)
        .collect();
    for mount in stale_mounts {
        if let Some(body) = world.get_mut(mount) {
            body.mounted_by = None;
        }
    }

    broken
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{Collider, CollisionFlags, Mass, PhysicsBody};
    use crate::foundation::math::Vec3;
    use crate::physics::collision::OctVolume;

    fn table(world: &mut World) -> EntityId {
        world.spawn(
            PhysicsBody::new(
                Vec3::zeros(),
                Collider::new(OctVolume::cuboid(2.0, 2.0, 0.0, 1.0), CollisionFlags::scenery_platform()),
            )
            .with_mass(Mass::Infinite),
        )
    }

    fn walker(world: &mut World, at: Vec3) -> EntityId {
        world.spawn(PhysicsBody::new(
            at,
            Collider::new(OctVolume::cuboid(0.4, 0.4, 0.0, 1.8), CollisionFlags::character()),
        ))
    }

    fn put_on(world: &mut World, rider: EntityId, carrier: EntityId) {
        world.get_mut(rider).unwrap().attachment.attach(Attachment::platform(carrier));
    }

    #[test]
    fn test_rider_on_top_stays() {
        let mut world = World::new();
        let carrier = table(&mut world);
        let rider = walker(&mut world, Vec3::new(0.0, 0.0, 1.0));
        put_on(&mut world, rider, carrier);

        assert!(maintain_attachments(&mut world, &PhysicsConfig::default()).is_empty());
        assert!(world.get(rider).unwrap().attachment.is_attached_to(carrier, AttachmentKind::Platform));
    }

    #[test]
    fn test_walking_off_the_edge_detaches() {
        let mut world = World::new();
        let carrier = table(&mut world);
        let rider = walker(&mut world, Vec3::new(2.5, 0.0, 1.0));
        put_on(&mut world, rider, carrier);

        let dropped = maintain_attachments(&mut world, &PhysicsConfig::default());
        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].reason, DetachReason::LostOverlap);
        assert!(world.get(rider).unwrap().attachment.current().is_none());
    }

    #[test]
    fn test_jumping_off_detaches() {
        let mut world = World::new();
        let carrier = table(&mut world);
        let rider = walker(&mut world, Vec3::new(0.0, 0.0, 2.0));
        put_on(&mut world, rider, carrier);

        let dropped = maintain_attachments(&mut world, &PhysicsConfig::default());
        assert_eq!(dropped[0].reason, DetachReason::LiftedOff);
    }

    #[test]
    fn test_despawned_carrier_detaches() {
        let mut world = World::new();
        let carrier = table(&mut world);
        let rider = walker(&mut world, Vec3::new(0.0, 0.0, 1.0));
        put_on(&mut world, rider, carrier);
        world.despawn(carrier);

        let dropped = maintain_attachments(&mut world, &PhysicsConfig::default());
        assert_eq!(dropped[0].reason, DetachReason::CarrierGone);
        assert_eq!(dropped[0].carrier, carrier);
    }

    #[test]
    fn test_despawned_rider_frees_mount() {
        let mut world = World::new();
        let rider = walker(&mut world, Vec3::new(0.0, 0.0, 1.0));
        let horse = world.spawn(PhysicsBody::new(
            Vec3::zeros(),
            Collider::new(
                OctVolume::cuboid(0.8, 0.8, 0.0, 1.0),
                CollisionFlags::CAN_COLLIDE | CollisionFlags::MOUNT,
            ),
        ));
        world.mount(rider, horse).unwrap();
        assert!(maintain_attachments(&mut world, &PhysicsConfig::default()).is_empty());

        world.despawn(rider);
        assert!(maintain_attachments(&mut world, &PhysicsConfig::default()).is_empty());
        assert!(world.get(horse).unwrap().is_free_mount());
    }
}
