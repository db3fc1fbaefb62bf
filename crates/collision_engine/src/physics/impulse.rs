//! Mass-weighted impulse and pressure resolution
//!
//! Resolution produces a [`Resolution`] value holding the velocity and
//! position corrections for both sides of a bumping pair. Nothing here writes
//! to the world.

use crate::core::config::PhysicsConfig;
use crate::ecs::components::{AttachmentKind, CollisionFlags, Mass};
use crate::foundation::math::Vec3;
use crate::physics::classify::platform_sides;
use crate::physics::collision::{MovingVolume, OctAxis, OctVolume, PlatformSides, SweptHit};
use crate::physics::BodyRef;

const CENTER_EPSILON: f32 = 1e-6;

/// Split of a correction between the two sides of a pair
///
/// The factors sum to one. An immovable or massless side takes nothing and
/// its partner takes everything.
pub fn recoil_factors(mass_a: Mass, mass_b: Mass) -> (f32, f32) {
    if mass_a == mass_b {
        return (0.5, 0.5);
    }
    match (mass_a, mass_b) {
        (Mass::Infinite, _) => (0.0, 1.0),
        (_, Mass::Infinite) => (1.0, 0.0),
        (a, _) if a.is_zero() => (0.0, 1.0),
        (_, b) if b.is_zero() => (1.0, 0.0),
        (Mass::Finite(a), Mass::Finite(b)) => {
            let total = a + b;
            if total.abs() <= f32::EPSILON {
                (0.5, 0.5)
            } else {
                (b / total, a / total)
            }
        }
    }
}

/// How strongly a pair pushes on each other, in `[0, 1]`
pub fn interaction_strength(a: BodyRef<'_>, b: BodyRef<'_>, config: &PhysicsConfig) -> f32 {
    let mut strength = (1.0 - a.damping.clamp(0.0, 1.0)) * (1.0 - b.damping.clamp(0.0, 1.0));

    for side in [a, b] {
        if let Some(cooldown) = side.cooldown {
            strength *= 1.0 - cooldown.ramp();
        }
    }

    let plain_a = !a.collider.has(CollisionFlags::MOUNT);
    let plain_b = !b.collider.has(CollisionFlags::MOUNT);
    if (a.is_free_mount() && plain_b) || (b.is_free_mount() && plain_a) {
        strength *= config.unmounted_mount_factor;
    }

    // A body already inside the top band of a carrier it is not standing on
    // is being pushed sideways off the edge, not bumped.
    let tolerance = config.platform_tolerance;
    for (rider, carrier) in [(a, b), (b, a)] {
        if !carrier.can_carry(rider.body) || rider.attachment.is_attached_to(carrier.id, AttachmentKind::Platform) {
            continue;
        }
        let below = carrier.full_volume().top() - rider.minimal_volume().bottom();
        if below > 0.0 && below < tolerance {
            strength *= 1.0 - below / tolerance;
        }
    }

    strength.clamp(0.0, 1.0)
}

/// Estimated contact between two volumes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit normal pointing from `a` toward `b`
    pub normal: Vec3,
    /// Penetration along the normal in world units
    pub depth: f32,
    /// Whether the contact starts during this tick
    pub incoming: bool,
}

fn contact_from_overlap(
    overlap: &OctVolume,
    a: &OctVolume,
    b: &OctVolume,
    flatten: Option<f32>,
) -> Option<(Vec3, f32)> {
    let mut axes: Vec<(OctAxis, f32, f32)> = OctAxis::ALL
        .iter()
        .map(|&axis| {
            let depth = overlap.extent(axis) * axis.metric();
            let weighted = match (axis, flatten) {
                (OctAxis::Z, Some(flatten)) => depth * flatten,
                _ => depth,
            };
            (axis, depth, weighted)
        })
        .collect();
    axes.sort_by(|l, r| l.2.total_cmp(&r.2));

    axes.into_iter().find_map(|(axis, depth, _)| {
        let separation = b.axis_center(axis) - a.axis_center(axis);
        if separation.abs() <= CENTER_EPSILON {
            return None;
        }
        Some((axis.direction() * separation.signum(), depth))
    })
}

/// Estimate the contact normal and depth of a pair
///
/// An incoming contact is measured on the volumes swept over the first part
/// of the overlap window; an existing overlap is measured directly. The
/// shallowest axis wins, and when one side can carry the other the vertical
/// axis is favoured so stacked bodies separate upward.
pub fn estimate_contact(
    a: &MovingVolume,
    b: &MovingVolume,
    hit: &SweptHit,
    sides: PlatformSides,
    config: &PhysicsConfig,
) -> Option<Contact> {
    let flatten = (!sides.is_empty()).then_some(config.table_flatten);
    let incoming = hit.is_incoming();

    let (overlap, at_a, at_b) = if incoming {
        let end = hit.tmin + config.collision_window * (hit.tmax - hit.tmin);
        let overlap = a.over(hit.tmin, end).intersection(&b.over(hit.tmin, end))?;
        (overlap, a.at(hit.tmin), b.at(hit.tmin))
    } else {
        (hit.overlap?, a.volume, b.volume)
    };

    let (normal, depth) = contact_from_overlap(&overlap, &at_a, &at_b, flatten)?;
    if depth <= 0.0 {
        return None;
    }
    Some(Contact {
        normal,
        depth,
        incoming,
    })
}

/// Velocity and position change for one side of a pair
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Correction {
    /// Added to the velocity accumulator
    pub velocity: Vec3,
    /// Added to the collision displacement accumulator
    pub position: Vec3,
}

/// Result of resolving a bumping pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    /// Correction for the first body
    pub a: Correction,
    /// Correction for the second body
    pub b: Correction,
    /// Whether this contact counts as an AI-visible bump
    pub bump: bool,
    /// Contact that was resolved
    pub contact: Contact,
    /// Strength the corrections were scaled by
    pub strength: f32,
}

/// Resolve a bumping pair
///
/// Returns `None` when the pair ends up not interacting: zero strength, two
/// immovable bodies, or no usable contact.
pub fn resolve(a: BodyRef<'_>, b: BodyRef<'_>, hit: &SweptHit, config: &PhysicsConfig) -> Option<Resolution> {
    if a.is_immovable() && b.is_immovable() {
        return None;
    }
    let strength = interaction_strength(a, b, config);
    if strength <= 0.0 {
        return None;
    }

    let sides = platform_sides(a, b);
    let contact = estimate_contact(
        &a.moving(sides.contains(PlatformSides::A_CARRIES_B)),
        &b.moving(sides.contains(PlatformSides::B_CARRIES_A)),
        hit,
        sides,
        config,
    )?;
    let n = contact.normal;

    let (mut recoil_a, mut recoil_b) = recoil_factors(a.mass, b.mass);
    if a.is_immovable() {
        recoil_a = 0.0;
    }
    if b.is_immovable() {
        recoil_b = 0.0;
    }

    let closing = (a.velocity - b.velocity).dot(&n);
    let mut out = Resolution {
        a: Correction::default(),
        b: Correction::default(),
        bump: false,
        contact,
        strength,
    };

    if contact.incoming {
        if closing > 0.0 {
            let restitution = a.bounciness * b.bounciness;
            let impulse = (1.0 + restitution) * closing * strength;
            out.a.velocity = -n * (impulse * recoil_a);
            out.b.velocity = n * (impulse * recoil_b);
            out.bump = true;
        }
    } else {
        let push = contact.depth * config.pressure_strength * strength;
        out.a.velocity = -n * (push * recoil_a);
        out.b.velocity = n * (push * recoil_b);
        let before = (a.previous_velocity - b.previous_velocity).dot(&n);
        out.bump = before * closing < 0.0;
    }

    let separation = (contact.depth + config.separation_bias) * config.pressure_strength * strength;
    out.a.position = -n * (separation * recoil_a);
    out.b.position = n * (separation * recoil_b);

    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{Collider, DismountCooldown, PhysicsBody};
    use crate::ecs::EntityId;
    use approx::assert_relative_eq;
    use slotmap::SlotMap;

    fn ids(n: usize) -> Vec<EntityId> {
        let mut keys: SlotMap<EntityId, ()> = SlotMap::with_key();
        (0..n).map(|_| keys.insert(())).collect()
    }

    fn ball(x: f32, vx: f32) -> PhysicsBody {
        PhysicsBody::new(
            Vec3::new(x, 0.0, 0.0),
            Collider::new(OctVolume::cuboid(1.0, 1.0, -1.0, 1.0), CollisionFlags::CAN_COLLIDE),
        )
        .with_velocity(Vec3::new(vx, 0.0, 0.0))
    }

    #[test]
    fn test_recoil_follows_mass_ratio() {
        let (a, b) = recoil_factors(Mass::Finite(10.0), Mass::Finite(30.0));
        assert_relative_eq!(a, 0.75);
        assert_relative_eq!(b, 0.25);

        for (ma, mb) in [(1.0, 2.0), (0.1, 7.0), (50.0, 3.0)] {
            let (a, b) = recoil_factors(Mass::Finite(ma), Mass::Finite(mb));
            assert_relative_eq!(a + b, 1.0);
            assert_relative_eq!(a, mb / (ma + mb));
        }
    }

    #[test]
    fn test_recoil_sentinels() {
        assert_eq!(recoil_factors(Mass::Infinite, Mass::Finite(3.0)), (0.0, 1.0));
        assert_eq!(recoil_factors(Mass::Finite(3.0), Mass::Infinite), (1.0, 0.0));
        assert_eq!(recoil_factors(Mass::Finite(0.0), Mass::Finite(3.0)), (0.0, 1.0));
        assert_eq!(recoil_factors(Mass::Infinite, Mass::Infinite), (0.5, 0.5));
        assert_eq!(recoil_factors(Mass::Finite(4.0), Mass::Finite(4.0)), (0.5, 0.5));
    }

    #[test]
    fn test_strength_from_damping_and_cooldown() {
        let id = ids(3);
        let config = PhysicsConfig::default();
        let a = ball(0.0, 0.0).with_damping(0.5);
        let mut b = ball(1.0, 0.0).with_damping(0.2);
        assert_relative_eq!(interaction_strength(BodyRef::new(id[0], &a), BodyRef::new(id[1], &b), &config), 0.4);

        let mut cooldown = DismountCooldown::new(id[2], 4);
        cooldown.tick();
        b.cooldown = Some(cooldown);
        assert_relative_eq!(
            interaction_strength(BodyRef::new(id[0], &a), BodyRef::new(id[1], &b), &config),
            0.4 * 0.25
        );
    }

    #[test]
    fn test_strength_free_mount_factor() {
        let id = ids(2);
        let config = PhysicsConfig::default();
        let walker = ball(0.0, 0.0);
        let mut horse = ball(1.0, 0.0);
        horse.collider.flags |= CollisionFlags::MOUNT;
        let s = interaction_strength(BodyRef::new(id[0], &walker), BodyRef::new(id[1], &horse), &config);
        assert_relative_eq!(s, config.unmounted_mount_factor);

        horse.mounted_by = Some(id[0]);
        let s = interaction_strength(BodyRef::new(id[0], &walker), BodyRef::new(id[1], &horse), &config);
        assert_relative_eq!(s, 1.0);
    }

    #[test]
    fn test_strength_ramps_inside_platform_band() {
        let id = ids(2);
        let config = PhysicsConfig::default();
        let table = PhysicsBody::new(
            Vec3::zeros(),
            Collider::new(OctVolume::cuboid(2.0, 2.0, 0.0, 1.0), CollisionFlags::scenery_platform()),
        )
        .with_mass(Mass::Infinite);
        let walker = |z: f32| {
            PhysicsBody::new(
                Vec3::new(2.2, 0.0, z),
                Collider::new(OctVolume::cuboid(0.4, 0.4, 0.0, 1.8), CollisionFlags::character()),
            )
        };

        let strength = |rider: &PhysicsBody| {
            interaction_strength(BodyRef::new(id[0], &table), BodyRef::new(id[1], rider), &config)
        };
        assert_relative_eq!(strength(&walker(0.9)), 0.8, epsilon = 1e-5);
        assert_relative_eq!(strength(&walker(0.75)), 0.5, epsilon = 1e-5);
        assert_relative_eq!(strength(&walker(0.0)), 1.0);
        assert_relative_eq!(strength(&walker(1.1)), 1.0);
    }

    #[test]
    fn test_elastic_head_on_swaps_velocities() {
        let id = ids(2);
        let config = PhysicsConfig::default();
        let a = ball(0.0, 1.0).with_bounciness(1.0);
        let b = ball(3.0, -1.0).with_bounciness(1.0);
        let (ra, rb) = (BodyRef::new(id[0], &a), BodyRef::new(id[1], &b));

        let hit = crate::physics::classify::sweep(ra, rb, &config).unwrap();
        assert!(hit.is_incoming());
        let res = resolve(ra, rb, &hit, &config).unwrap();

        assert!(res.bump);
        assert_relative_eq!(res.contact.normal, Vec3::x());
        assert_relative_eq!((a.velocity + res.a.velocity).x, -1.0);
        assert_relative_eq!((b.velocity + res.b.velocity).x, 1.0);
        assert!(res.a.position.x < 0.0 && res.b.position.x > 0.0);
    }

    #[test]
    fn test_immovable_side_gets_nothing() {
        let id = ids(2);
        let config = PhysicsConfig::default();
        let wall = ball(0.0, 0.0).with_mass(Mass::Infinite);
        let b = ball(1.5, -0.5);
        let (ra, rb) = (BodyRef::new(id[0], &wall), BodyRef::new(id[1], &b));

        let hit = crate::physics::classify::sweep(ra, rb, &config).unwrap();
        let res = resolve(ra, rb, &hit, &config).unwrap();
        assert_eq!(res.a, Correction::default());
        assert!(res.b.position.x > 0.0);
        assert!(res.b.velocity.x > 0.0);
    }

    #[test]
    fn test_pressure_bump_needs_sign_flip() {
        let id = ids(2);
        let config = PhysicsConfig::default();
        let a = ball(0.0, 0.0);
        let mut b = ball(1.0, 0.0);
        let (ra, rb) = (BodyRef::new(id[0], &a), BodyRef::new(id[1], &b));
        let hit = crate::physics::classify::sweep(ra, rb, &config).unwrap();
        let res = resolve(ra, rb, &hit, &config).unwrap();
        assert!(!res.contact.incoming);
        assert!(!res.bump);
        assert_relative_eq!(res.contact.depth, 1.0);
        // depth 1, pressure 0.25, half each
        assert_relative_eq!(res.b.velocity.x, 0.125);
        assert_relative_eq!(res.b.position.x, 0.25);

        b.previous_velocity = Vec3::new(0.3, 0.0, 0.0);
        b.velocity = Vec3::new(-0.1, 0.0, 0.0);
        let (ra, rb) = (BodyRef::new(id[0], &a), BodyRef::new(id[1], &b));
        let hit = crate::physics::classify::sweep(ra, rb, &config).unwrap();
        assert!(resolve(ra, rb, &hit, &config).unwrap().bump);
    }

    #[test]
    fn test_concentric_bodies_have_no_normal() {
        let id = ids(2);
        let config = PhysicsConfig::default();
        let a = ball(0.0, 0.0);
        let b = ball(0.0, 0.0);
        let (ra, rb) = (BodyRef::new(id[0], &a), BodyRef::new(id[1], &b));
        let hit = crate::physics::classify::sweep(ra, rb, &config).unwrap();
        assert!(resolve(ra, rb, &hit, &config).is_none());
    }
}
