//! Platform candidates
//!
//! A rider may touch several carriers in one tick. Each touching carrier
//! produces an immutable [`PlatformCandidate`]; once every pair has been
//! classified, [`pick_best`] selects the one the rider ends up standing on.

use crate::core::config::PhysicsConfig;
use crate::ecs::EntityId;
use crate::foundation::math::Vec3;
use crate::physics::BodyRef;

/// A carrier a rider could stand on this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlatformCandidate {
    /// Body that would be carried
    pub rider: EntityId,
    /// Body doing the carrying
    pub carrier: EntityId,
    /// Carrier top at the end of the tick
    pub height: f32,
    /// How far the rider's bottom is below the carrier top right now
    pub depth: f32,
    /// Displacement the carrier makes this tick
    pub carrier_velocity: Vec3,
}

/// Test whether `rider` rests on `carrier` this tick
///
/// The rider's bottom must be no more than the tolerance below the carrier
/// top now, must not be further than the tolerance above it by the end of the
/// tick, and its minimal footprint must overlap the carrier's full footprint
/// on all four horizontal axes.
pub fn platform_candidate(
    rider: BodyRef<'_>,
    carrier: BodyRef<'_>,
    config: &PhysicsConfig,
) -> Option<PlatformCandidate> {
    if !carrier.can_carry(rider.body) {
        return None;
    }
    let tolerance = config.platform_tolerance;
    let rider_volume = rider.minimal_volume();
    let carrier_volume = carrier.full_volume();

    let depth = carrier_volume.top() - rider_volume.bottom();
    if depth > tolerance {
        return None;
    }
    let depth_next = (carrier_volume.top() + carrier.velocity.z) - (rider_volume.bottom() + rider.velocity.z);
    if depth_next < -tolerance {
        return None;
    }
    if !rider_volume.overlaps_horizontally(&carrier_volume) {
        return None;
    }

    Some(PlatformCandidate {
        rider: rider.id,
        carrier: carrier.id,
        height: carrier_volume.top() + carrier.velocity.z,
        depth,
        carrier_velocity: carrier.velocity,
    })
}

/// Choose the carrier a rider ends up on
///
/// The highest surface wins. A later candidate only replaces the current one
/// when it is strictly higher, so ties keep the earlier candidate.
pub fn pick_best<I>(candidates: I) -> Option<PlatformCandidate>
where
    I: IntoIterator<Item = PlatformCandidate>,
{
    candidates.into_iter().fold(None, |best, candidate| match best {
        Some(current) if candidate.height <= current.height => Some(current),
        _ => Some(candidate),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{Collider, CollisionFlags, Mass, PhysicsBody};
    use crate::physics::collision::OctVolume;
    use approx::assert_relative_eq;
    use slotmap::SlotMap;

    fn ids(n: usize) -> Vec<EntityId> {
        let mut keys: SlotMap<EntityId, ()> = SlotMap::with_key();
        (0..n).map(|_| keys.insert(())).collect()
    }

    fn candidate(carrier: EntityId, rider: EntityId, height: f32) -> PlatformCandidate {
        PlatformCandidate {
            rider,
            carrier,
            height,
            depth: 0.0,
            carrier_velocity: Vec3::zeros(),
        }
    }

    fn table() -> PhysicsBody {
        PhysicsBody::new(
            Vec3::zeros(),
            Collider::new(OctVolume::cuboid(2.0, 2.0, 0.0, 1.0), CollisionFlags::scenery_platform()),
        )
        .with_mass(Mass::Infinite)
    }

    fn walker(at: Vec3) -> PhysicsBody {
        PhysicsBody::new(at, Collider::new(OctVolume::cuboid(0.4, 0.4, 0.0, 1.8), CollisionFlags::character()))
    }

    #[test]
    fn test_pick_best_prefers_highest() {
        let id = ids(4);
        let best = pick_best([
            candidate(id[1], id[0], 1.0),
            candidate(id[2], id[0], 2.5),
            candidate(id[3], id[0], 2.0),
        ])
        .unwrap();
        assert_eq!(best.carrier, id[2]);
    }

    #[test]
    fn test_pick_best_tie_keeps_first() {
        let id = ids(3);
        let best = pick_best([candidate(id[1], id[0], 2.0), candidate(id[2], id[0], 2.0)]).unwrap();
        assert_eq!(best.carrier, id[1]);
        assert!(pick_best(std::iter::empty()).is_none());
    }

    #[test]
    fn test_rider_within_band_is_a_candidate() {
        let id = ids(2);
        let config = PhysicsConfig::default();
        let carrier = table();
        let rider = walker(Vec3::new(0.5, 0.5, 0.8)).with_velocity(Vec3::new(0.0, 0.0, -0.1));

        let c = platform_candidate(BodyRef::new(id[1], &rider), BodyRef::new(id[0], &carrier), &config).unwrap();
        assert_eq!(c.carrier, id[0]);
        assert_relative_eq!(c.height, 1.0);
        assert_relative_eq!(c.depth, 0.2, epsilon = 1e-6);
    }

    #[test]
    fn test_rider_too_deep_or_off_footprint_is_not() {
        let id = ids(2);
        let config = PhysicsConfig::default();
        let carrier = table();

        let sunk = walker(Vec3::new(0.0, 0.0, 0.2));
        assert!(platform_candidate(BodyRef::new(id[1], &sunk), BodyRef::new(id[0], &carrier), &config).is_none());

        let beside = walker(Vec3::new(3.0, 0.0, 1.0));
        assert!(platform_candidate(BodyRef::new(id[1], &beside), BodyRef::new(id[0], &carrier), &config).is_none());
    }

    #[test]
    fn test_rider_rising_away_is_not() {
        let id = ids(2);
        let config = PhysicsConfig::default();
        let carrier = table();
        let jumper = walker(Vec3::new(0.0, 0.0, 1.2)).with_velocity(Vec3::new(0.0, 0.0, 0.5));
        assert!(platform_candidate(BodyRef::new(id[1], &jumper), BodyRef::new(id[0], &carrier), &config).is_none());
    }
}
