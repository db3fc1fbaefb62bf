//! Continuous overlap test between two moving volumes
//!
//! A per-axis slab test over the tick interval `[0, 1]`: every axis yields the
//! time window in which the two intervals overlap, and the volumes overlap
//! when all windows share a common time.

use bitflags::bitflags;

use super::octagon::{MovingVolume, OctAxis, OctVolume};

const SPEED_EPSILON: f32 = 1e-9;

bitflags! {
    /// Which side of a pair is tested as a carrying surface
    ///
    /// A carrier's top is raised by the platform tolerance so a rider resting
    /// just above it still registers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PlatformSides: u8 {
        /// `a` may carry `b`
        const A_CARRIES_B = 1 << 0;
        /// `b` may carry `a`
        const B_CARRIES_A = 1 << 1;
    }
}

/// Result of a swept test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweptHit {
    /// Earliest time at which all axes overlap; `<= 0` when already overlapping
    pub tmin: f32,
    /// Latest time at which all axes overlap
    pub tmax: f32,
    /// Current overlap of the unexpanded volumes, present when `tmin <= 0`
    pub overlap: Option<OctVolume>,
}

impl SweptHit {
    /// A contact that starts during this tick rather than an existing overlap
    pub fn is_incoming(&self) -> bool {
        self.tmin > 0.0
    }
}

/// Find when two moving volumes overlap during the tick
///
/// Returns `None` when any axis keeps them apart for the whole of `[0, 1]`.
/// Contact exactly at `t = 1` counts as a hit.
pub fn swept_intersection(
    a: &MovingVolume,
    b: &MovingVolume,
    sides: PlatformSides,
    platform_tolerance: f32,
) -> Option<SweptHit> {
    let va = if sides.contains(PlatformSides::A_CARRIES_B) {
        a.volume.raised_top(platform_tolerance)
    } else {
        a.volume
    };
    let vb = if sides.contains(PlatformSides::B_CARRIES_A) {
        b.volume.raised_top(platform_tolerance)
    } else {
        b.volume
    };
    let relative = a.velocity - b.velocity;

    let mut tmin = f32::NEG_INFINITY;
    let mut tmax = f32::INFINITY;

    for axis in OctAxis::ALL {
        let speed = axis.project(&relative);
        // Overlap needs `lo <= speed * t <= hi`
        let lo = vb.lo(axis) - va.hi(axis);
        let hi = vb.hi(axis) - va.lo(axis);

        if speed.abs() <= SPEED_EPSILON {
            if lo > 0.0 || hi < 0.0 {
                return None;
            }
            continue;
        }

        let (enter, exit) = if speed > 0.0 {
            (lo / speed, hi / speed)
        } else {
            (hi / speed, lo / speed)
        };
        tmin = tmin.max(enter);
        tmax = tmax.min(exit);
        if tmin > tmax {
            return None;
        }
    }

    if tmin > 1.0 || tmax < 0.0 {
        return None;
    }

    let overlap = if tmin <= 0.0 {
        a.volume.intersection(&b.volume)
    } else {
        None
    };

    Some(SweptHit { tmin, tmax, overlap })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use approx::assert_relative_eq;

    fn unit_at(x: f32, vx: f32) -> MovingVolume {
        MovingVolume::new(
            OctVolume::cuboid(1.0, 1.0, -1.0, 1.0).translated(Vec3::new(x, 0.0, 0.0)),
            Vec3::new(vx, 0.0, 0.0),
        )
    }

    #[test]
    fn test_head_on_contact_at_end_of_tick() {
        let a = unit_at(0.0, 1.0);
        let b = unit_at(4.0, -1.0);
        let hit = swept_intersection(&a, &b, PlatformSides::empty(), 0.0).unwrap();
        assert_relative_eq!(hit.tmin, 1.0);
        assert!(hit.is_incoming());
        assert!(hit.overlap.is_none());
    }

    #[test]
    fn test_closing_slower_than_gap_misses() {
        for closing in [0.5, 1.0, 1.5, 1.99] {
            let a = unit_at(0.0, closing);
            let b = unit_at(4.0, 0.0);
            assert!(swept_intersection(&a, &b, PlatformSides::empty(), 0.0).is_none());
        }
    }

    #[test]
    fn test_one_sided_motion_matches_relative_motion() {
        let a = unit_at(0.0, 0.0);
        let b = unit_at(4.0, -4.0);
        let hit = swept_intersection(&a, &b, PlatformSides::empty(), 0.0).unwrap();
        assert_relative_eq!(hit.tmin, 0.5);
        assert_relative_eq!(hit.tmax, 1.5);
    }

    #[test]
    fn test_static_overlap_reports_volume() {
        let a = unit_at(0.0, 0.0);
        let b = unit_at(1.5, 0.0);
        let hit = swept_intersection(&a, &b, PlatformSides::empty(), 0.0).unwrap();
        assert!(!hit.is_incoming());
        let overlap = hit.overlap.unwrap();
        assert_relative_eq!(overlap.extent(OctAxis::X), 0.5);
        assert!(overlap.is_valid());
    }

    #[test]
    fn test_separating_pair_behind_is_ignored() {
        let a = unit_at(0.0, -1.0);
        let b = unit_at(3.0, 1.0);
        assert!(swept_intersection(&a, &b, PlatformSides::empty(), 0.0).is_none());
    }

    #[test]
    fn test_platform_side_widens_vertical_band() {
        let carrier = MovingVolume::new(OctVolume::cuboid(2.0, 2.0, 0.0, 1.0), Vec3::zeros());
        let rider = MovingVolume::new(
            OctVolume::cuboid(0.5, 0.5, 0.0, 2.0).translated(Vec3::new(0.0, 0.0, 1.2)),
            Vec3::zeros(),
        );

        assert!(swept_intersection(&carrier, &rider, PlatformSides::empty(), 0.5).is_none());
        let hit = swept_intersection(&carrier, &rider, PlatformSides::A_CARRIES_B, 0.5).unwrap();
        // Only the widened band touches, the real volumes do not overlap
        assert!(hit.overlap.is_none());
    }

    #[test]
    fn test_diagonal_approach_is_caught_late_by_diagonal_axis() {
        // Diamonds approaching along the diagonal meet later than their boxes would
        let diamond = OctVolume::chamfered(1.0, 1.0, 1.0, 0.0, 1.0);
        let a = MovingVolume::new(diamond, Vec3::new(2.0, 2.0, 0.0));
        let b = MovingVolume::new(diamond.translated(Vec3::new(3.0, 3.0, 0.0)), Vec3::zeros());
        let hit = swept_intersection(&a, &b, PlatformSides::empty(), 0.0).unwrap();
        // Box axes would touch at t = 0.5; the diagonal gap of 4 closes at 4 per tick
        assert_relative_eq!(hit.tmin, 1.0, epsilon = 1e-6);
    }
}
