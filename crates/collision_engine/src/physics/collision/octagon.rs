//! Octagonal bounding volumes
//!
//! A volume is a set of closed intervals, one per [`OctAxis`]. The diagonal
//! axes measure `x + y` and `x - y`, so their intervals are in projected
//! units; [`OctAxis::metric`] converts them back to world distance.

use crate::foundation::math::{Vec3, FRAC_1_SQRT_2};
use crate::spatial::Rect;

const SIZE_EPSILON: f32 = 1e-6;

/// One of the five slab axes of an octagonal volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OctAxis {
    /// World X
    X,
    /// World Y
    Y,
    /// World Z (up)
    Z,
    /// The `x + y` diagonal
    Sum,
    /// The `x - y` diagonal
    Diff,
}

impl OctAxis {
    /// Every axis, in storage order
    pub const ALL: [OctAxis; 5] = [OctAxis::X, OctAxis::Y, OctAxis::Z, OctAxis::Sum, OctAxis::Diff];

    /// The four axes lying in the horizontal plane
    pub const HORIZONTAL: [OctAxis; 4] = [OctAxis::X, OctAxis::Y, OctAxis::Sum, OctAxis::Diff];

    /// Storage index
    pub const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
            Self::Sum => 3,
            Self::Diff => 4,
        }
    }

    /// Project a vector onto this axis in projected units
    pub fn project(self, v: &Vec3) -> f32 {
        match self {
            Self::X => v.x,
            Self::Y => v.y,
            Self::Z => v.z,
            Self::Sum => v.x + v.y,
            Self::Diff => v.x - v.y,
        }
    }

    /// Unit world direction of the axis
    pub fn direction(self) -> Vec3 {
        match self {
            Self::X => Vec3::x(),
            Self::Y => Vec3::y(),
            Self::Z => Vec3::z(),
            Self::Sum => Vec3::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2, 0.0),
            Self::Diff => Vec3::new(FRAC_1_SQRT_2, -FRAC_1_SQRT_2, 0.0),
        }
    }

    /// World length of one projected unit along this axis
    pub fn metric(self) -> f32 {
        match self {
            Self::X | Self::Y | Self::Z => 1.0,
            Self::Sum | Self::Diff => FRAC_1_SQRT_2,
        }
    }
}

/// Octagonal prism described by five closed intervals
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OctVolume {
    /// Lower bound per axis
    pub min: [f32; 5],
    /// Upper bound per axis
    pub max: [f32; 5],
}

impl OctVolume {
    /// Degenerate volume at the origin; it has no interaction size
    pub fn point() -> Self {
        Self { min: [0.0; 5], max: [0.0; 5] }
    }

    /// Axis-aligned box, bottom and top measured from the origin
    pub fn cuboid(half_x: f32, half_y: f32, bottom: f32, top: f32) -> Self {
        Self::chamfered(half_x, half_y, 0.0, bottom, top)
    }

    /// Box with its four vertical edges cut by `chamfer` projected units
    pub fn chamfered(half_x: f32, half_y: f32, chamfer: f32, bottom: f32, top: f32) -> Self {
        let half_x = half_x.abs();
        let half_y = half_y.abs();
        let diagonal = half_x + half_y - chamfer.clamp(0.0, half_x.min(half_y));
        Self {
            min: [-half_x, -half_y, bottom.min(top), -diagonal, -diagonal],
            max: [half_x, half_y, bottom.max(top), diagonal, diagonal],
        }
    }

    /// Regular octagon approximating an upright cylinder
    pub fn cylinder(radius: f32, bottom: f32, top: f32) -> Self {
        let radius = radius.abs();
        let diagonal = radius * std::f32::consts::SQRT_2;
        Self {
            min: [-radius, -radius, bottom.min(top), -diagonal, -diagonal],
            max: [radius, radius, bottom.max(top), diagonal, diagonal],
        }
    }

    /// Lower bound along `axis`
    pub fn lo(&self, axis: OctAxis) -> f32 {
        self.min[axis.index()]
    }

    /// Upper bound along `axis`
    pub fn hi(&self, axis: OctAxis) -> f32 {
        self.max[axis.index()]
    }

    /// Interval length along `axis`, in projected units
    pub fn extent(&self, axis: OctAxis) -> f32 {
        self.hi(axis) - self.lo(axis)
    }

    /// Midpoint along `axis`, in projected units
    pub fn axis_center(&self, axis: OctAxis) -> f32 {
        0.5 * (self.hi(axis) + self.lo(axis))
    }

    /// Lowest point
    pub fn bottom(&self) -> f32 {
        self.lo(OctAxis::Z)
    }

    /// Highest point
    pub fn top(&self) -> f32 {
        self.hi(OctAxis::Z)
    }

    /// Center of the X/Y/Z slabs
    pub fn center(&self) -> Vec3 {
        Vec3::new(
            self.axis_center(OctAxis::X),
            self.axis_center(OctAxis::Y),
            self.axis_center(OctAxis::Z),
        )
    }

    /// Every interval has `min <= max`
    pub fn is_valid(&self) -> bool {
        OctAxis::ALL.iter().all(|&axis| self.lo(axis) <= self.hi(axis))
    }

    /// Whether the horizontal cross-section has any area
    pub fn has_horizontal_size(&self) -> bool {
        self.extent(OctAxis::X) > SIZE_EPSILON && self.extent(OctAxis::Y) > SIZE_EPSILON
    }

    /// Move by `offset`
    pub fn translated(&self, offset: Vec3) -> Self {
        let mut out = *self;
        for axis in OctAxis::ALL {
            let shift = axis.project(&offset);
            out.min[axis.index()] += shift;
            out.max[axis.index()] += shift;
        }
        out
    }

    /// Hull of the volume moving with `velocity` between times `t0` and `t1`
    pub fn swept(&self, velocity: Vec3, t0: f32, t1: f32) -> Self {
        let mut out = *self;
        for axis in OctAxis::ALL {
            let speed = axis.project(&velocity);
            let (a, b) = (speed * t0, speed * t1);
            out.min[axis.index()] += a.min(b);
            out.max[axis.index()] += a.max(b);
        }
        out
    }

    /// Raise the top by `amount`
    pub fn raised_top(&self, amount: f32) -> Self {
        let mut out = *self;
        out.max[OctAxis::Z.index()] += amount.max(0.0);
        out
    }

    /// Common part of two volumes, `None` when they are disjoint
    pub fn intersection(&self, other: &OctVolume) -> Option<OctVolume> {
        let mut out = *self;
        for axis in OctAxis::ALL {
            let i = axis.index();
            out.min[i] = self.min[i].max(other.min[i]);
            out.max[i] = self.max[i].min(other.max[i]);
            if out.min[i] > out.max[i] {
                return None;
            }
        }
        Some(out)
    }

    /// Closed-interval overlap along a single axis
    pub fn overlaps_on(&self, other: &OctVolume, axis: OctAxis) -> bool {
        self.hi(axis) >= other.lo(axis) && other.hi(axis) >= self.lo(axis)
    }

    /// Overlap on all four horizontal axes, diagonals included
    pub fn overlaps_horizontally(&self, other: &OctVolume) -> bool {
        OctAxis::HORIZONTAL.iter().all(|&axis| self.overlaps_on(other, axis))
    }

    /// Horizontal bounding rectangle
    pub fn footprint(&self) -> Rect {
        Rect::new(
            self.lo(OctAxis::X),
            self.lo(OctAxis::Y),
            self.hi(OctAxis::X),
            self.hi(OctAxis::Y),
        )
    }
}

/// A world-space volume together with its velocity for this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovingVolume {
    /// Volume at the start of the tick
    pub volume: OctVolume,
    /// Displacement over the whole tick
    pub velocity: Vec3,
}

impl MovingVolume {
    /// Create a moving volume
    pub fn new(volume: OctVolume, velocity: Vec3) -> Self {
        Self { volume, velocity }
    }

    /// Volume at time `t` of the tick
    pub fn at(&self, t: f32) -> OctVolume {
        self.volume.translated(self.velocity * t)
    }

    /// Hull of the motion over `[t0, t1]`
    pub fn over(&self, t0: f32, t1: f32) -> OctVolume {
        self.volume.swept(self.velocity, t0, t1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cuboid_diagonals_reach_corners() {
        let volume = OctVolume::cuboid(1.0, 2.0, 0.0, 3.0);
        assert_relative_eq!(volume.hi(OctAxis::Sum), 3.0);
        assert_relative_eq!(volume.lo(OctAxis::Diff), -3.0);
        assert!(volume.is_valid());
        assert!(volume.has_horizontal_size());
    }

    #[test]
    fn test_chamfer_is_clamped_to_smaller_half_width() {
        let volume = OctVolume::chamfered(1.0, 2.0, 5.0, 0.0, 1.0);
        assert_relative_eq!(volume.hi(OctAxis::Sum), 2.0);
    }

    #[test]
    fn test_point_has_no_interaction_size() {
        assert!(!OctVolume::point().has_horizontal_size());
        assert!(OctVolume::point().is_valid());
    }

    #[test]
    fn test_translate_moves_diagonals_by_projection() {
        let volume = OctVolume::cuboid(1.0, 1.0, 0.0, 1.0).translated(Vec3::new(2.0, 1.0, 5.0));
        assert_relative_eq!(volume.lo(OctAxis::X), 1.0);
        assert_relative_eq!(volume.bottom(), 5.0);
        assert_relative_eq!(volume.axis_center(OctAxis::Sum), 3.0);
        assert_relative_eq!(volume.axis_center(OctAxis::Diff), 1.0);
        assert_relative_eq!(volume.center(), Vec3::new(2.0, 1.0, 5.5));
    }

    #[test]
    fn test_swept_hull_covers_both_ends() {
        let volume = OctVolume::cuboid(1.0, 1.0, 0.0, 1.0);
        let hull = volume.swept(Vec3::new(-4.0, 0.0, 0.0), 0.25, 0.5);
        assert_relative_eq!(hull.lo(OctAxis::X), -3.0);
        assert_relative_eq!(hull.hi(OctAxis::X), 0.0);
        assert!(hull.is_valid());
    }

    #[test]
    fn test_intersection_and_disjoint() {
        let a = OctVolume::cuboid(1.0, 1.0, 0.0, 1.0);
        let b = a.translated(Vec3::new(1.5, 0.0, 0.0));
        let common = a.intersection(&b).unwrap();
        assert_relative_eq!(common.extent(OctAxis::X), 0.5);
        assert!(common.is_valid());

        let far = a.translated(Vec3::new(5.0, 0.0, 0.0));
        assert!(a.intersection(&far).is_none());
    }

    #[test]
    fn test_diagonal_axes_separate_chamfered_corners() {
        // Two diamonds touching corner to corner along the box axes still
        // overlap on X and Y but are separated on the diagonal.
        let diamond = OctVolume::chamfered(1.0, 1.0, 1.0, 0.0, 1.0);
        let other = diamond.translated(Vec3::new(1.5, 1.5, 0.0));
        assert!(diamond.overlaps_on(&other, OctAxis::X));
        assert!(diamond.overlaps_on(&other, OctAxis::Y));
        assert!(!diamond.overlaps_horizontally(&other));
    }
}
