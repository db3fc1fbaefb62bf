//! Spatial partitioning for broad-phase candidate search
//!
//! The collision system only talks to the [`SpatialQuery`] trait, so the
//! partitioning scheme can be swapped without touching pair resolution.

pub mod grid;
pub mod spatial_query;

pub use grid::SpatialGrid;
pub use spatial_query::SpatialQuery;

use crate::foundation::math::Vec2;

/// Axis-aligned rectangle in the horizontal plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Lower corner
    pub min: Vec2,
    /// Upper corner
    pub max: Vec2,
}

impl Rect {
    /// Create a rectangle from its corner coordinates
    pub fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min: Vec2::new(min_x.min(max_x), min_y.min(max_y)),
            max: Vec2::new(min_x.max(max_x), min_y.max(max_y)),
        }
    }

    /// Closed overlap test
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    /// Grow outward by `margin` on every side
    pub fn expanded(&self, margin: f32) -> Self {
        let margin = Vec2::repeat(margin.max(0.0));
        Self {
            min: self.min - margin,
            max: self.max + margin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_normalizes_corners() {
        let r = Rect::new(2.0, 3.0, -1.0, 1.0);
        assert_eq!(r.min, Vec2::new(-1.0, 1.0));
        assert_eq!(r.max, Vec2::new(2.0, 3.0));
    }

    #[test]
    fn test_touching_rects_intersect() {
        let a = Rect::new(0.0, 0.0, 1.0, 1.0);
        let b = Rect::new(1.0, 0.5, 2.0, 2.0);
        let c = Rect::new(1.1, 0.0, 2.0, 1.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
        assert!(a.expanded(0.1).intersects(&c));
    }
}
