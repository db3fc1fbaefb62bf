//! Static terrain queries used by the integrator
//!
//! Terrain is not an entity. The integrator asks it which directions are
//! blocked at a tentative position and how high the floor is beneath a point.

pub mod heightfield;

pub use heightfield::Heightfield;

use bitflags::bitflags;

use crate::foundation::math::Vec3;

bitflags! {
    /// Directions of motion that terrain forbids at a position
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Blocked: u8 {
        /// Moving toward -X
        const NEG_X = 1 << 0;
        /// Moving toward +X
        const POS_X = 1 << 1;
        /// Moving toward -Y
        const NEG_Y = 1 << 2;
        /// Moving toward +Y
        const POS_Y = 1 << 3;
        /// Moving down
        const NEG_Z = 1 << 4;
        /// Moving up
        const POS_Z = 1 << 5;
        /// Every horizontal direction
        const HORIZONTAL = Self::NEG_X.bits() | Self::POS_X.bits() | Self::NEG_Y.bits() | Self::POS_Y.bits();
    }
}

impl Blocked {
    /// Flag for moving along X with the sign of `delta`
    pub fn along_x(delta: f32) -> Self {
        if delta < 0.0 { Self::NEG_X } else { Self::POS_X }
    }

    /// Flag for moving along Y with the sign of `delta`
    pub fn along_y(delta: f32) -> Self {
        if delta < 0.0 { Self::NEG_Y } else { Self::POS_Y }
    }
}

/// Read-only terrain interface
pub trait TerrainQuery {
    /// Directions blocked for a body whose reference point is at `position`
    fn blocked(&self, position: Vec3) -> Blocked;

    /// Height of the walkable floor beneath `position`
    fn floor_height(&self, position: Vec3) -> f32;
}

/// Terrain that never blocks, with the floor infinitely far below
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenSpace;

impl TerrainQuery for OpenSpace {
    fn blocked(&self, _position: Vec3) -> Blocked {
        Blocked::empty()
    }

    fn floor_height(&self, _position: Vec3) -> f32 {
        f32::NEG_INFINITY
    }
}
