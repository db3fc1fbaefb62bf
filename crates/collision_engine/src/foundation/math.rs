//! Math utilities and types
//!
//! Provides the vector types used by the collision engine. All physics
//! quantities are `f32` and velocities are expressed in world units per tick.

pub use nalgebra::{Vector2, Vector3};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// `1 / sqrt(2)`, the scale between a diagonal-axis projection and world distance
pub const FRAC_1_SQRT_2: f32 = std::f32::consts::FRAC_1_SQRT_2;

/// Math utility functions
pub mod utils {
    use super::Vec3;

    /// Clamp a value between min and max
    pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
        if value < min { min } else if value > max { max } else { value }
    }

    /// Clamp every component of `v` to `[-limit, limit]`
    pub fn clamp_components(v: Vec3, limit: f32) -> Vec3 {
        v.map(|c| clamp(c, -limit, limit))
    }
}
