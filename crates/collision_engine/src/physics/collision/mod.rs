//! Narrow-phase geometry
//!
//! Entities are bounded by octagonal volumes: slabs along X, Y and Z plus the
//! two horizontal diagonals, which fit chamfered and round shapes far better
//! than a box while keeping every test a per-axis interval check.
//!
//! # Module Organization
//!
//! - [`octagon`] - the volume type and its per-axis operations
//! - [`swept`] - continuous overlap test over one tick

pub mod octagon;
pub mod swept;

// Re-export commonly used types
pub use octagon::{MovingVolume, OctAxis, OctVolume};
pub use swept::{swept_intersection, PlatformSides, SweptHit};
