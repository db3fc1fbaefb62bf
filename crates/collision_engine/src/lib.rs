//! # Collision Engine
//!
//! Per-tick collision detection and resolution for game entities.
//!
//! ## Features
//!
//! - **Octagonal Volumes**: box-like bounds with chamfered corners along the diagonals
//! - **Swept Tests**: contact times over the tick instead of a single yes or no
//! - **Interaction Classes**: bumps, platform riding and mounting from one pass
//! - **Mass-Weighted Resolution**: impulses and pressure split by relative mass
//! - **Anti-Tunneling Integration**: per-axis clipped moves against a terrain test
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use collision_engine::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SimulationConfig::load_or_default("sandbox.toml")?;
//! let mut physics = CollisionSystem::from_config(&config);
//! let mut world = World::new();
//! let ground = Heightfield::new(config.physics.terrain_cell_size, 0.0);
//!
//! world.spawn(PhysicsBody::new(
//!     Vec3::new(0.0, 0.0, 1.0),
//!     Collider::new(OctVolume::cuboid(0.4, 0.4, 0.0, 1.8), CollisionFlags::character()),
//! ));
//!
//! let report = physics.step(&mut world, &ground);
//! println!("{} pairs tested", report.pairs_tested);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod core;

pub mod ecs;
pub mod events;
pub mod foundation;
pub mod physics;
pub mod spatial;
pub mod terrain;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::Config,
        core::config::{EngineConfig, PhysicsConfig, SimulationConfig, SpatialConfig},
        ecs::components::{
            AlertState, AttachState, Attachment, AttachmentKind, Collider, CollisionFlags, Mass, PhysicsBody, Team,
        },
        ecs::{EntityId, World, WorldError},
        events::{CollisionEvent, EventHandler, EventKind, EventSystem},
        foundation::math::{Vec2, Vec3},
        physics::collision::{OctAxis, OctVolume},
        physics::{CollisionSystem, TickReport},
        spatial::{Rect, SpatialGrid, SpatialQuery},
        terrain::{Blocked, Heightfield, TerrainQuery},
    };
}
