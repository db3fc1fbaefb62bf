//! Entity registry for the collision pass
//!
//! Entities are plain physics bodies addressed by generational keys. The
//! registry is the single shared mutable resource the collision pass writes.

pub mod entity;
pub mod components;
pub mod world;

pub use entity::EntityId;
pub use world::{World, WorldError};
