//! Collision detection and resolution
//!
//! One call to [`CollisionSystem::step`] runs a full tick:
//!
//! 1. clear accumulators and maintain existing attachments
//! 2. broad phase over the spatial index
//! 3. swept test and classification of each candidate pair
//! 4. impulse resolution or attachment bookkeeping
//! 5. integration of the accumulated corrections
//!
//! Steps 3 and 4 only read the world. Their results are plain values that the
//! system writes into the accumulators afterwards, so the outcome for one pair
//! never depends on what happened to another pair earlier in the same tick.

pub mod attachment;
pub mod classify;
pub mod collision;
pub mod collision_system;
pub mod impulse;
pub mod integrator;
pub mod platform;

#[cfg(test)]
mod tests;

pub use attachment::{maintain_attachments, DetachReason, Detachment};
pub use classify::{classify, detect_collision, platform_sides, Interaction, RejectReason};
pub use collision_system::{CollisionSystem, TickReport};
pub use impulse::{estimate_contact, interaction_strength, recoil_factors, resolve, Contact, Correction, Resolution};
pub use integrator::integrate;
pub use platform::{pick_best, PlatformCandidate};

use crate::ecs::components::PhysicsBody;
use crate::ecs::EntityId;

/// A body together with its handle, as seen by the pure per-pair functions
#[derive(Debug, Clone, Copy)]
pub struct BodyRef<'a> {
    /// Handle of the body
    pub id: EntityId,
    /// Snapshot of the body
    pub body: &'a PhysicsBody,
}

impl<'a> BodyRef<'a> {
    /// Pair a handle with its body
    pub fn new(id: EntityId, body: &'a PhysicsBody) -> Self {
        Self { id, body }
    }
}

impl std::ops::Deref for BodyRef<'_> {
    type Target = PhysicsBody;

    fn deref(&self) -> &PhysicsBody {
        self.body
    }
}
