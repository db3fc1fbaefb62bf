//! AI-facing state written by the collision pass

use crate::ecs::EntityId;

/// Team membership used to decide hostility between bumping entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Team(pub u8);

impl Team {
    /// Two entities are hostile when both belong to a team and the teams differ
    pub fn hostile(a: Option<Team>, b: Option<Team>) -> bool {
        matches!((a, b), (Some(a), Some(b)) if a != b)
    }
}

/// Alert slots the AI reads after each tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlertState {
    /// Last entity that bumped into this one
    pub last_bumped_by: Option<EntityId>,
    /// Whether the entity is currently hidden
    pub stealthed: bool,
}

impl AlertState {
    /// Record a bump from `other`
    pub fn notify_bump(&mut self, other: EntityId) {
        self.last_bumped_by = Some(other);
    }

    /// Drop stealth, returning whether it was active
    pub fn break_stealth(&mut self) -> bool {
        std::mem::replace(&mut self.stealthed, false)
    }
}
