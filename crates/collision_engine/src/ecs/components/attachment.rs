//! Rider to carrier links
//!
//! A rider holds at most one link, either resting on a platform or sitting on
//! a mount. The carrier key is generational and is re-validated whenever the
//! link is followed.

use crate::ecs::EntityId;

/// What kind of carrier a rider is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentKind {
    /// Resting on top of a platform
    Platform,
    /// Riding a mount
    Mount,
}

/// Link from a rider to its carrier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attachment {
    /// The carrying entity
    pub carrier: EntityId,
    /// Platform or mount
    pub kind: AttachmentKind,
}

impl Attachment {
    /// Platform link to `carrier`
    pub fn platform(carrier: EntityId) -> Self {
        Self { carrier, kind: AttachmentKind::Platform }
    }

    /// Mount link to `carrier`
    pub fn mount(carrier: EntityId) -> Self {
        Self { carrier, kind: AttachmentKind::Mount }
    }
}

/// Attachment state machine of a single rider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AttachState {
    /// Free standing
    #[default]
    Unattached,
    /// Carried by another entity
    Attached(Attachment),
}

impl AttachState {
    /// Attach to a carrier, returning the link that was replaced
    pub fn attach(&mut self, attachment: Attachment) -> Option<Attachment> {
        match std::mem::replace(self, Self::Attached(attachment)) {
            Self::Attached(previous) => Some(previous),
            Self::Unattached => None,
        }
    }

    /// Detach, returning the link that was dropped
    pub fn detach(&mut self) -> Option<Attachment> {
        match std::mem::take(self) {
            Self::Attached(previous) => Some(previous),
            Self::Unattached => None,
        }
    }

    /// Current link, if any
    pub fn current(&self) -> Option<Attachment> {
        match self {
            Self::Attached(attachment) => Some(*attachment),
            Self::Unattached => None,
        }
    }

    /// Whether the rider is attached to `carrier` with the given kind
    pub fn is_attached_to(&self, carrier: EntityId, kind: AttachmentKind) -> bool {
        self.current()
            .is_some_and(|a| a.carrier == carrier && a.kind == kind)
    }

    /// Whether the rider currently sits on a mount
    pub fn is_mounted(&self) -> bool {
        self.current().is_some_and(|a| a.kind == AttachmentKind::Mount)
    }
}

/// Cooldown started by an explicit dismount
///
/// While active the rider ignores its former mount entirely and its other
/// collisions are softened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DismountCooldown {
    /// The mount that was left
    pub from: EntityId,
    /// Ticks left
    pub remaining: u32,
    /// Full cooldown length
    pub total: u32,
}

impl DismountCooldown {
    /// Start a cooldown of `total` ticks
    pub fn new(from: EntityId, total: u32) -> Self {
        Self { from, remaining: total, total }
    }

    /// Fraction of the cooldown still to run, in `[0, 1]`
    pub fn ramp(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            (self.remaining as f32 / self.total as f32).min(1.0)
        }
    }

    /// Advance one tick, returning whether the cooldown is still active
    pub fn tick(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining > 0
    }
}
