//! Collision components
//!
//! Every entity carries two octagonal volumes: a minimal one that defines its
//! interaction size for bumps and riding, and a full one used as a carrying
//! surface and as its broad-phase footprint.

use bitflags::bitflags;

use crate::physics::collision::OctVolume;

bitflags! {
    /// Capability flags deciding how an entity takes part in collisions
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CollisionFlags: u32 {
        /// Takes part in entity collisions at all
        const CAN_COLLIDE = 1 << 0;
        /// Static world prop, skipped when scenery queries for its own candidates
        const SCENERY = 1 << 1;
        /// Pickup or loose item
        const ITEM = 1 << 2;
        /// Others may stand on top of it
        const PLATFORM = 1 << 3;
        /// May stand on platforms
        const USES_PLATFORMS = 1 << 4;
        /// May be ridden
        const MOUNT = 1 << 5;
        /// May climb onto a mount
        const RIDER = 1 << 6;
        /// Bumping hostiles does not break stealth
        const SHADE = 1 << 7;
    }
}

impl CollisionFlags {
    /// Typical walking character
    pub fn character() -> Self {
        Self::CAN_COLLIDE | Self::USES_PLATFORMS | Self::RIDER
    }

    /// Immovable prop that can be stood on
    pub fn scenery_platform() -> Self {
        Self::CAN_COLLIDE | Self::SCENERY | Self::PLATFORM
    }
}

/// Collision volumes and capabilities of an entity, in model space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    /// Interaction volume used for bumps and as rider footprint
    pub minimal: OctVolume,
    /// Expanded volume used as carrying surface and broad-phase footprint
    pub full: OctVolume,
    /// Capabilities
    pub flags: CollisionFlags,
}

impl Collider {
    /// Collider whose minimal and full volumes coincide
    pub fn new(volume: OctVolume, flags: CollisionFlags) -> Self {
        Self { minimal: volume, full: volume, flags }
    }

    /// Set a separate full volume
    pub fn with_full(mut self, full: OctVolume) -> Self {
        self.full = full;
        self
    }

    /// Whether the flag set contains `flag`
    pub fn has(&self, flag: CollisionFlags) -> bool {
        self.flags.contains(flag)
    }

    /// Whether the minimal volume has any horizontal extent
    pub fn has_interaction_size(&self) -> bool {
        self.minimal.has_horizontal_size()
    }
}
