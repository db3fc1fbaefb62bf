//! Physics body component

use crate::ecs::components::{AlertState, AttachState, Collider, CollisionFlags, DismountCooldown, Team};
use crate::ecs::EntityId;
use crate::foundation::math::Vec3;
use crate::physics::collision::{MovingVolume, OctVolume};

/// Mass of an entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mass {
    /// Regular mass in arbitrary units
    Finite(f32),
    /// Immovable; never corrected by collision resolution
    Infinite,
}

impl Mass {
    /// Whether this is the immovable sentinel
    pub fn is_infinite(&self) -> bool {
        matches!(self, Self::Infinite)
    }

    /// Whether this is a finite mass of zero
    pub fn is_zero(&self) -> bool {
        matches!(self, Self::Finite(m) if *m == 0.0)
    }
}

impl Default for Mass {
    fn default() -> Self {
        Self::Finite(1.0)
    }
}

/// Per-tick correction buffers
///
/// Reset once at the start of every tick and drained by the integrator.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Accumulators {
    /// Added to velocity
    pub velocity_delta: Vec3,
    /// Displacement from a carrier this tick
    pub platform_delta: Vec3,
    /// Displacement from separating overlaps
    pub collision_delta: Vec3,
    /// Elevation of the carrier chosen this tick
    pub support_height: Option<f32>,
}

impl Accumulators {
    /// Whether nothing was accumulated this tick
    pub fn is_empty(&self) -> bool {
        self.velocity_delta == Vec3::zeros()
            && self.platform_delta == Vec3::zeros()
            && self.collision_delta == Vec3::zeros()
            && self.support_height.is_none()
    }

    /// Raise the support height to `height` if it is higher than the current one
    pub fn support_at(&mut self, height: f32) {
        self.support_height = Some(self.support_height.map_or(height, |h| h.max(height)));
    }
}

/// A movable (or immovable) entity as seen by the collision pass
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsBody {
    /// World position of the model-space origin
    pub position: Vec3,
    /// Velocity in units per tick
    pub velocity: Vec3,
    /// Velocity at the start of the previous tick
    pub previous_velocity: Vec3,
    /// Volumes and capabilities
    pub collider: Collider,
    /// Mass or the immovable sentinel
    pub mass: Mass,
    /// Restitution coefficient
    pub bounciness: f32,
    /// Damping coefficient; 1 disables pair interactions entirely
    pub damping: f32,
    /// Team for hostility checks
    pub team: Option<Team>,
    /// AI alert slots
    pub alert: AlertState,
    /// Platform or mount link
    pub attachment: AttachState,
    /// Rider currently sitting on this mount
    pub mounted_by: Option<EntityId>,
    /// Active post-dismount cooldown
    pub cooldown: Option<DismountCooldown>,
    /// Per-tick correction buffers
    pub accumulators: Accumulators,
}

impl PhysicsBody {
    /// Create a resting body with unit mass
    pub fn new(position: Vec3, collider: Collider) -> Self {
        Self {
            position,
            velocity: Vec3::zeros(),
            previous_velocity: Vec3::zeros(),
            collider,
            mass: Mass::default(),
            bounciness: 0.0,
            damping: 0.0,
            team: None,
            alert: AlertState::default(),
            attachment: AttachState::Unattached,
            mounted_by: None,
            cooldown: None,
            accumulators: Accumulators::default(),
        }
    }

    /// Set the velocity
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self.previous_velocity = velocity;
        self
    }

    /// Set the mass
    pub fn with_mass(mut self, mass: Mass) -> Self {
        self.mass = mass;
        self
    }

    /// Set the restitution coefficient
    pub fn with_bounciness(mut self, bounciness: f32) -> Self {
        self.bounciness = bounciness;
        self
    }

    /// Set the damping coefficient
    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    /// Set the team
    pub fn with_team(mut self, team: Team) -> Self {
        self.team = Some(team);
        self
    }

    /// Capability flags
    pub fn flags(&self) -> CollisionFlags {
        self.collider.flags
    }

    /// Whether the body has the immovable mass sentinel
    pub fn is_immovable(&self) -> bool {
        self.mass.is_infinite()
    }

    /// Minimal volume in world space
    pub fn minimal_volume(&self) -> OctVolume {
        self.collider.minimal.translated(self.position)
    }

    /// Full volume in world space
    pub fn full_volume(&self) -> OctVolume {
        self.collider.full.translated(self.position)
    }

    /// World volume moving with the body's velocity
    pub fn moving(&self, full: bool) -> MovingVolume {
        let volume = if full { self.full_volume() } else { self.minimal_volume() };
        MovingVolume::new(volume, self.velocity)
    }

    /// Whether this body is a mount with nobody on it
    pub fn is_free_mount(&self) -> bool {
        self.collider.has(CollisionFlags::MOUNT) && self.mounted_by.is_none()
    }

    /// Whether this body can carry `rider` as a platform
    pub fn can_carry(&self, rider: &PhysicsBody) -> bool {
        self.collider.has(CollisionFlags::PLATFORM)
            && rider.collider.has(CollisionFlags::USES_PLATFORMS)
            && !rider.is_immovable()
            && !rider.attachment.is_mounted()
    }
}
