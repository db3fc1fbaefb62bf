//! ECS World implementation
//!
//! Owns every physics body. Spawning and despawning belong to the caller;
//! the collision pass only rewrites positions, velocities, links and alert
//! slots of bodies that already exist.

use slotmap::SlotMap;

use super::EntityId;
use super::components::{Attachment, AttachmentKind, DismountCooldown, PhysicsBody};

/// Errors raised by explicit registry operations
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldError {
    /// The key does not resolve to a live entity
    #[error("no such entity: {0:?}")]
    NoSuchEntity(EntityId),

    /// A dismount was requested for an entity that is not riding anything
    #[error("entity {0:?} is not mounted")]
    NotMounted(EntityId),

    /// An entity was asked to carry itself
    #[error("entity {0:?} cannot attach to itself")]
    SelfAttachment(EntityId),

    /// The target mount already has a rider
    #[error("mount {0:?} is already ridden")]
    MountOccupied(EntityId),
}

/// ECS World containing all physics entities
#[derive(Debug, Default)]
pub struct World {
    bodies: SlotMap<EntityId, PhysicsBody>,
}

impl World {
    /// Create a new world
    pub fn new() -> Self {
        Self { bodies: SlotMap::with_key() }
    }

    /// Add a body and return its handle
    pub fn spawn(&mut self, body: PhysicsBody) -> EntityId {
        self.bodies.insert(body)
    }

    /// Remove a body
    ///
    /// Links pointing at it are left in place and dropped by the next
    /// attachment maintenance, when their key fails to resolve.
    pub fn despawn(&mut self, entity: EntityId) -> Option<PhysicsBody> {
        self.bodies.remove(entity)
    }

    /// Get a body
    pub fn get(&self, entity: EntityId) -> Option<&PhysicsBody> {
        self.bodies.get(entity)
    }

    /// Get a mutable body
    pub fn get_mut(&mut self, entity: EntityId) -> Option<&mut PhysicsBody> {
        self.bodies.get_mut(entity)
    }

    /// Get two distinct bodies mutably
    pub fn get_pair_mut(
        &mut self,
        a: EntityId,
        b: EntityId,
    ) -> Option<(&mut PhysicsBody, &mut PhysicsBody)> {
        self.bodies.get_disjoint_mut([a, b]).map(|[a, b]| (a, b))
    }

    /// Number of live bodies
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Whether the world is empty
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Iterate over bodies in slot order
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &PhysicsBody)> {
        self.bodies.iter()
    }

    /// Iterate mutably over bodies in slot order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut PhysicsBody)> {
        self.bodies.iter_mut()
    }

    /// Put `rider` on `mount` directly, bypassing contact detection
    pub fn mount(&mut self, rider: EntityId, mount: EntityId) -> Result<(), WorldError> {
        if rider == mount {
            return Err(WorldError::SelfAttachment(rider));
        }
        for entity in [rider, mount] {
            if !self.bodies.contains_key(entity) {
                return Err(WorldError::NoSuchEntity(entity));
            }
        }
        let [rider_body, mount_body] = self
            .bodies
            .get_disjoint_mut([rider, mount])
            .ok_or(WorldError::NoSuchEntity(rider))?;

        if mount_body.mounted_by.is_some_and(|current| current != rider) {
            return Err(WorldError::MountOccupied(mount));
        }

        let replaced = rider_body.attachment.attach(Attachment::mount(mount));
        mount_body.mounted_by = Some(rider);
        if let Some(previous) = replaced.filter(|p| p.kind == AttachmentKind::Mount && p.carrier != mount) {
            if let Some(old) = self.bodies.get_mut(previous.carrier) {
                old.mounted_by = None;
            }
        }
        log::debug!("{:?} mounted {:?}", rider, mount);
        Ok(())
    }

    /// Explicit dismount action
    ///
    /// Detaches the rider from its mount and starts a cooldown of
    /// `cooldown_ticks` during which the pair does not collide. Returns the
    /// mount that was left.
    pub fn dismount(&mut self, rider: EntityId, cooldown_ticks: u32) -> Result<EntityId, WorldError> {
        let body = self.bodies.get_mut(rider).ok_or(WorldError::NoSuchEntity(rider))?;
        let mount = match body.attachment.current() {
            Some(Attachment { carrier, kind: AttachmentKind::Mount }) => carrier,
            _ => return Err(WorldError::NotMounted(rider)),
        };

        body.attachment.detach();
        body.cooldown = (cooldown_ticks > 0).then(|| DismountCooldown::new(mount, cooldown_ticks));
        if let Some(mount_body) = self.bodies.get_mut(mount) {
            if mount_body.mounted_by == Some(rider) {
                mount_body.mounted_by = None;
            }
        }
        log::debug!("{:?} dismounted {:?} ({} tick cooldown)", rider, mount, cooldown_ticks);
        Ok(mount)
    }

    /// Drop any link held by `rider`, clearing the mount back-reference
    pub(crate) fn detach(&mut self, rider: EntityId) -> Option<Attachment> {
        let previous = self.bodies.get_mut(rider)?.attachment.detach()?;
        if previous.kind == AttachmentKind::Mount {
            if let Some(mount) = self.bodies.get_mut(previous.carrier) {
                if mount.mounted_by == Some(rider) {
                    mount.mounted_by = None;
                }
            }
        }
        Some(previous)
    }
}
