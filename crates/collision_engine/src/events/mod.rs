//! Collision notifications
//!
//! The collision system records what happened during a tick as
//! [`CollisionEvent`]s in its report. Game code that wants callbacks can feed
//! them through an [`EventSystem`]:
//! - handlers register for one [`EventKind`] and are only told about that kind
//! - a handler returning `true` consumes the event and stops forwarding

use std::collections::HashMap;

use crate::ecs::components::AttachmentKind;
use crate::ecs::EntityId;

/// Something observable that happened while resolving a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionEvent {
    /// Two bodies hit each other
    Bumped {
        /// First body of the pair
        a: EntityId,
        /// Second body of the pair
        b: EntityId,
    },
    /// A bump between hostile bodies revealed both of them
    StealthBroken {
        /// First body of the pair
        a: EntityId,
        /// Second body of the pair
        b: EntityId,
    },
    /// A rider became attached to a carrier
    Attached {
        /// The attached body
        rider: EntityId,
        /// The platform or mount
        carrier: EntityId,
        /// Platform or mount link
        kind: AttachmentKind,
    },
    /// A rider lost its attachment
    Detached {
        /// The released body
        rider: EntityId,
        /// The former platform or mount
        carrier: EntityId,
        /// Platform or mount link
        kind: AttachmentKind,
    },
}

/// Discriminant of [`CollisionEvent`], used for handler registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// [`CollisionEvent::Bumped`]
    Bumped,
    /// [`CollisionEvent::StealthBroken`]
    StealthBroken,
    /// [`CollisionEvent::Attached`]
    Attached,
    /// [`CollisionEvent::Detached`]
    Detached,
}

impl CollisionEvent {
    /// The kind of this event
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Bumped { .. } => EventKind::Bumped,
            Self::StealthBroken { .. } => EventKind::StealthBroken,
            Self::Attached { .. } => EventKind::Attached,
            Self::Detached { .. } => EventKind::Detached,
        }
    }

    /// Whether `entity` takes part in this event
    pub fn involves(&self, entity: EntityId) -> bool {
        match *self {
            Self::Bumped { a, b } | Self::StealthBroken { a, b } => a == entity || b == entity,
            Self::Attached { rider, carrier, .. } | Self::Detached { rider, carrier, .. } => {
                rider == entity || carrier == entity
            }
        }
    }
}

/// Event handler trait
/// Returns true if the event was consumed (stops forwarding)
pub trait EventHandler {
    /// Handle an event, return true if consumed
    fn on_event(&mut self, event: &CollisionEvent) -> bool;
}

impl<F> EventHandler for F
where
    F: FnMut(&CollisionEvent) -> bool,
{
    fn on_event(&mut self, event: &CollisionEvent) -> bool {
        self(event)
    }
}

/// Event system with registration and queuing
pub struct EventSystem {
    queue: Vec<CollisionEvent>,
    handlers: HashMap<EventKind, Vec<Box<dyn EventHandler>>>,
}

impl EventSystem {
    /// Create a new empty event system
    pub fn new() -> Self {
        Self {
            queue: Vec::new(),
            handlers: HashMap::new(),
        }
    }

    /// Register a handler for one kind of event
    pub fn register_handler(&mut self, kind: EventKind, handler: Box<dyn EventHandler>) {
        self.handlers.entry(kind).or_default().push(handler);
    }

    /// Queue an event for the next dispatch
    pub fn send(&mut self, event: CollisionEvent) {
        self.queue.push(event);
    }

    /// Queue every event of a tick, preserving order
    pub fn send_all(&mut self, events: impl IntoIterator<Item = CollisionEvent>) {
        self.queue.extend(events);
    }

    /// Number of queued events
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Deliver all queued events in order, returning how many were consumed
    pub fn dispatch(&mut self) -> usize {
        let queued = std::mem::take(&mut self.queue);
        let mut consumed = 0;
        for event in &queued {
            if let Some(handlers) = self.handlers.get_mut(&event.kind()) {
                for handler in handlers.iter_mut() {
                    if handler.on_event(event) {
                        consumed += 1;
                        break;
                    }
                }
            }
        }
        consumed
    }

    /// Drop queued events without delivering them
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

impl Default for EventSystem {
    fn default() -> Self {
        Self::new()
    }
}
