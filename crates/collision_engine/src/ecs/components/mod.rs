//! Components carried by every physics entity

pub mod alert;
pub mod attachment;
pub mod body;
pub mod collision;

pub use alert::{AlertState, Team};
pub use attachment::{AttachState, Attachment, AttachmentKind, DismountCooldown};
pub use body::{Accumulators, Mass, PhysicsBody};
pub use collision::{Collider, CollisionFlags};
