//! Entity implementation

use slotmap::new_key_type;

new_key_type! {
    /// Entity identifier
    ///
    /// Index plus generation counter. A key whose slot has been reused no
    /// longer resolves, so stored references can't silently alias a new entity.
    pub struct EntityId;
}
