//! Abstract spatial query interface for broad-phase collision detection
//!
//! The broad phase quickly narrows the set of pairs that might collide this
//! tick. Implementations only need to be conservative: returning extra
//! candidates costs time, missing one loses a collision.

use crate::ecs::EntityId;
use crate::spatial::Rect;

/// Interface for spatial partitioning used by the collision system
///
/// The index is rebuilt from scratch every tick, so there is no update or
/// remove operation.
pub trait SpatialQuery: Send + Sync {
    /// Remove every entry
    fn clear(&mut self);

    /// Register an entity covering `footprint`
    ///
    /// Scenery entries are kept apart so scenery-to-scenery pairs can be
    /// skipped.
    fn insert(&mut self, entity: EntityId, footprint: Rect, is_scenery: bool);

    /// Entities whose footprint intersects `area`, sorted and without repeats
    fn find(&self, area: &Rect, include_scenery: bool) -> Vec<EntityId>;

    /// Number of registered entities
    fn entity_count(&self) -> usize;
}

/// Brute-force implementation that checks every entry
///
/// Useful as a reference for tests and for very small worlds.
#[derive(Debug, Default, Clone)]
pub struct LinearQuery {
    entries: Vec<(EntityId, Rect, bool)>,
}

impl LinearQuery {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }
}

impl SpatialQuery for LinearQuery {
    fn clear(&mut self) {
        self.entries.clear();
    }

    fn insert(&mut self, entity: EntityId, footprint: Rect, is_scenery: bool) {
        self.entries.push((entity, footprint, is_scenery));
    }

    fn find(&self, area: &Rect, include_scenery: bool) -> Vec<EntityId> {
        let mut found: Vec<EntityId> = self
            .entries
            .iter()
            .filter(|(_, rect, scenery)| (include_scenery || !scenery) && rect.intersects(area))
            .map(|(id, _, _)| *id)
            .collect();
        found.sort_unstable();
        found.dedup();
        found
    }

    fn entity_count(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn test_linear_query_filters_scenery() {
        let mut keys: SlotMap<EntityId, ()> = SlotMap::with_key();
        let mover = keys.insert(());
        let wall = keys.insert(());

        let mut query = LinearQuery::new();
        query.insert(mover, Rect::new(0.0, 0.0, 1.0, 1.0), false);
        query.insert(wall, Rect::new(0.5, 0.5, 3.0, 3.0), true);

        let area = Rect::new(0.8, 0.8, 0.9, 0.9);
        assert_eq!(query.find(&area, true), vec![mover, wall]);
        assert_eq!(query.find(&area, false), vec![mover]);
        assert_eq!(query.entity_count(), 2);

        query.clear();
        assert!(query.find(&area, true).is_empty());
    }
}
