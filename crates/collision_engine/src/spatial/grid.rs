//! Uniform bucket grid
//!
//! Entries are stored in every cell their footprint touches. Footprints that
//! would span too many cells go to a separate list that is scanned linearly,
//! which keeps large scenery from flooding the buckets.

use std::collections::HashMap;

use log::trace;

use crate::core::config::SpatialConfig;
use crate::ecs::EntityId;
use crate::spatial::{Rect, SpatialQuery};

/// Footprints covering more cells than this are kept out of the buckets
const MAX_CELLS_PER_ENTRY: i64 = 64;

#[derive(Debug, Clone, Copy)]
struct Entry {
    entity: EntityId,
    footprint: Rect,
    is_scenery: bool,
}

/// Hash grid over the horizontal plane
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f32,
    entries: Vec<Entry>,
    cells: HashMap<(i32, i32), Vec<usize>>,
    oversized: Vec<usize>,
}

impl SpatialGrid {
    /// Create an empty grid
    pub fn new(config: &SpatialConfig) -> Self {
        Self {
            cell_size: config.cell_size.max(f32::EPSILON),
            entries: Vec::new(),
            cells: HashMap::new(),
            oversized: Vec::new(),
        }
    }

    fn cell_of(&self, v: f32) -> i32 {
        // Saturating float-to-int conversion keeps far-away coordinates in range
        (v / self.cell_size).floor() as i32
    }

    fn cell_range(&self, rect: &Rect) -> ((i32, i32), (i32, i32)) {
        (
            (self.cell_of(rect.min.x), self.cell_of(rect.min.y)),
            (self.cell_of(rect.max.x), self.cell_of(rect.max.y)),
        )
    }

    fn cell_count(lo: (i32, i32), hi: (i32, i32)) -> i64 {
        (i64::from(hi.0) - i64::from(lo.0) + 1) * (i64::from(hi.1) - i64::from(lo.1) + 1)
    }
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self::new(&SpatialConfig::default())
    }
}

impl SpatialQuery for SpatialGrid {
    fn clear(&mut self) {
        self.entries.clear();
        self.cells.clear();
        self.oversized.clear();
    }

    fn insert(&mut self, entity: EntityId, footprint: Rect, is_scenery: bool) {
        let index = self.entries.len();
        self.entries.push(Entry {
            entity,
            footprint,
            is_scenery,
        });

        let (lo, hi) = self.cell_range(&footprint);
        if Self::cell_count(lo, hi) > MAX_CELLS_PER_ENTRY {
            trace!("{:?} spans too many grid cells, storing as oversized", entity);
            self.oversized.push(index);
            return;
        }
        for x in lo.0..=hi.0 {
            for y in lo.1..=hi.1 {
                self.cells.entry((x, y)).or_default().push(index);
            }
        }
    }

    fn find(&self, area: &Rect, include_scenery: bool) -> Vec<EntityId> {
        let mut candidates: Vec<usize> = self.oversized.clone();

        let (lo, hi) = self.cell_range(area);
        if Self::cell_count(lo, hi) > MAX_CELLS_PER_ENTRY {
            candidates.extend(0..self.entries.len());
        } else {
            for x in lo.0..=hi.0 {
                for y in lo.1..=hi.1 {
                    if let Some(bucket) = self.cells.get(&(x, y)) {
                        candidates.extend_from_slice(bucket);
                    }
                }
            }
        }

        let mut found: Vec<EntityId> = candidates
            .into_iter()
            .filter_map(|i| self.entries.get(i))
            .filter(|e| (include_scenery || !e.is_scenery) && e.footprint.intersects(area))
            .map(|e| e.entity)
            .collect();
        found.sort_unstable();
        found.dedup();
        found
    }

    fn entity_count(&self) -> usize {
        self.entries.len()
    }
}
