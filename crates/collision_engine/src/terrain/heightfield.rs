//! Column heightfield terrain

use std::collections::HashMap;

use crate::foundation::math::Vec3;
use crate::terrain::{Blocked, TerrainQuery};

/// Terrain made of square columns, each with a solid top
///
/// A position inside a column (below its top) is blocked in every horizontal
/// direction and downward, so the integrator rolls a step into it back.
#[derive(Debug, Clone)]
pub struct Heightfield {
    cell_size: f32,
    default_height: f32,
    columns: HashMap<(i32, i32), f32>,
}

impl Heightfield {
    /// Flat ground at `default_height` with square columns of `cell_size`
    pub fn new(cell_size: f32, default_height: f32) -> Self {
        Self {
            cell_size: cell_size.max(f32::EPSILON),
            default_height,
            columns: HashMap::new(),
        }
    }

    /// Builder: set one column's height
    pub fn with_column(mut self, x: i32, y: i32, height: f32) -> Self {
        self.set_column(x, y, height);
        self
    }

    /// Set one column's height
    pub fn set_column(&mut self, x: i32, y: i32, height: f32) {
        self.columns.insert((x, y), height);
    }

    /// Column index containing a point
    pub fn column_of(&self, position: Vec3) -> (i32, i32) {
        (
            (position.x / self.cell_size).floor() as i32,
            (position.y / self.cell_size).floor() as i32,
        )
    }

    /// Top of the column containing `position`
    pub fn height_at(&self, position: Vec3) -> f32 {
        self.columns
            .get(&self.column_of(position))
            .copied()
            .unwrap_or(self.default_height)
    }
}

impl TerrainQuery for Heightfield {
    fn blocked(&self, position: Vec3) -> Blocked {
        if position.z < self.height_at(position) {
            Blocked::HORIZONTAL | Blocked::NEG_Z
        } else {
            Blocked::empty()
        }
    }

    fn floor_height(&self, position: Vec3) -> f32 {
        self.height_at(position)
    }
}
