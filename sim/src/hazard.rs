//! Latent hazards (mines) per cell.
//!
//! Counts only ever go down during a battle. A cell without an entry holds
//! no hazards, and an entry is removed the moment its count reaches zero.

use crate::rng::SimRng;
use crate::spatial::Cell;
use bevy_ecs::prelude::*;
use std::collections::BTreeMap;

/// Depletable hazard counts keyed by cell.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct HazardField {
    counts: BTreeMap<Cell, u32>,
}

impl HazardField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a field from explicit counts, dropping zero entries.
    pub fn from_counts(counts: impl IntoIterator<Item = (Cell, u32)>) -> Self {
        let mut field = Self::new();
        for (cell, count) in counts {
            field.set(cell, count);
        }
        field
    }

    /// Fill the half-open rectangle `[min, max)` with uniformly random
    /// counts in `0..=max_per_cell`, visiting cells column by column.
    pub fn scatter(min: Cell, max: Cell, max_per_cell: u32, rng: &mut SimRng) -> Self {
        let mut field = Self::new();
        for x in min.0..max.0 {
            for y in min.1..max.1 {
                field.set((x, y), rng.up_to(max_per_cell));
            }
        }
        field
    }

    pub fn set(&mut self, cell: Cell, count: u32) {
        if count == 0 {
            self.counts.remove(&cell);
        } else {
            self.counts.insert(cell, count);
        }
    }

    pub fn count_at(&self, cell: Cell) -> u32 {
        self.counts.get(&cell).copied().unwrap_or(0)
    }

    /// Set off one hazard at `cell`. Returns `false` when there is none.
    pub fn trigger(&mut self, cell: Cell) -> bool {
        let Some(count) = self.counts.get_mut(&cell) else {
            return false;
        };
        *count -= 1;
        if *count == 0 {
            self.counts.remove(&cell);
        }
        true
    }

    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Non-empty cells in coordinate order.
    pub fn iter(&self) -> impl Iterator<Item = (Cell, u32)> + '_ {
        self.counts.iter().map(|(cell, count)| (*cell, *count))
    }
}
