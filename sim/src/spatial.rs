//! Bounded multi-occupancy grid of unit positions.
//!
//! Every registered unit, dead or alive, occupies exactly one cell. Cells
//! keep their occupants in arrival order, which keeps scans reproducible
//! for a given seed.

use crate::components::UnitId;
use crate::error::{SimError, SimResult};
use bevy_ecs::prelude::*;
use std::collections::HashMap;

/// Integer grid coordinate `(x, y)`.
pub type Cell = (i32, i32);

/// Number of cells in a `width` x `height` grid. Fails when the count does
/// not fit in an `i32`, which also bounds every row-major index.
pub fn cell_count(width: i32, height: i32) -> SimResult<usize> {
    width
        .max(0)
        .checked_mul(height.max(0))
        .map(|count| count as usize)
        .ok_or(SimError::GridTooLarge { width, height })
}

/// Cell count for constructors that cannot fail; saturates instead of
/// wrapping.
pub(crate) fn area(width: i32, height: i32) -> usize {
    (width.max(0) as usize).saturating_mul(height.max(0) as usize)
}

/// Grid-based occupancy index.
#[derive(Resource, Debug, Clone)]
pub struct BattleGrid {
    width: i32,
    height: i32,
    /// Occupants per cell, row-major.
    cells: Vec<Vec<UnitId>>,
    /// Reverse lookup: unit to cell.
    unit_cells: HashMap<UnitId, Cell>,
}

impl BattleGrid {
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            cells: vec![Vec::new(); area(width, height)],
            unit_cells: HashMap::new(),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, (x, y): Cell) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    /// Fails with `OutOfBounds` for cells outside the grid.
    pub fn check_bounds(&self, cell: Cell) -> SimResult<()> {
        if self.in_bounds(cell) {
            Ok(())
        } else {
            Err(SimError::OutOfBounds {
                cell,
                width: self.width,
                height: self.height,
            })
        }
    }

    #[inline]
    fn cell_index(&self, cell: Cell) -> Option<usize> {
        if self.in_bounds(cell) {
            Some(cell.1 as usize * self.width as usize + cell.0 as usize)
        } else {
            None
        }
    }

    /// All cells within Chebyshev distance `radius` of `center`, clipped to
    /// the grid. Ordered by x, then y.
    pub fn neighborhood(&self, center: Cell, radius: i32, include_center: bool) -> Vec<Cell> {
        let radius = radius.max(0);
        let mut cells = Vec::new();
        for dx in -radius..=radius {
            for dy in -radius..=radius {
                if dx == 0 && dy == 0 && !include_center {
                    continue;
                }
                let cell = (center.0 + dx, center.1 + dy);
                if self.in_bounds(cell) {
                    cells.push(cell);
                }
            }
        }
        cells
    }

    /// Units standing on `cell`. Empty for out-of-bounds cells.
    pub fn occupants_at(&self, cell: Cell) -> &[UnitId] {
        match self.cell_index(cell) {
            Some(index) => &self.cells[index],
            None => &[],
        }
    }

    /// Put a unit on the grid. A unit already on the grid is moved instead.
    pub fn place(&mut self, id: UnitId, cell: Cell) -> SimResult<()> {
        self.check_bounds(cell)?;
        if self.unit_cells.contains_key(&id) {
            self.move_to(id, cell);
            return Ok(());
        }
        if let Some(index) = self.cell_index(cell) {
            self.cells[index].push(id);
        }
        self.unit_cells.insert(id, cell);
        Ok(())
    }

    /// Relocate a placed unit. Returns `false`, leaving the grid untouched,
    /// for an unknown unit or an out-of-bounds destination.
    pub fn move_to(&mut self, id: UnitId, cell: Cell) -> bool {
        let Some(new_index) = self.cell_index(cell) else {
            return false;
        };
        let Some(old_cell) = self.unit_cells.get(&id).copied() else {
            return false;
        };
        if old_cell == cell {
            return true;
        }
        if let Some(old_index) = self.cell_index(old_cell) {
            self.cells[old_index].retain(|occupant| *occupant != id);
        }
        self.cells[new_index].push(id);
        self.unit_cells.insert(id, cell);
        true
    }

    pub fn position_of(&self, id: UnitId) -> Option<Cell> {
        self.unit_cells.get(&id).copied()
    }

    /// Get total unit count.
    pub fn total_count(&self) -> usize {
        self.unit_cells.len()
    }

    /// Sum of all per-cell occupant counts.
    pub fn occupancy_sum(&self) -> usize {
        self.cells.iter().map(Vec::len).sum()
    }
}
