//! Terrain elevation.
//!
//! The terrain is an immutable grid of elevation values supplied before
//! the first tick. It only feeds the damage modifier, which is calibrated
//! for elevations in `[0, 1]`, but no range is enforced.

use crate::error::{SimError, SimResult};
use crate::spatial::{area, cell_count, Cell};
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Grid-based elevation map.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainGrid {
    /// Width of the grid in cells.
    pub width: i32,
    /// Height of the grid in cells.
    pub height: i32,
    /// Elevation per cell (row-major order).
    elevations: Vec<f32>,
}

impl TerrainGrid {
    /// Wrap a row-major elevation buffer (`index = y * width + x`).
    pub fn new(width: i32, height: i32, elevations: Vec<f32>) -> SimResult<Self> {
        let expected = cell_count(width, height)?;
        if elevations.len() != expected {
            return Err(SimError::ElevationCount {
                expected,
                actual: elevations.len(),
            });
        }
        Ok(Self {
            width,
            height,
            elevations,
        })
    }

    /// Level terrain at a constant elevation.
    pub fn flat(width: i32, height: i32, elevation: f32) -> Self {
        let len = area(width, height);
        Self {
            width,
            height,
            elevations: vec![elevation; len],
        }
    }

    /// Build terrain by evaluating `f(x, y)` for every cell.
    pub fn from_fn(width: i32, height: i32, mut f: impl FnMut(i32, i32) -> f32) -> Self {
        let mut elevations = Vec::with_capacity(area(width, height));
        for y in 0..height {
            for x in 0..width {
                elevations.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            elevations,
        }
    }

    /// Get the cell index for grid coordinates.
    fn cell_index(&self, (x, y): Cell) -> Option<usize> {
        if x >= 0 && y >= 0 && x < self.width && y < self.height {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    /// Elevation at a cell; 0.0 outside the grid.
    pub fn elevation_at(&self, cell: Cell) -> f32 {
        self.cell_index(cell)
            .and_then(|i| self.elevations.get(i).copied())
            .unwrap_or(0.0)
    }

    /// Ensure the terrain covers a `width` x `height` grid exactly.
    pub fn check_dimensions(&self, width: i32, height: i32) -> SimResult<()> {
        if self.width == width && self.height == height {
            Ok(())
        } else {
            Err(SimError::TerrainMismatch {
                width,
                height,
                actual_width: self.width,
                actual_height: self.height,
            })
        }
    }

    pub fn elevations(&self) -> &[f32] {
        &self.elevations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terrain_grid_creation() {
        let grid = TerrainGrid::flat(100, 100, 0.5);
        assert_eq!(grid.width, 100);
        assert_eq!(grid.height, 100);
        assert_eq!(grid.elevations().len(), 10000);
        assert_eq!(grid.elevation_at((99, 99)), 0.5);
    }

    #[test]
    fn test_row_major_layout() {
        let grid = TerrainGrid::from_fn(4, 3, |x, y| (x * 10 + y) as f32);
        assert_eq!(grid.elevation_at((3, 0)), 30.0);
        assert_eq!(grid.elevation_at((1, 2)), 12.0);
        assert_eq!(grid.elevation_at((4, 0)), 0.0);
    }

    #[test]
    fn test_elevation_count_checked() {
        let err = TerrainGrid::new(3, 3, vec![0.0; 8]).unwrap_err();
        assert!(matches!(err, SimError::ElevationCount { expected: 9, actual: 8 }));
    }

    #[test]
    fn test_dimension_check() {
        let grid = TerrainGrid::flat(10, 20, 0.0);
        assert!(grid.check_dimensions(10, 20).is_ok());
        assert!(matches!(
            grid.check_dimensions(20, 10),
            Err(SimError::TerrainMismatch { .. })
        ));
    }
}
