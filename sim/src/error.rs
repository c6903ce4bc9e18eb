//! Error types for world construction and unit placement.
//!
//! Tick execution itself never fails; everything here is raised while a
//! battle is being set up.

use crate::spatial::Cell;
use thiserror::Error;

/// Errors surfaced by the public simulation API.
#[derive(Debug, Error)]
pub enum SimError {
    /// A placement directive named an archetype the catalog does not know.
    #[error("unknown archetype `{0}`")]
    UnknownArchetype(String),

    /// A placement position or route waypoint lies outside the grid.
    #[error("cell ({x}, {y}) is outside the {width}x{height} grid", x = .cell.0, y = .cell.1)]
    OutOfBounds { cell: Cell, width: i32, height: i32 },

    /// The terrain does not cover the grid exactly.
    #[error("terrain is {actual_width}x{actual_height} but the grid is {width}x{height}")]
    TerrainMismatch {
        width: i32,
        height: i32,
        actual_width: i32,
        actual_height: i32,
    },

    /// Grid dimensions whose cell count does not fit in an `i32`.
    #[error("a {width}x{height} grid has too many cells")]
    GridTooLarge { width: i32, height: i32 },

    /// Random placement was requested on a grid without cells.
    #[error("cannot place units at random on an empty {width}x{height} grid")]
    EmptyGrid { width: i32, height: i32 },

    /// An elevation buffer whose length does not match its dimensions.
    #[error("expected {expected} elevation values, got {actual}")]
    ElevationCount { expected: usize, actual: usize },

    /// A configuration document that could not be parsed.
    #[error("malformed config: {0}")]
    Config(serde_json::Error),

    /// A scenario document that could not be parsed.
    #[error("malformed scenario: {0}")]
    Scenario(#[from] serde_json::Error),
}

pub type SimResult<T> = Result<T, SimError>;
