//! Error types surfaced while loading content and querying the grid.

use thiserror::Error;

use crate::{CellCoord, PartId, Vector2D};

/// Identifies which end of the critter path a load error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Cell where critters enter the map.
    Entry,
    /// Cell where critters leave the map.
    Exit,
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Entry => f.write_str("entry"),
            Self::Exit => f.write_str("exit"),
        }
    }
}

/// Reasons a level or campaign could not be turned into a playable map.
///
/// Entering a gameplay part is the only operation allowed to fail with this
/// error; the state controller falls back to the title screen when it does.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum LoadError {
    /// The grid has no columns or no rows.
    #[error("map grid must contain at least one cell, got {columns}x{rows}")]
    EmptyGrid {
        /// Number of columns requested by the level.
        columns: u32,
        /// Number of rows requested by the level.
        rows: u32,
    },
    /// The grid holds more cells than a map may allocate.
    #[error("map grid of {columns}x{rows} exceeds the limit of {limit} cells")]
    TooManyCells {
        /// Number of columns requested by the level.
        columns: u32,
        /// Number of rows requested by the level.
        rows: u32,
        /// Largest accepted cell count.
        limit: u64,
    },
    /// The pixel size of a cell is zero, negative or not finite.
    #[error("cell size must be positive, got {cell_size}")]
    InvalidCellSize {
        /// Cell size requested by the level.
        cell_size: f32,
    },
    /// The level does not name an entry or exit cell.
    #[error("map is missing its {0} cell")]
    MissingEndpoint(Endpoint),
    /// The entry or exit cell is covered by a wall.
    #[error("map {endpoint} cell {cell:?} is blocked")]
    EndpointBlocked {
        /// Endpoint that was blocked.
        endpoint: Endpoint,
        /// Offending cell.
        cell: CellCoord,
    },
    /// Entry and exit share the same cell, leaving no path to walk.
    #[error("map entry and exit both sit on {cell:?}")]
    EntryIsExit {
        /// Shared cell.
        cell: CellCoord,
    },
    /// A referenced cell lies outside the grid.
    #[error(transparent)]
    OutOfBounds(#[from] OutOfBounds),
    /// Two consecutive path cells are not orthogonal neighbours.
    #[error("path step {index} jumps from {from:?} to {to:?}")]
    Discontiguous {
        /// Index of the offending cell within the path.
        index: usize,
        /// Cell preceding the jump.
        from: CellCoord,
        /// Cell following the jump.
        to: CellCoord,
    },
    /// The path visits the same cell twice.
    #[error("path revisits cell {cell:?}")]
    PathRevisits {
        /// Cell visited more than once.
        cell: CellCoord,
    },
    /// The path crosses a wall.
    #[error("path crosses blocked cell {cell:?}")]
    PathBlocked {
        /// Blocked cell on the path.
        cell: CellCoord,
    },
    /// The path does not begin at the entry or does not end at the exit.
    #[error("path must touch the {endpoint} cell {expected:?}, found {found:?}")]
    PathDetached {
        /// Endpoint the path failed to reach.
        endpoint: Endpoint,
        /// Cell the path was expected to touch.
        expected: CellCoord,
        /// Cell the path actually touched.
        found: CellCoord,
    },
    /// No walkable route connects entry and exit.
    #[error("no walkable route from {entry:?} to {exit:?}")]
    Unreachable {
        /// Entry cell of the map.
        entry: CellCoord,
        /// Exit cell of the map.
        exit: CellCoord,
    },
    /// The campaign has no level for the requested part.
    #[error("campaign has no level for {0:?}")]
    MissingPart(PartId),
    /// Level content could not be parsed.
    #[error("failed to parse level content: {0}")]
    Parse(String),
}

/// A grid query referenced a location outside the map.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum OutOfBounds {
    /// A pixel-space point fell outside the grid.
    #[error("point ({}, {}) lies outside the {columns}x{rows} grid", point.x, point.y)]
    Point {
        /// Queried point.
        point: Vector2D,
        /// Number of columns in the grid.
        columns: u32,
        /// Number of rows in the grid.
        rows: u32,
    },
    /// A cell coordinate fell outside the grid.
    #[error("cell ({}, {}) lies outside the {columns}x{rows} grid", cell.column(), cell.row())]
    Cell {
        /// Queried cell.
        cell: CellCoord,
        /// Number of columns in the grid.
        columns: u32,
        /// Number of rows in the grid.
        rows: u32,
    },
}
