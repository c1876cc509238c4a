//! # Table Topology Module
//!
//! Rebuilds the logical grid of a host table from the only thing the host offers:
//! a cursor that walks cell by cell and reports physical bounding boxes.
//!
//! - [`traversal`] walks the table breadth-first and collects every cell's box
//! - [`levels`] clusters noisy edge positions into row and column boundaries
//! - [`index`] places each cell on the grid with its row/column spans
use crate::cursor::{CellCursor, CursorError};
use thiserror::Error;

pub mod index;
pub mod levels;
pub mod traversal;

pub use index::{CellTopology, CoordinateIndex, GridCoordinate};
pub use traversal::{DiscoveredCell, GridReconstructor};

/// Errors that make reconstructing or addressing a table impossible.
#[derive(Error, Debug)]
pub enum TableError {
    /// The cursor is not inside a table control
    #[error("Cursor is not inside a table")]
    NotInTable,

    /// A coordinate operation was issued before the table was entered
    #[error("No table entered, call enter_table first")]
    TableNotEntered,

    /// No indexed cell covers the requested coordinate
    #[error("No cell at ({row}, {col})")]
    CellNotFound { row: usize, col: usize },

    /// The host refused to place the cursor into an indexed cell
    #[error("Cannot move cursor into cell at ({row}, {col})")]
    CellUnreachable { row: usize, col: usize },

    #[error("{0}")]
    CursorError(#[from] CursorError),
}

/// Traverses the table under the cursor and indexes it in one pass.
pub fn reconstruct<C: CellCursor>(cursor: &mut C, tolerance: u32) -> Result<CoordinateIndex, TableError> {
    let cells = GridReconstructor::new(cursor).discover()?;
    Ok(CoordinateIndex::build(&cells, tolerance))
}
