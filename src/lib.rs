//! # Rusty Field
//!
//! Reconstructs tables inside word processor documents that expose no table model
//! and binds named fields to their cells.
//!
//! The host document only offers a single shared cursor that moves one cell at a
//! time and reports an opaque cell identifier, a physical bounding box and a few
//! style properties. From that, this library rebuilds:
//!
//! - **Grid topology**: row/column count, merged-cell spans and a stable logical
//!   `(row, col)` for every cell
//! - **Field names**: names for unlabeled data cells, inferred from the filled
//!   header cells to their left and above
//!
//! ## Modules
//!
//! - [`cursor`]: the host capability ([`cursor::CellCursor`]) and an in-memory host
//! - [`table`]: breadth-first traversal, edge clustering and the coordinate index
//! - [`naming`]: the header-adjacency naming heuristic
//! - [`field`]: the [`field::TableField`] facade for coordinate-addressed field access
//! - [`criteria`]: tolerance, naming and filtering options
pub mod criteria;
pub mod cursor;
pub mod error;
pub mod field;
pub mod naming;
pub mod table;

pub use crate::criteria::Criteria;
pub use crate::cursor::{CellCursor, CellId, CursorError, Direction, PhysicalBox, Rgb, TableId};
pub use crate::error::RustyFieldError;
pub use crate::field::{BatchReport, CellOutcome, FieldError, TableField};
pub use crate::naming::{FieldInfo, FieldNamer, FieldSource};
pub use crate::table::{CellTopology, CoordinateIndex, GridCoordinate, GridReconstructor, TableError};
