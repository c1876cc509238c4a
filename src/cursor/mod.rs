//! # Host Cursor Module
//!
//! The host word processor exposes no table model. All the crate can do is move a
//! single shared cursor one cell at a time and query the cell under it. This module
//! describes that narrow capability as the [`CellCursor`] trait, together with the
//! plain value types the host hands back (cell identifiers, bounding boxes, colors).
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::ops::{Deref, DerefMut};
use thiserror::Error;
use tracing::warn;

pub mod memory;

/// Errors raised by a host cursor adapter.
#[derive(Error, Debug)]
pub enum CursorError {
    /// The cursor is not placed inside any table cell
    #[error("Cursor is not inside a table cell")]
    NotInCell,

    /// The host refused to read a cell property
    #[error("Read property '{property}' of cell {cell} failed: {message}")]
    PropertyReadFailure {
        cell: CellId,
        property: &'static str,
        message: String,
    },

    /// The host refused a field create/rename/delete/put request
    #[error("Field operation '{operation}' failed: {message}")]
    FieldOperationFailure {
        operation: &'static str,
        message: String,
    },

    /// Any other failure reported by the host automation layer
    #[error("{0}")]
    HostError(#[from] anyhow::Error),
}

pub type CursorResult<T> = Result<T, CursorError>;

/// Opaque per-cell handle assigned by the host document.
///
/// Only identity is meaningful, never the numeric value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellId(pub u64);

impl Display for CellId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Opaque identifier of the control (table) enclosing the cursor.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TableId(pub u64);

/// Cell bounding rectangle in host length units.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PhysicalBox {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl PhysicalBox {
    pub const fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self { x, y, width, height }
    }

    pub const fn left(&self) -> i64 {
        self.x
    }

    pub const fn right(&self) -> i64 {
        self.x + self.width
    }

    pub const fn top(&self) -> i64 {
        self.y
    }

    pub const fn bottom(&self) -> i64 {
        self.y + self.height
    }
}

/// Background fill color of a cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Relative cursor movements supported by the host.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    StartOfRow,
    EndOfRow,
}

impl Direction {
    /// The four moves used to probe a cell's neighbors.
    pub const NEIGHBORS: [Direction; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];
}

/// Stateful handle into the host document.
///
/// The cursor is shared with the host UI, so callers that move it should hold a
/// [`CursorGuard`] for the duration of the work.
pub trait CellCursor {
    /// Saved cursor location, restorable through [`CellCursor::restore_position`].
    type Position: Clone;

    fn position(&mut self) -> CursorResult<Self::Position>;

    fn restore_position(&mut self, position: Self::Position) -> CursorResult<()>;

    /// Moves the cursor relatively; returns whether the cell identifier changed.
    fn move_relative(&mut self, direction: Direction) -> CursorResult<bool>;

    /// Places the cursor directly into the given cell; returns false if unknown.
    fn move_to_cell(&mut self, cell: CellId) -> CursorResult<bool>;

    fn current_cell_id(&mut self) -> CursorResult<CellId>;

    fn current_bounding_box(&mut self) -> CursorResult<PhysicalBox>;

    fn current_background(&mut self) -> CursorResult<Option<Rgb>>;

    fn current_text(&mut self) -> CursorResult<String>;

    /// Table control around the cursor, `None` once the cursor left every table.
    fn enclosing_table_id(&mut self) -> CursorResult<Option<TableId>>;

    /// Name of a bookmark anchored inside the current cell, if any.
    fn bookmark_in_cell(&mut self) -> CursorResult<Option<String>>;

    /// Caption text attached to the enclosing table, if any.
    fn table_caption(&mut self) -> CursorResult<Option<String>>;

    fn set_field_name(&mut self, name: &str) -> CursorResult<bool>;

    fn get_field_name(&mut self) -> CursorResult<Option<String>>;

    fn get_field_text(&mut self, name: &str) -> CursorResult<String>;

    fn put_field_text(&mut self, name: &str, text: &str) -> CursorResult<()>;

    fn rename_field(&mut self, old_name: &str, new_name: &str) -> CursorResult<()>;

    /// Removes the field bound to the current cell.
    fn delete_field(&mut self) -> CursorResult<bool>;
}

/// Scoped cursor acquisition.
///
/// Snapshots the cursor position on creation and restores it when dropped, on
/// success and error paths alike.
pub struct CursorGuard<'a, C: CellCursor> {
    cursor: &'a mut C,
    saved: Option<C::Position>,
}

impl<'a, C: CellCursor> CursorGuard<'a, C> {
    pub fn new(cursor: &'a mut C) -> CursorResult<Self> {
        let saved = Some(cursor.position()?);
        Ok(Self { cursor, saved })
    }
}

impl<C: CellCursor> Deref for CursorGuard<'_, C> {
    type Target = C;

    fn deref(&self) -> &Self::Target {
        &*self.cursor
    }
}

impl<C: CellCursor> DerefMut for CursorGuard<'_, C> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.cursor
    }
}

impl<C: CellCursor> Drop for CursorGuard<'_, C> {
    fn drop(&mut self) {
        if let Some(position) = self.saved.take() {
            if let Err(error) = self.cursor.restore_position(position) {
                warn!(%error, "restore cursor position failed");
            }
        }
    }
}
