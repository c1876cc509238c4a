//! # Table Field Module
//!
//! Binds named fields to the cells of a reconstructed table. [`TableField`] keeps
//! the coordinate index of the last entered table and translates every logical
//! `(row, col)` request into a cursor move plus a host field call.
//!
//! Batch operations never stop at the first failing cell: each cell is attempted
//! on its own and the outcome lands in a [`BatchReport`].
use crate::criteria::Criteria;
use crate::cursor::{CellCursor, CursorGuard};
use crate::error::{ResultMessage, RustyFieldError};
use crate::field::export::GridSnapshot;
use crate::field::schema::JsonFieldName;
use crate::naming::text::sanitize_caption;
use crate::naming::{FieldInfo, FieldNamer, NamingCell};
use crate::table::{reconstruct, CellTopology, CoordinateIndex, GridCoordinate, TableError};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{info, warn};

pub mod export;
pub mod report;
pub mod schema;

pub use report::{BatchReport, CellOutcome};

/// Errors related to field operations on a single cell.
#[derive(Error, Debug)]
pub enum FieldError {
    #[error("No field bound to cell at ({row}, {col})")]
    MissingField { row: usize, col: usize },

    #[error("Invalid field name '{0}'")]
    InvalidFieldName(String),

    #[error("Host rejected field name '{name}' at ({row}, {col})")]
    Rejected { row: usize, col: usize, name: String },
}

/// Row band used by structured field names.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Band {
    Head,
    Body,
    Foot,
}

impl Band {
    /// Band of `row` in a table of `rows` rows; the head band wins on overlap.
    pub fn of(row: usize, rows: usize, header_rows: usize, footer_rows: usize) -> Self {
        if row < header_rows {
            Band::Head
        } else if row >= rows.saturating_sub(footer_rows) {
            Band::Foot
        } else {
            Band::Body
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Band::Head => "head",
            Band::Body => "body",
            Band::Foot => "foot",
        }
    }
}

/// Coordinate-addressed field access to one table of the host document.
pub struct TableField<C: CellCursor> {
    cursor: C,
    criteria: Criteria,
    index: Option<CoordinateIndex>,
}

impl<C: CellCursor> TableField<C> {
    pub fn new(cursor: C, criteria: Criteria) -> Self {
        Self { cursor, criteria, index: None }
    }

    pub fn cursor(&self) -> &C {
        &self.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut C {
        &mut self.cursor
    }

    pub fn into_inner(self) -> C {
        self.cursor
    }

    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    /// Rebuilds the coordinate index from the table under the cursor.
    /// Returns the number of indexed cells.
    pub fn enter_table(&mut self) -> Result<usize, RustyFieldError> {
        self.index = None;
        let index = reconstruct(&mut self.cursor, self.criteria.tolerance)
            .map_err(RustyFieldError::from)
            .with_prefix("Enter table failed")?;
        info!(
            rows = index.row_count(),
            cols = index.col_count(),
            cells = index.topology.len(),
            "table entered"
        );
        let count = index.topology.len();
        self.index = Some(index);
        Ok(count)
    }

    pub fn index(&self) -> Result<&CoordinateIndex, TableError> {
        self.index.as_ref().ok_or(TableError::TableNotEntered)
    }

    pub fn row_count(&self) -> Result<usize, TableError> {
        Ok(self.index()?.row_count())
    }

    pub fn col_count(&self) -> Result<usize, TableError> {
        Ok(self.index()?.col_count())
    }

    /// Indexed cells ordered by representative coordinate.
    pub fn cells(&self) -> Result<&[CellTopology], TableError> {
        Ok(&self.index()?.topology)
    }

    /// Cell covering the coordinate, merged cells included.
    pub fn cell_at(&self, row: usize, col: usize) -> Result<&CellTopology, TableError> {
        self.index()?
            .cell_at(row, col)
            .ok_or(TableError::CellNotFound { row, col })
    }

    /// Runs `action` with the cursor placed in the cell covering `(row, col)`.
    fn with_cell<T, F>(&mut self, row: usize, col: usize, action: F) -> Result<T, RustyFieldError>
    where
        F: FnOnce(&mut C) -> Result<T, RustyFieldError>,
    {
        let id = self.cell_at(row, col)?.id;
        let mut cursor = CursorGuard::new(&mut self.cursor)?;
        if !cursor.move_to_cell(id)? {
            Err(TableError::CellUnreachable { row, col })?
        }
        action(&mut *cursor)
    }

    pub fn get_field_at(&mut self, row: usize, col: usize) -> Result<Option<String>, RustyFieldError> {
        self.with_cell(row, col, |cursor| Ok(cursor.get_field_name()?))
    }

    pub fn set_field_at(&mut self, row: usize, col: usize, name: &str) -> Result<(), RustyFieldError> {
        if name.trim().is_empty() {
            Err(FieldError::InvalidFieldName(name.to_owned()))?
        }
        self.with_cell(row, col, |cursor| {
            if cursor.set_field_name(name)? {
                Ok(())
            } else {
                Err(FieldError::Rejected { row, col, name: name.to_owned() })?
            }
        })
    }

    /// Renames the field bound to `(row, col)`; returns the previous name.
    pub fn rename(&mut self, row: usize, col: usize, new_name: &str) -> Result<String, RustyFieldError> {
        if new_name.trim().is_empty() {
            Err(FieldError::InvalidFieldName(new_name.to_owned()))?
        }
        let old_name = self.required_field(row, col)?;
        self.cursor.rename_field(&old_name, new_name)?;
        Ok(old_name)
    }

    /// Removes the field bound to `(row, col)`; returns whether one existed.
    pub fn delete(&mut self, row: usize, col: usize) -> Result<bool, RustyFieldError> {
        self.with_cell(row, col, |cursor| Ok(cursor.delete_field()?))
    }

    pub fn put_text(&mut self, row: usize, col: usize, text: &str) -> Result<(), RustyFieldError> {
        let name = self.required_field(row, col)?;
        Ok(self.cursor.put_field_text(&name, text)?)
    }

    pub fn get_text(&mut self, row: usize, col: usize) -> Result<String, RustyFieldError> {
        let name = self.required_field(row, col)?;
        Ok(self.cursor.get_field_text(&name)?)
    }

    fn required_field(&mut self, row: usize, col: usize) -> Result<String, RustyFieldError> {
        self.get_field_at(row, col)?
            .ok_or(FieldError::MissingField { row, col }.into())
    }

    /// Names every cell `{caption}_{band}_{row}_{col}` by its representative coordinate.
    ///
    /// The caption falls back to the table's own caption, then to the configured
    /// fallback; it is reduced to alphanumerics and underscores either way. Band
    /// sizes left as None come from [`Criteria`].
    pub fn set_structured_field_names(
        &mut self,
        caption: Option<&str>,
        header_rows: Option<usize>,
        footer_rows: Option<usize>,
    ) -> Result<BatchReport, RustyFieldError> {
        let header_rows = header_rows.unwrap_or(self.criteria.header_rows);
        let footer_rows = footer_rows.unwrap_or(self.criteria.footer_rows);
        let caption = self.resolve_caption(caption);
        let index = self.index()?;
        let rows = index.row_count();
        let names: Vec<(CellTopology, String)> = index
            .topology
            .iter()
            .map(|entry| {
                let band = Band::of(entry.row, rows, header_rows, footer_rows);
                let name = format!("{}_{}_{}_{}", caption, band.as_str(), entry.row, entry.col);
                (*entry, name)
            })
            .collect();
        self.apply_names(names)
    }

    /// Binds a JSON-encoded [`JsonFieldName`] to every cell.
    pub fn set_table_fields_json(&mut self, table_name: &str) -> Result<BatchReport, RustyFieldError> {
        let names = self
            .index()?
            .topology
            .iter()
            .map(|entry| {
                let name = JsonFieldName::new(table_name, entry.coordinate()).encode()?;
                Ok((*entry, name))
            })
            .collect::<Result<Vec<(CellTopology, String)>, RustyFieldError>>()?;
        self.apply_names(names)
    }

    /// Infers field names for every unmarked cell with [`FieldNamer`].
    ///
    /// Unreadable cell properties fall back to defaults: no fill, empty text, no
    /// bookmark.
    pub fn name_fields(&mut self) -> Result<Vec<FieldInfo>, RustyFieldError> {
        let topology = self.index()?.topology.clone();
        let mut cursor = CursorGuard::new(&mut self.cursor)?;
        let mut cells = Vec::with_capacity(topology.len());
        for entry in topology {
            if !matches!(cursor.move_to_cell(entry.id), Ok(true)) {
                warn!(cell = %entry.id, "cannot place cursor into cell, not named");
                continue;
            }
            let background = cursor.current_background().unwrap_or_else(|error| {
                warn!(cell = %entry.id, %error, "read background failed");
                None
            });
            let text = cursor.current_text().unwrap_or_else(|error| {
                warn!(cell = %entry.id, %error, "read text failed");
                String::new()
            });
            let bookmark = cursor.bookmark_in_cell().unwrap_or_else(|error| {
                warn!(cell = %entry.id, %error, "read bookmark failed");
                None
            });
            cells.push(NamingCell { topology: entry, background, text, bookmark });
        }
        drop(cursor);
        Ok(FieldNamer::from_criteria(&self.criteria).name(&cells))
    }

    /// Persists namer output, one cell at a time.
    pub fn apply_field_names(&mut self, fields: &[FieldInfo]) -> Result<BatchReport, RustyFieldError> {
        let index = self.index()?;
        let mut names = Vec::with_capacity(fields.len());
        let mut report = BatchReport::default();
        for field in fields {
            match index.get(field.cell_id) {
                Some(entry) => names.push((*entry, field.field_name.to_owned())),
                None => {
                    let coordinate = GridCoordinate::new(field.row, field.col);
                    let error = TableError::CellNotFound { row: field.row, col: field.col };
                    warn!(%coordinate, %error, "field skipped");
                    report.record(coordinate, CellOutcome::Skipped { reason: error.to_string() });
                }
            }
        }
        let applied = self.apply_names(names)?;
        report.applied.extend(applied.applied);
        report.skipped.extend(applied.skipped);
        Ok(report)
    }

    /// Infers and persists field names in one call.
    pub fn auto_name_fields(&mut self) -> Result<(Vec<FieldInfo>, BatchReport), RustyFieldError> {
        let fields = self.name_fields()?;
        let report = self.apply_field_names(&fields)?;
        Ok((fields, report))
    }

    /// Field names bound to indexed cells, filtered by the criteria patterns.
    pub fn list_fields(&mut self) -> Result<Vec<(GridCoordinate, String)>, RustyFieldError> {
        let topology = self.index()?.topology.clone();
        let mut cursor = CursorGuard::new(&mut self.cursor)?;
        let mut fields = Vec::new();
        for entry in topology {
            if !matches!(cursor.move_to_cell(entry.id), Ok(true)) {
                warn!(cell = %entry.id, "cannot place cursor into cell, not listed");
                continue;
            }
            match cursor.get_field_name() {
                Ok(Some(name)) if self.criteria.accept(&name) => fields.push((entry.coordinate(), name)),
                Ok(_) => (),
                Err(error) => warn!(cell = %entry.id, %error, "read field name failed"),
            }
        }
        Ok(fields)
    }

    /// Field names that decode as [`JsonFieldName`]; plain names are left out.
    pub fn list_json_fields(&mut self) -> Result<Vec<(GridCoordinate, JsonFieldName)>, RustyFieldError> {
        Ok(self
            .list_fields()?
            .into_iter()
            .filter_map(|(coordinate, name)| JsonFieldName::decode(&name).ok().map(|json| (coordinate, json)))
            .collect())
    }

    /// Reads every cell's text into a rectangular snapshot for export.
    pub fn extract_grid(&mut self) -> Result<GridSnapshot, RustyFieldError> {
        let topology = self.index()?.topology.clone();
        let mut texts = HashMap::new();
        {
            let mut cursor = CursorGuard::new(&mut self.cursor)?;
            for entry in &topology {
                if !matches!(cursor.move_to_cell(entry.id), Ok(true)) {
                    warn!(cell = %entry.id, "cannot place cursor into cell, text left empty");
                    continue;
                }
                match cursor.current_text() {
                    Ok(text) => {
                        texts.insert(entry.id, text);
                    }
                    Err(error) => warn!(cell = %entry.id, %error, "read text failed"),
                }
            }
        }
        Ok(GridSnapshot::build(self.index()?, &texts))
    }

    /// Binds each name to its cell; a failing cell is recorded and skipped.
    fn apply_names(&mut self, names: Vec<(CellTopology, String)>) -> Result<BatchReport, RustyFieldError> {
        let mut report = BatchReport::default();
        let mut cursor = CursorGuard::new(&mut self.cursor)?;
        for (entry, name) in names {
            let coordinate = entry.coordinate();
            let result: Result<(), RustyFieldError> = match cursor.move_to_cell(entry.id) {
                Ok(true) => match cursor.set_field_name(&name) {
                    Ok(true) => Ok(()),
                    Ok(false) => Err(FieldError::Rejected { row: entry.row, col: entry.col, name }.into()),
                    Err(error) => Err(error.into()),
                },
                Ok(false) => Err(TableError::CellUnreachable { row: entry.row, col: entry.col }.into()),
                Err(error) => Err(error.into()),
            };
            if let Err(error) = &result {
                warn!(%coordinate, %error, "field name not applied");
            }
            report.record(coordinate, CellOutcome::from(result));
        }
        info!(applied = report.succeeded(), skipped = report.failed(), "field names applied");
        Ok(report)
    }

    fn resolve_caption(&mut self, caption: Option<&str>) -> String {
        let caption = match caption {
            Some(caption) => Some(caption.to_owned()),
            None => self.cursor.table_caption().unwrap_or_else(|error| {
                warn!(%error, "read table caption failed");
                None
            }),
        };
        caption
            .as_deref()
            .and_then(sanitize_caption)
            .unwrap_or_else(|| self.criteria.caption_fallback.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use crate::field::*;

    #[test]
    fn band_partition() {
        assert_eq!(Band::of(0, 3, 1, 1), Band::Head);
        assert_eq!(Band::of(1, 3, 1, 1), Band::Body);
        assert_eq!(Band::of(2, 3, 1, 1), Band::Foot);
        assert_eq!(Band::of(2, 3, 0, 0), Band::Body);
        assert_eq!(Band::of(0, 1, 1, 1), Band::Head);
        assert_eq!(Band::of(0, 2, 0, 5), Band::Foot);
    }
}
