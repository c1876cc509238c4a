//! # Field Naming Module
//!
//! Infers a field name for every data cell of a table. Header cells are recognized
//! by their background fill; a data cell takes its name from the nearest header to
//! its left (A) and the nearest header above it (B), unless a bookmark inside the
//! cell already names it.
use crate::criteria::Criteria;
use crate::cursor::{CellId, Rgb};
use crate::naming::text::{clean_text, random_name};
use crate::table::CellTopology;
use rand::Rng;
use serde::Serialize;
use std::cmp::Reverse;
use std::fmt::Display;
use tracing::debug;

pub mod text;

/// How a field name was obtained.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum FieldSource {
    #[serde(rename = "bookmark")]
    Bookmark,
    /// Left and top headers
    #[serde(rename = "A_B")]
    LeftTop,
    /// Left header only
    #[serde(rename = "A")]
    Left,
    /// Top header only
    #[serde(rename = "B")]
    Top,
    #[serde(rename = "random")]
    Random,
}

impl FieldSource {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bookmark => "bookmark",
            Self::LeftTop => "A_B",
            Self::Left => "A",
            Self::Top => "B",
            Self::Random => "random",
        }
    }
}

impl Display for FieldSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cell together with the properties the naming heuristic looks at.
#[derive(Clone, Debug)]
pub struct NamingCell {
    pub topology: CellTopology,
    pub background: Option<Rgb>,
    pub text: String,
    pub bookmark: Option<String>,
}

impl NamingCell {
    /// Marked cells carry a background fill and act as headers.
    pub fn is_marked(&self) -> bool {
        self.background.is_some()
    }
}

/// A name bound to a cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldInfo {
    pub cell_id: CellId,
    pub row: usize,
    pub col: usize,
    pub field_name: String,
    pub source: FieldSource,
    /// Raw text of the named cell
    pub text: String,
}

/// Header-adjacency naming heuristic.
#[derive(Copy, Clone, Debug)]
pub struct FieldNamer {
    tolerance: u32,
    name_length: usize,
}

impl FieldNamer {
    pub fn new(tolerance: u32, name_length: usize) -> Self {
        Self { tolerance, name_length }
    }

    pub fn from_criteria(criteria: &Criteria) -> Self {
        Self::new(criteria.tolerance, criteria.random_name_length)
    }

    /// Names every unmarked cell; marked cells are skipped.
    pub fn name(&self, cells: &[NamingCell]) -> Vec<FieldInfo> {
        self.name_with_rng(cells, &mut rand::rng())
    }

    /// Same as [`FieldNamer::name`] with a caller-supplied random source.
    pub fn name_with_rng<R: Rng>(&self, cells: &[NamingCell], rng: &mut R) -> Vec<FieldInfo> {
        let fields: Vec<FieldInfo> = cells
            .iter()
            .filter(|cell| !cell.is_marked())
            .map(|cell| self.name_cell(cell, cells, rng))
            .collect();
        debug!(cells = cells.len(), fields = fields.len(), "field names inferred");
        fields
    }

    fn name_cell<R: Rng>(&self, cell: &NamingCell, cells: &[NamingCell], rng: &mut R) -> FieldInfo {
        let (field_name, source) = if let Some(bookmark) = &cell.bookmark {
            (bookmark.to_owned(), FieldSource::Bookmark)
        } else {
            let left = self.left_header(cell, cells).map(|header| clean_text(&header.text));
            let top = self.top_header(cell, cells).map(|header| clean_text(&header.text));
            match (left, top) {
                (Some(a), Some(b)) => (format!("{a}_{b}"), FieldSource::LeftTop),
                (Some(a), None) => (format!("{a}_"), FieldSource::Left),
                (None, Some(b)) => (format!("_{b}"), FieldSource::Top),
                (None, None) => (random_name(rng, self.name_length), FieldSource::Random),
            }
        };
        FieldInfo {
            cell_id: cell.topology.id,
            row: cell.topology.row,
            col: cell.topology.col,
            field_name,
            source,
            text: cell.text.to_owned(),
        }
    }

    /// Nearest marked cell to the left whose height matches.
    ///
    /// Marked cells of a different height are passed over and the search goes on.
    pub fn left_header<'c>(&self, cell: &NamingCell, cells: &'c [NamingCell]) -> Option<&'c NamingCell> {
        let target = &cell.topology;
        let mut candidates: Vec<&NamingCell> = cells
            .iter()
            .filter(|other| other.topology.col < target.col && other.topology.overlaps_rows(target))
            .collect();
        candidates.sort_by_key(|other| (Reverse(other.topology.col), other.topology.row));
        candidates.into_iter().find(|other| {
            other.is_marked() && self.matches(other.topology.bbox.height, target.bbox.height)
        })
    }

    /// Nearest marked cell above whose width matches.
    ///
    /// Marked cells of a different width are passed over and the search goes on.
    pub fn top_header<'c>(&self, cell: &NamingCell, cells: &'c [NamingCell]) -> Option<&'c NamingCell> {
        let target = &cell.topology;
        let mut candidates: Vec<&NamingCell> = cells
            .iter()
            .filter(|other| other.topology.row < target.row && other.topology.overlaps_cols(target))
            .collect();
        candidates.sort_by_key(|other| (Reverse(other.topology.row), other.topology.col));
        candidates.into_iter().find(|other| {
            other.is_marked() && self.matches(other.topology.bbox.width, target.bbox.width)
        })
    }

    fn matches(&self, a: i64, b: i64) -> bool {
        a.abs_diff(b) <= u64::from(self.tolerance)
    }
}
