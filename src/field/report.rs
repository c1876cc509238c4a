use crate::error::RustyFieldError;
use crate::table::GridCoordinate;
use std::fmt::Display;

/// Result of one cell's share of a batch operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CellOutcome {
    Applied,
    Skipped { reason: String },
}

impl<T> From<Result<T, RustyFieldError>> for CellOutcome {
    fn from(result: Result<T, RustyFieldError>) -> Self {
        match result {
            Ok(_) => CellOutcome::Applied,
            Err(error) => CellOutcome::Skipped { reason: error.to_string() },
        }
    }
}

/// Per-cell outcomes of a batch, in processing order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub applied: Vec<GridCoordinate>,
    pub skipped: Vec<(GridCoordinate, String)>,
}

impl BatchReport {
    pub fn record(&mut self, coordinate: GridCoordinate, outcome: CellOutcome) {
        match outcome {
            CellOutcome::Applied => self.applied.push(coordinate),
            CellOutcome::Skipped { reason } => self.skipped.push((coordinate, reason)),
        }
    }

    pub fn succeeded(&self) -> usize {
        self.applied.len()
    }

    pub fn failed(&self) -> usize {
        self.skipped.len()
    }

    /// True when no cell was skipped.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

impl Display for BatchReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} applied, {} skipped", self.succeeded(), self.failed())
    }
}
