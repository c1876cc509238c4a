use crate::error::RustyFieldError;
use crate::table::GridCoordinate;
use serde::{Deserialize, Serialize};

/// Structured metadata carried in a field name.
///
/// The host only accepts plain strings as field names, so the metadata is bound
/// to the cell as its JSON encoding.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonFieldName {
    pub table: String,
    /// `[row, col]` of the representative coordinate
    pub coord: [usize; 2],
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub author: String,
}

impl JsonFieldName {
    pub fn new(table: &str, coordinate: GridCoordinate) -> Self {
        Self {
            table: table.to_owned(),
            coord: [coordinate.row, coordinate.col],
            ..Default::default()
        }
    }

    pub fn coordinate(&self) -> GridCoordinate {
        GridCoordinate::new(self.coord[0], self.coord[1])
    }

    pub fn encode(&self) -> Result<String, RustyFieldError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(name: &str) -> Result<Self, RustyFieldError> {
        Ok(serde_json::from_str(name)?)
    }
}
