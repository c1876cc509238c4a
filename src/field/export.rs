use crate::cursor::CellId;
use crate::table::CoordinateIndex;
use serde::Serialize;
use std::collections::HashMap;

/// A merged region of the grid, for spreadsheet export.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MergeRange {
    pub row: usize,
    pub col: usize,
    pub rowspan: usize,
    pub colspan: usize,
}

/// Rectangular text matrix of a table.
///
/// Text sits at each cell's representative coordinate; the other coordinates
/// covered by a merged cell, and uncovered gaps, hold `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GridSnapshot {
    pub rows: Vec<Vec<Option<String>>>,
    pub merges: Vec<MergeRange>,
}

impl GridSnapshot {
    pub fn build(index: &CoordinateIndex, texts: &HashMap<CellId, String>) -> Self {
        let mut rows = vec![vec![None; index.col_count()]; index.row_count()];
        let mut merges = Vec::new();
        for entry in &index.topology {
            if let Some(text) = texts.get(&entry.id) {
                rows[entry.row][entry.col] = Some(text.to_owned());
            }
            if entry.rowspan > 1 || entry.colspan > 1 {
                merges.push(MergeRange {
                    row: entry.row,
                    col: entry.col,
                    rowspan: entry.rowspan,
                    colspan: entry.colspan,
                });
            }
        }
        Self { rows, merges }
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col)?.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use crate::cursor::{CellId, PhysicalBox};
    use crate::field::export::*;
    use crate::table::DiscoveredCell;

    #[test]
    fn snapshot_places_text_and_merges() {
        let cells = [
            DiscoveredCell { id: CellId(1), bbox: PhysicalBox::new(0, 0, 300, 100), bbox_read: true },
            DiscoveredCell { id: CellId(2), bbox: PhysicalBox::new(0, 100, 150, 100), bbox_read: true },
            DiscoveredCell { id: CellId(3), bbox: PhysicalBox::new(150, 100, 150, 100), bbox_read: true },
        ];
        let index = CoordinateIndex::build(&cells, 10);
        let texts = HashMap::from([
            (CellId(1), "Title".to_owned()),
            (CellId(2), "a".to_owned()),
        ]);
        let snapshot = GridSnapshot::build(&index, &texts);
        assert_eq!(snapshot.rows.len(), 2);
        assert_eq!(snapshot.get(0, 0), Some("Title"));
        assert_eq!(snapshot.get(0, 1), None);
        assert_eq!(snapshot.get(1, 0), Some("a"));
        assert_eq!(snapshot.get(1, 1), None);
        assert_eq!(snapshot.get(5, 5), None);
        assert_eq!(snapshot.merges, vec![MergeRange { row: 0, col: 0, rowspan: 1, colspan: 2 }]);
    }
}
