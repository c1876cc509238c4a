use crate::cursor::{CellId, PhysicalBox};
use crate::table::levels::{cluster, nearest_level};
use crate::table::traversal::DiscoveredCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;
use tracing::{debug, warn};

/// Logical 0-based (row, col) position in a reconstructed grid.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCoordinate {
    pub row: usize,
    pub col: usize,
}

impl GridCoordinate {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl Display for GridCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Full shape of one discovered cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CellTopology {
    pub id: CellId,
    /// Top-left (representative) coordinate
    pub row: usize,
    pub col: usize,
    pub rowspan: usize,
    pub colspan: usize,
    pub bbox: PhysicalBox,
}

impl CellTopology {
    pub const fn coordinate(&self) -> GridCoordinate {
        GridCoordinate::new(self.row, self.col)
    }

    /// Last row covered by the cell (inclusive).
    pub const fn end_row(&self) -> usize {
        self.row + self.rowspan - 1
    }

    /// Last column covered by the cell (inclusive).
    pub const fn end_col(&self) -> usize {
        self.col + self.colspan - 1
    }

    pub const fn overlaps_rows(&self, other: &CellTopology) -> bool {
        self.row <= other.end_row() && other.row <= self.end_row()
    }

    pub const fn overlaps_cols(&self, other: &CellTopology) -> bool {
        self.col <= other.end_col() && other.col <= self.end_col()
    }

    /// Every coordinate occupied by the cell, row-major.
    pub fn coordinates(&self) -> impl Iterator<Item = GridCoordinate> + '_ {
        (self.row..self.row + self.rowspan)
            .flat_map(move |row| (self.col..self.col + self.colspan).map(move |col| GridCoordinate::new(row, col)))
    }
}

/// Boundary levels and logical coordinates derived from discovered boxes.
///
/// Built once per traversal and never mutated; a structural change of the table
/// requires a new traversal and a new index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoordinateIndex {
    pub x_levels: Vec<i64>,
    pub y_levels: Vec<i64>,
    /// Indexed cells ordered by representative coordinate
    pub topology: Vec<CellTopology>,
    /// Every occupied coordinate to the cell covering it
    pub coord_map: BTreeMap<GridCoordinate, CellId>,
    /// Every indexed cell to its representative coordinate
    pub rep_coords: BTreeMap<CellId, GridCoordinate>,
    /// Cells excluded from the index because their box spans no interval
    pub rejected: Vec<CellId>,
    indexes: HashMap<CellId, usize>,
}

impl CoordinateIndex {
    /// Clusters cell edges into levels and places every cell on the grid.
    pub fn build(cells: &[DiscoveredCell], tolerance: u32) -> Self {
        let usable: Vec<&DiscoveredCell> = cells.iter().filter(|cell| cell.bbox_read).collect();
        let xs: Vec<i64> = usable
            .iter()
            .flat_map(|cell| [cell.bbox.left(), cell.bbox.right()])
            .collect();
        let ys: Vec<i64> = usable
            .iter()
            .flat_map(|cell| [cell.bbox.top(), cell.bbox.bottom()])
            .collect();
        let x_levels = cluster(&xs, tolerance);
        let y_levels = cluster(&ys, tolerance);

        let mut rejected = Vec::new();
        let mut topology = Vec::new();
        for cell in cells {
            match place(cell, &x_levels, &y_levels) {
                Some(entry) => topology.push(entry),
                None => {
                    warn!(cell = %cell.id, bbox = ?cell.bbox, "malformed cell topology, excluded from index");
                    rejected.push(cell.id);
                }
            }
        }
        topology.sort_by_key(|entry| (entry.row, entry.col));

        let mut coord_map = BTreeMap::<GridCoordinate, CellId>::new();
        let mut rep_coords = BTreeMap::<CellId, GridCoordinate>::new();
        let mut indexes = HashMap::<CellId, usize>::new();
        let mut kept = Vec::with_capacity(topology.len());
        for entry in topology {
            if let Some(existing) = entry.coordinates().find_map(|coord| coord_map.get(&coord)) {
                warn!(cell = %entry.id, other = %existing, "cell overlaps an indexed cell, excluded from index");
                rejected.push(entry.id);
                continue;
            }
            for coord in entry.coordinates() {
                coord_map.insert(coord, entry.id);
            }
            rep_coords.insert(entry.id, entry.coordinate());
            indexes.insert(entry.id, kept.len());
            kept.push(entry);
        }
        debug!(
            rows = y_levels.len().saturating_sub(1),
            cols = x_levels.len().saturating_sub(1),
            cells = kept.len(),
            rejected = rejected.len(),
            "coordinate index built"
        );
        Self { x_levels, y_levels, topology: kept, coord_map, rep_coords, rejected, indexes }
    }

    pub fn row_count(&self) -> usize {
        self.y_levels.len().saturating_sub(1)
    }

    pub fn col_count(&self) -> usize {
        self.x_levels.len().saturating_sub(1)
    }

    /// Cell covering the coordinate, merged cells included.
    pub fn cell_at(&self, row: usize, col: usize) -> Option<&CellTopology> {
        self.coord_map
            .get(&GridCoordinate::new(row, col))
            .and_then(|id| self.get(*id))
    }

    pub fn get(&self, id: CellId) -> Option<&CellTopology> {
        self.indexes.get(&id).map(|index| &self.topology[*index])
    }

    /// Coordinates of the grid rectangle not covered by any indexed cell.
    pub fn gaps(&self) -> Vec<GridCoordinate> {
        (0..self.row_count())
            .flat_map(|row| (0..self.col_count()).map(move |col| GridCoordinate::new(row, col)))
            .filter(|coord| !self.coord_map.contains_key(coord))
            .collect()
    }
}

/// Derives the top-left coordinate and spans of one cell, None when malformed.
fn place(cell: &DiscoveredCell, x_levels: &[i64], y_levels: &[i64]) -> Option<CellTopology> {
    if !cell.bbox_read {
        return None;
    }
    let left = nearest_level(x_levels, cell.bbox.left())?;
    let right = nearest_level(x_levels, cell.bbox.right())?;
    let top = nearest_level(y_levels, cell.bbox.top())?;
    let bottom = nearest_level(y_levels, cell.bbox.bottom())?;
    if right <= left || bottom <= top {
        return None;
    }
    Some(CellTopology {
        id: cell.id,
        row: top,
        col: left,
        rowspan: bottom - top,
        colspan: right - left,
        bbox: cell.bbox,
    })
}

#[cfg(test)]
mod tests {
    use crate::cursor::{CellId, PhysicalBox};
    use crate::table::index::*;
    use crate::table::traversal::DiscoveredCell;
    use proptest::prelude::*;

    fn cell(id: u64, x: i64, y: i64, width: i64, height: i64) -> DiscoveredCell {
        DiscoveredCell { id: CellId(id), bbox: PhysicalBox::new(x, y, width, height), bbox_read: true }
    }

    #[test]
    fn merged_cell_spans_rows() {
        let index = CoordinateIndex::build(&[
            cell(1, 0, 0, 150, 400),
            cell(2, 150, 0, 150, 200),
            cell(3, 150, 200, 150, 200),
        ], 10);
        assert_eq!(index.y_levels, vec![0, 200, 400]);
        assert_eq!(index.x_levels, vec![0, 150, 300]);
        let merged = index.get(CellId(1)).unwrap();
        assert_eq!((merged.rowspan, merged.colspan), (2, 1));
        assert_eq!(index.rep_coords[&CellId(1)], GridCoordinate::new(0, 0));
        assert_eq!(index.coord_map[&GridCoordinate::new(0, 0)], CellId(1));
        assert_eq!(index.coord_map[&GridCoordinate::new(1, 0)], CellId(1));
        assert_eq!(index.cell_at(1, 1).unwrap().id, CellId(3));
        assert!(index.gaps().is_empty());
    }

    #[test]
    fn noisy_edges_collapse() {
        let index = CoordinateIndex::build(&[
            cell(1, 0, 0, 101, 50),
            cell(2, 99, 2, 100, 49),
            cell(3, 1, 52, 98, 50),
            cell(4, 102, 50, 97, 51),
        ], 5);
        assert_eq!(index.row_count(), 2);
        assert_eq!(index.col_count(), 2);
        assert_eq!(index.rep_coords[&CellId(4)], GridCoordinate::new(1, 1));
    }

    #[test]
    fn malformed_boxes_are_rejected() {
        let index = CoordinateIndex::build(&[
            cell(1, 0, 0, 100, 100),
            cell(2, 100, 0, 3, 100),
            DiscoveredCell { id: CellId(3), bbox: PhysicalBox::default(), bbox_read: false },
        ], 10);
        assert_eq!(index.rejected, vec![CellId(2), CellId(3)]);
        assert!(index.get(CellId(2)).is_none());
        assert_eq!(index.topology.len(), 1);
    }

    #[test]
    fn overlapping_cell_is_rejected() {
        let index = CoordinateIndex::build(&[
            cell(1, 0, 0, 200, 100),
            cell(2, 100, 0, 100, 100),
            cell(3, 0, 100, 100, 100),
            cell(4, 100, 100, 100, 100),
        ], 10);
        assert_eq!(index.rejected, vec![CellId(2)]);
        assert_eq!(index.coord_map[&GridCoordinate::new(0, 1)], CellId(1));
    }

    #[test]
    fn overlap_predicates() {
        let a = CellTopology { id: CellId(1), row: 0, col: 0, rowspan: 2, colspan: 1, bbox: PhysicalBox::default() };
        let b = CellTopology { id: CellId(2), row: 1, col: 1, rowspan: 1, colspan: 1, bbox: PhysicalBox::default() };
        let c = CellTopology { id: CellId(3), row: 2, col: 0, rowspan: 1, colspan: 2, bbox: PhysicalBox::default() };
        assert!(a.overlaps_rows(&b));
        assert!(!a.overlaps_rows(&c));
        assert!(b.overlaps_cols(&c));
        assert!(!a.overlaps_cols(&b));
    }

    /// Partitions a `rows x cols` grid into rectangles driven by `choices`.
    fn partition(rows: usize, cols: usize, choices: &[u8]) -> Vec<(usize, usize, usize, usize)> {
        let mut taken = vec![vec![false; cols]; rows];
        let mut pieces = Vec::new();
        let mut choice = choices.iter().cycle();
        for row in 0..rows {
            for col in 0..cols {
                if taken[row][col] {
                    continue;
                }
                let mut width = 1;
                while col + width < cols && !taken[row][col + width] {
                    width += 1;
                }
                let mut height = 1;
                while row + height < rows && (col..col + width).all(|c| !taken[row + height][c]) {
                    height += 1;
                }
                let pick = *choice.next().unwrap_or(&0) as usize;
                let colspan = 1 + pick % width;
                let rowspan = 1 + (pick / 7) % height;
                for r in row..row + rowspan {
                    for c in col..col + colspan {
                        taken[r][c] = true;
                    }
                }
                pieces.push((row, col, rowspan, colspan));
            }
        }
        pieces
    }

    proptest! {
        #[test]
        fn reconstructed_grid_tiles_rectangle(
            heights in proptest::collection::vec(40i64..300, 1..6),
            widths in proptest::collection::vec(40i64..300, 1..6),
            choices in proptest::collection::vec(any::<u8>(), 1..32),
            noise in proptest::collection::vec(-3i64..=3, 4),
        ) {
            let ys: Vec<i64> = std::iter::once(0).chain(heights.iter().scan(0, |y, h| { *y += h; Some(*y) })).collect();
            let xs: Vec<i64> = std::iter::once(0).chain(widths.iter().scan(0, |x, w| { *x += w; Some(*x) })).collect();
            let pieces = partition(heights.len(), widths.len(), &choices);
            let cells: Vec<DiscoveredCell> = pieces
                .iter()
                .enumerate()
                .map(|(index, (row, col, rowspan, colspan))| {
                    let jitter = noise[index % noise.len()];
                    let x = xs[*col] + jitter;
                    let y = ys[*row] - jitter;
                    cell(index as u64, x, y, xs[col + colspan] - x, ys[row + rowspan] - y)
                })
                .collect();

            let index = CoordinateIndex::build(&cells, 10);
            prop_assert_eq!(index.row_count(), heights.len());
            prop_assert_eq!(index.col_count(), widths.len());
            prop_assert!(index.rejected.is_empty());
            prop_assert!(index.gaps().is_empty());
            prop_assert_eq!(index.coord_map.len(), heights.len() * widths.len());
            for (id, (row, col, rowspan, colspan)) in pieces.iter().enumerate() {
                let entry = index.get(CellId(id as u64)).unwrap();
                prop_assert_eq!((entry.row, entry.col, entry.rowspan, entry.colspan), (*row, *col, *rowspan, *colspan));
            }
            prop_assert_eq!(CoordinateIndex::build(&cells, 10), index);
        }
    }
}
