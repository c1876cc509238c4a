use crate::cursor::{CellCursor, CellId, CursorGuard, Direction, PhysicalBox, TableId};
use crate::table::TableError;
use std::collections::{HashSet, VecDeque};
use tracing::{debug, warn};

/// A cell reached during traversal, with the box the host reported for it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DiscoveredCell {
    pub id: CellId,
    pub bbox: PhysicalBox,
    /// False when the box query failed and `bbox` holds the default value
    pub bbox_read: bool,
}

/// Outcome of probing one direction from a cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Step {
    /// The move reached another cell of the same table
    Neighbor(CellId),
    /// The move did not change the cell: no neighbor in that direction
    NavigationEdge,
    /// The move left the table control
    TableBoundaryEscape,
}

/// Breadth-first discovery of every cell of the table under the cursor.
pub struct GridReconstructor<'a, C: CellCursor> {
    cursor: &'a mut C,
}

impl<'a, C: CellCursor> GridReconstructor<'a, C> {
    pub fn new(cursor: &'a mut C) -> Self {
        Self { cursor }
    }

    /// Visits every reachable cell once and records its bounding box.
    ///
    /// The cursor is restored to its original position afterwards. Fails only when
    /// the cursor is not inside a table to begin with.
    pub fn discover(self) -> Result<Vec<DiscoveredCell>, TableError> {
        let mut cursor = CursorGuard::new(self.cursor)?;
        let table = cursor.enclosing_table_id()?.ok_or(TableError::NotInTable)?;
        let start = cursor.current_cell_id()?;

        let mut visited = HashSet::<CellId>::new();
        let mut queue = VecDeque::from([start]);
        let mut cells = Vec::<DiscoveredCell>::new();
        while let Some(id) = queue.pop_front() {
            if !visited.insert(id) {
                continue;
            }
            if !matches!(cursor.move_to_cell(id), Ok(true)) {
                warn!(cell = %id, "cannot place cursor into discovered cell");
                cells.push(DiscoveredCell { id, bbox: PhysicalBox::default(), bbox_read: false });
                continue;
            }
            let cell = match cursor.current_bounding_box() {
                Ok(bbox) => DiscoveredCell { id, bbox, bbox_read: true },
                Err(error) => {
                    warn!(cell = %id, %error, "read bounding box failed, using default");
                    DiscoveredCell { id, bbox: PhysicalBox::default(), bbox_read: false }
                }
            };
            cells.push(cell);

            for direction in Direction::NEIGHBORS {
                if let Step::Neighbor(next) = probe(&mut *cursor, id, table, direction) {
                    if !visited.contains(&next) {
                        queue.push_back(next);
                    }
                }
            }
        }
        debug!(cells = cells.len(), "table traversal finished");
        Ok(cells)
    }
}

/// Moves one step from `from` and classifies where the cursor ended up.
pub(crate) fn probe<C: CellCursor>(cursor: &mut C, from: CellId, table: TableId, direction: Direction) -> Step {
    if !matches!(cursor.move_to_cell(from), Ok(true)) {
        return Step::NavigationEdge;
    }
    match cursor.move_relative(direction) {
        Ok(true) => (),
        Ok(false) => return Step::NavigationEdge,
        Err(error) => {
            warn!(cell = %from, ?direction, %error, "relative move failed");
            return Step::NavigationEdge;
        }
    }
    match cursor.enclosing_table_id() {
        Ok(Some(current)) if current == table => (),
        _ => return Step::TableBoundaryEscape,
    }
    match cursor.current_cell_id() {
        Ok(next) if next != from => Step::Neighbor(next),
        Ok(_) => Step::NavigationEdge,
        Err(_) => Step::TableBoundaryEscape,
    }
}
