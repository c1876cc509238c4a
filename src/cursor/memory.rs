//! In-memory host document.
//!
//! Holds one table as a flat list of cells with physical boxes and answers cursor
//! moves geometrically, the way the host resolves them on screen. Individual cell
//! properties can be made to fail so that recovery paths can be exercised.
use crate::cursor::{
    CellCursor, CellId, CursorError, CursorResult, Direction, PhysicalBox, Rgb, TableId,
};
use anyhow::anyhow;
use std::collections::{HashMap, HashSet};

/// What happens when the cursor is pushed past the outer border of the table.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum EdgeMode {
    /// The cursor stays in the border cell and the move reports no change
    #[default]
    Stay,
    /// The cursor leaves the table into the surrounding body text
    Escape,
}

/// Cursor location inside a [`MemoryDocument`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Location {
    Cell(CellId),
    Body,
}

/// One table cell held by a [`MemoryDocument`].
#[derive(Clone, Debug)]
pub struct MemoryCell {
    pub id: CellId,
    pub bbox: PhysicalBox,
    pub background: Option<Rgb>,
    pub text: String,
    pub bookmark: Option<String>,
    pub field: Option<String>,
}

impl MemoryCell {
    pub fn new(id: u64, bbox: PhysicalBox) -> Self {
        Self {
            id: CellId(id),
            bbox,
            background: None,
            text: String::new(),
            bookmark: None,
            field: None,
        }
    }

    pub fn filled(mut self, color: Rgb) -> Self {
        self.background = Some(color);
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_owned();
        self
    }

    pub fn with_bookmark(mut self, name: &str) -> Self {
        self.bookmark = Some(name.to_owned());
        self
    }

    fn center(&self) -> (i64, i64) {
        (self.bbox.x + self.bbox.width / 2, self.bbox.y + self.bbox.height / 2)
    }

    fn spans_x(&self, x: i64) -> bool {
        self.bbox.left() <= x && x < self.bbox.right()
    }

    fn spans_y(&self, y: i64) -> bool {
        self.bbox.top() <= y && y < self.bbox.bottom()
    }
}

/// Single-table document answering [`CellCursor`] calls from memory.
#[derive(Clone, Debug)]
pub struct MemoryDocument {
    table: TableId,
    caption: Option<String>,
    cells: Vec<MemoryCell>,
    indexes: HashMap<CellId, usize>,
    location: Location,
    edge_mode: EdgeMode,
    failing_boxes: HashSet<CellId>,
    failing_styles: HashSet<CellId>,
    failing_texts: HashSet<CellId>,
    failing_fields: HashSet<CellId>,
}

impl MemoryDocument {
    /// Creates a document whose cursor starts in the first cell.
    pub fn new(cells: Vec<MemoryCell>) -> Self {
        let indexes = cells
            .iter()
            .enumerate()
            .map(|(index, cell)| (cell.id, index))
            .collect();
        let location = cells
            .first()
            .map(|cell| Location::Cell(cell.id))
            .unwrap_or(Location::Body);
        Self {
            table: TableId(1),
            caption: None,
            cells,
            indexes,
            location,
            edge_mode: EdgeMode::Stay,
            failing_boxes: HashSet::new(),
            failing_styles: HashSet::new(),
            failing_texts: HashSet::new(),
            failing_fields: HashSet::new(),
        }
    }

    /// Creates a `rows x cols` table of equally sized, unmerged cells.
    /// Cell ids are assigned in row-major order starting at 0.
    pub fn uniform(rows: usize, cols: usize, width: i64, height: i64) -> Self {
        let mut cells = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                let bbox = PhysicalBox::new(col as i64 * width, row as i64 * height, width, height);
                cells.push(MemoryCell::new((row * cols + col) as u64, bbox));
            }
        }
        Self::new(cells)
    }

    /// Sets the caption reported by `table_caption`.
    pub fn with_caption(mut self, caption: &str) -> Self {
        self.caption = Some(caption.to_owned());
        self
    }

    pub fn with_edge_mode(mut self, edge_mode: EdgeMode) -> Self {
        self.edge_mode = edge_mode;
        self
    }

    pub fn cell(&self, id: CellId) -> Option<&MemoryCell> {
        self.indexes.get(&id).map(|index| &self.cells[*index])
    }

    pub fn cell_mut(&mut self, id: CellId) -> Option<&mut MemoryCell> {
        self.indexes.get(&id).map(|index| &mut self.cells[*index])
    }

    /// All cells in insertion order.
    pub fn cells(&self) -> &[MemoryCell] {
        &self.cells
    }

    /// Field name currently bound to the cell.
    pub fn field_name_of(&self, id: CellId) -> Option<&str> {
        self.cell(id).and_then(|cell| cell.field.as_deref())
    }

    pub fn location(&self) -> Location {
        self.location
    }

    /// Puts the cursor into the given cell.
    pub fn place_cursor(&mut self, id: CellId) -> CursorResult<()> {
        if self.indexes.contains_key(&id) {
            self.location = Location::Cell(id);
            Ok(())
        } else {
            Err(CursorError::HostError(anyhow!("unknown cell {id}")))
        }
    }

    /// Moves the cursor out of the table into body text.
    pub fn leave_table(&mut self) {
        self.location = Location::Body;
    }

    /// Makes bounding box reads in the cell fail.
    pub fn fail_box(&mut self, id: CellId) {
        self.failing_boxes.insert(id);
    }

    /// Makes background reads in the cell fail.
    pub fn fail_style(&mut self, id: CellId) {
        self.failing_styles.insert(id);
    }

    /// Makes text reads in the cell fail.
    pub fn fail_text(&mut self, id: CellId) {
        self.failing_texts.insert(id);
    }

    /// Makes every field operation in the cell fail.
    pub fn fail_fields(&mut self, id: CellId) {
        self.failing_fields.insert(id);
    }

    fn current(&self) -> CursorResult<&MemoryCell> {
        match self.location {
            Location::Cell(id) => self.cell(id).ok_or(CursorError::NotInCell),
            Location::Body => Err(CursorError::NotInCell),
        }
    }

    fn current_mut(&mut self) -> CursorResult<&mut MemoryCell> {
        match self.location {
            Location::Cell(id) => self.cell_mut(id).ok_or(CursorError::NotInCell),
            Location::Body => Err(CursorError::NotInCell),
        }
    }

    fn read_failure(id: CellId, property: &'static str) -> CursorError {
        CursorError::PropertyReadFailure {
            cell: id,
            property,
            message: "injected failure".to_owned(),
        }
    }

    fn check_fields(&self, id: CellId, operation: &'static str) -> CursorResult<()> {
        if self.failing_fields.contains(&id) {
            Err(CursorError::FieldOperationFailure {
                operation,
                message: format!("cell {id} rejected the request"),
            })
        } else {
            Ok(())
        }
    }

    /// Resolves the geometric neighbor of `from` in the given direction.
    fn neighbor(&self, from: &MemoryCell, direction: Direction) -> Option<CellId> {
        let (cx, cy) = from.center();
        let others = self.cells.iter().filter(|cell| cell.id != from.id);
        let found = match direction {
            Direction::Up => others
                .filter(|cell| cell.spans_x(cx) && cell.bbox.y < from.bbox.y)
                .max_by_key(|cell| cell.bbox.y),
            Direction::Down => others
                .filter(|cell| cell.spans_x(cx) && cell.bbox.y > from.bbox.y)
                .min_by_key(|cell| cell.bbox.y),
            Direction::Left => others
                .filter(|cell| cell.spans_y(cy) && cell.bbox.x < from.bbox.x)
                .max_by_key(|cell| cell.bbox.x),
            Direction::Right => others
                .filter(|cell| cell.spans_y(cy) && cell.bbox.x > from.bbox.x)
                .min_by_key(|cell| cell.bbox.x),
            Direction::StartOfRow => self
                .cells
                .iter()
                .filter(|cell| cell.spans_y(cy))
                .min_by_key(|cell| cell.bbox.x),
            Direction::EndOfRow => self
                .cells
                .iter()
                .filter(|cell| cell.spans_y(cy))
                .max_by_key(|cell| cell.bbox.x),
        };
        found.map(|cell| cell.id)
    }
}

impl CellCursor for MemoryDocument {
    type Position = Location;

    fn position(&mut self) -> CursorResult<Location> {
        Ok(self.location)
    }

    fn restore_position(&mut self, position: Location) -> CursorResult<()> {
        self.location = position;
        Ok(())
    }

    fn move_relative(&mut self, direction: Direction) -> CursorResult<bool> {
        let Location::Cell(id) = self.location else {
            return Ok(false);
        };
        let from = self.current()?;
        match self.neighbor(from, direction) {
            Some(next) if next != id => {
                self.location = Location::Cell(next);
                Ok(true)
            }
            Some(_) => Ok(false),
            None if matches!(direction, Direction::StartOfRow | Direction::EndOfRow) => Ok(false),
            None => match self.edge_mode {
                EdgeMode::Stay => Ok(false),
                EdgeMode::Escape => {
                    self.location = Location::Body;
                    Ok(true)
                }
            },
        }
    }

    fn move_to_cell(&mut self, cell: CellId) -> CursorResult<bool> {
        if self.indexes.contains_key(&cell) {
            self.location = Location::Cell(cell);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn current_cell_id(&mut self) -> CursorResult<CellId> {
        Ok(self.current()?.id)
    }

    fn current_bounding_box(&mut self) -> CursorResult<PhysicalBox> {
        let cell = self.current()?;
        if self.failing_boxes.contains(&cell.id) {
            Err(Self::read_failure(cell.id, "bounding_box"))
        } else {
            Ok(cell.bbox)
        }
    }

    fn current_background(&mut self) -> CursorResult<Option<Rgb>> {
        let cell = self.current()?;
        if self.failing_styles.contains(&cell.id) {
            Err(Self::read_failure(cell.id, "background"))
        } else {
            Ok(cell.background)
        }
    }

    fn current_text(&mut self) -> CursorResult<String> {
        let cell = self.current()?;
        if self.failing_texts.contains(&cell.id) {
            Err(Self::read_failure(cell.id, "text"))
        } else {
            Ok(cell.text.to_owned())
        }
    }

    fn enclosing_table_id(&mut self) -> CursorResult<Option<TableId>> {
        match self.location {
            Location::Cell(_) => Ok(Some(self.table)),
            Location::Body => Ok(None),
        }
    }

    fn bookmark_in_cell(&mut self) -> CursorResult<Option<String>> {
        Ok(self.current()?.bookmark.to_owned())
    }

    fn table_caption(&mut self) -> CursorResult<Option<String>> {
        Ok(self.caption.to_owned())
    }

    fn set_field_name(&mut self, name: &str) -> CursorResult<bool> {
        let id = self.current()?.id;
        self.check_fields(id, "set_field_name")?;
        self.current_mut()?.field = Some(name.to_owned());
        Ok(true)
    }

    fn get_field_name(&mut self) -> CursorResult<Option<String>> {
        let cell = self.current()?;
        self.check_fields(cell.id, "get_field_name")?;
        Ok(cell.field.to_owned())
    }

    fn get_field_text(&mut self, name: &str) -> CursorResult<String> {
        self.cells
            .iter()
            .find(|cell| cell.field.as_deref() == Some(name))
            .map(|cell| cell.text.to_owned())
            .ok_or_else(|| CursorError::FieldOperationFailure {
                operation: "get_field_text",
                message: format!("no field named '{name}'"),
            })
    }

    fn put_field_text(&mut self, name: &str, text: &str) -> CursorResult<()> {
        let mut found = false;
        for cell in self.cells.iter_mut() {
            if cell.field.as_deref() == Some(name) {
                if self.failing_fields.contains(&cell.id) {
                    return Err(CursorError::FieldOperationFailure {
                        operation: "put_field_text",
                        message: format!("cell {} rejected the request", cell.id),
                    });
                }
                cell.text = text.to_owned();
                found = true;
            }
        }
        if found {
            Ok(())
        } else {
            Err(CursorError::FieldOperationFailure {
                operation: "put_field_text",
                message: format!("no field named '{name}'"),
            })
        }
    }

    fn rename_field(&mut self, old_name: &str, new_name: &str) -> CursorResult<()> {
        let mut found = false;
        for cell in self.cells.iter_mut() {
            if cell.field.as_deref() == Some(old_name) {
                cell.field = Some(new_name.to_owned());
                found = true;
            }
        }
        if found {
            Ok(())
        } else {
            Err(CursorError::FieldOperationFailure {
                operation: "rename_field",
                message: format!("no field named '{old_name}'"),
            })
        }
    }

    fn delete_field(&mut self) -> CursorResult<bool> {
        let id = self.current()?.id;
        self.check_fields(id, "delete_field")?;
        Ok(self.current_mut()?.field.take().is_some())
    }
}
