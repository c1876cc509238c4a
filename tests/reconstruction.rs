use proptest::prelude::*;
use rusty_field::cursor::memory::{MemoryCell, MemoryDocument};
use rusty_field::*;

fn boxes(document: &MemoryDocument) -> Vec<(u64, PhysicalBox)> {
    document.cells().iter().map(|cell| (cell.id.0, cell.bbox)).collect()
}

/// ```text
/// +-----------+-----+
/// | A         | B   |
/// +-----+-----+-----+
/// | C   | D   | E   |
/// |     +-----+     |
/// |     | F   |     |
/// +-----+-----+-----+
/// | G               |
/// +-----------------+
/// ```
fn mixed_layout() -> MemoryDocument {
    MemoryDocument::new(vec![
        MemoryCell::new(65, PhysicalBox::new(0, 0, 300, 100)),
        MemoryCell::new(66, PhysicalBox::new(300, 0, 150, 100)),
        MemoryCell::new(67, PhysicalBox::new(0, 100, 150, 200)),
        MemoryCell::new(68, PhysicalBox::new(150, 100, 150, 100)),
        MemoryCell::new(69, PhysicalBox::new(300, 100, 150, 200)),
        MemoryCell::new(70, PhysicalBox::new(150, 200, 150, 100)),
        MemoryCell::new(71, PhysicalBox::new(0, 300, 450, 100)),
    ])
}

fn assert_tiles(table: &TableField<MemoryDocument>) {
    let index = table.index().unwrap();
    let rows = index.row_count();
    let cols = index.col_count();
    assert!(index.gaps().is_empty());
    assert_eq!(index.coord_map.len(), rows * cols);
    let covered: usize = index.topology.iter().map(|cell| cell.rowspan * cell.colspan).sum();
    assert_eq!(covered, rows * cols);
}

#[test]
fn mixed_layout_spans() {
    let mut document = mixed_layout();
    document.place_cursor(CellId(70)).unwrap();
    let mut table = TableField::new(document, Criteria { tolerance: 10, ..Criteria::default() });
    assert_eq!(table.enter_table().unwrap(), 7);
    assert_eq!((table.row_count().unwrap(), table.col_count().unwrap()), (4, 3));
    assert_tiles(&table);

    let spans: Vec<(u64, usize, usize, usize, usize)> = table
        .cells()
        .unwrap()
        .iter()
        .map(|cell| (cell.id.0, cell.row, cell.col, cell.rowspan, cell.colspan))
        .collect();
    assert_eq!(
        spans,
        vec![
            (65, 0, 0, 1, 2),
            (66, 0, 2, 1, 1),
            (67, 1, 0, 2, 1),
            (68, 1, 1, 1, 1),
            (69, 1, 2, 2, 1),
            (70, 2, 1, 1, 1),
            (71, 3, 0, 1, 3),
        ]
    );
    assert_eq!(table.cell_at(2, 2).unwrap().id, CellId(69));
    assert_eq!(table.cell_at(3, 1).unwrap().id, CellId(71));
}

#[test]
fn mixed_layout_header_search() {
    let mut document = mixed_layout();
    let blue = Rgb(200, 220, 255);
    for (id, text) in [(65, "Quarter"), (67, "Region")] {
        let cell = document.cell_mut(CellId(id)).unwrap();
        cell.background = Some(blue);
        cell.text = text.to_owned();
    }
    let mut table = TableField::new(document, Criteria { tolerance: 10, ..Criteria::default() });
    table.enter_table().unwrap();
    let fields = table.name_fields().unwrap();
    let name_of = |id: u64| {
        fields
            .iter()
            .find(|field| field.cell_id == CellId(id))
            .map(|field| field.field_name.to_owned())
            .unwrap()
    };
    // 68 is half as tall as Region and a third as wide as Quarter: neither matches.
    assert_eq!(fields.iter().find(|field| field.cell_id == CellId(68)).unwrap().source, FieldSource::Random);
    // 69 matches Region's height; the unmarked 68 and 70 in between are skipped.
    assert_eq!(name_of(69), "Region_");
    assert_eq!(fields.iter().find(|field| field.cell_id == CellId(71)).unwrap().source, FieldSource::Random);
}

#[test]
fn drifting_left_edges_stay_one_column() {
    let document = MemoryDocument::new(vec![
        MemoryCell::new(1, PhysicalBox::new(0, 0, 150, 100)),
        MemoryCell::new(2, PhysicalBox::new(8, 100, 150, 100)),
        MemoryCell::new(3, PhysicalBox::new(16, 200, 150, 100)),
    ]);
    let mut table = TableField::new(document, Criteria { tolerance: 10, ..Criteria::default() });
    assert_eq!(table.enter_table().unwrap(), 3);
    let index = table.index().unwrap();
    assert_eq!(index.x_levels, vec![0, 150]);
    assert_eq!((index.row_count(), index.col_count()), (3, 1));
    for (row, id) in [(0, 1), (1, 2), (2, 3)] {
        let cell = index.cell_at(row, 0).unwrap();
        assert_eq!((cell.id, cell.rowspan, cell.colspan), (CellId(id), 1, 1));
    }
    assert_tiles(&table);
}

proptest! {
    #[test]
    fn jittered_grid_reconstructs(
        heights in proptest::collection::vec(60i64..400, 1..5),
        widths in proptest::collection::vec(60i64..400, 1..5),
        jitter in proptest::collection::vec(-4i64..=4, 1..16),
        start in 0usize..16,
    ) {
        let mut cells = Vec::new();
        let mut y = 0;
        for (row, height) in heights.iter().enumerate() {
            let mut x = 0;
            for (col, width) in widths.iter().enumerate() {
                let id = row * widths.len() + col;
                let noise = jitter[id % jitter.len()];
                cells.push(MemoryCell::new(id as u64, PhysicalBox::new(x + noise, y - noise, width - noise, height + noise)));
                x += width;
            }
            y += height;
        }
        let total = cells.len();
        let mut document = MemoryDocument::new(cells);
        document.place_cursor(CellId((start % total) as u64)).unwrap();
        let snapshot = boxes(&document);

        let mut table = TableField::new(document, Criteria { tolerance: 10, ..Criteria::default() });
        prop_assert_eq!(table.enter_table().unwrap(), total);
        prop_assert_eq!(table.row_count().unwrap(), heights.len());
        prop_assert_eq!(table.col_count().unwrap(), widths.len());
        assert_tiles(&table);
        for (id, _) in snapshot {
            let row = id as usize / widths.len();
            let col = id as usize % widths.len();
            prop_assert_eq!(table.cell_at(row, col).unwrap().id, CellId(id));
        }

        let first = table.index().unwrap().clone();
        table.enter_table().unwrap();
        prop_assert_eq!(&table.index().unwrap().coord_map, &first.coord_map);
        prop_assert_eq!(&table.index().unwrap().rep_coords, &first.rep_coords);
    }
}
