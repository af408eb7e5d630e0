//! Test utilities for Cavern development.
//!
//! Provides [`grid_from_ascii`] and [`GridBuilder`] for writing readable
//! grid fixtures, plus proptest strategies in [`strategies`].
//!
//! ASCII legend used by [`grid_from_ascii`]:
//!
//! | Char | Cell |
//! |------|------|
//! | `.`  | ground |
//! | `,`  | rubble |
//! | `=`  | power path |
//! | `#`  | solid rock |
//! | `R`  | reinforced dirt |
//! | `d`  | dirt |
//! | `l`  | loose rock |
//! | `h`  | hard rock |
//! | `c`  | crystal seam |
//! | `o`  | ore seam |
//! | `~`  | water |
//! | `*`  | lava |
//! | `T`  | ground with a tool store |
//! | `C`  | ground with 1 crystal |
//! | `O`  | ground with 1 ore |
//! | `?`  | illegal tile id 13 |
//! | ` `  | unassigned |

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod strategies;

use cavern_core::{BuildingKind, Cell, Coord, LevelGrid, TileId};

/// Parse a fixture grid. Every row must have the same length.
///
/// # Panics
///
/// On ragged rows or characters outside the legend.
pub fn grid_from_ascii(rows: &[&str]) -> LevelGrid {
    let height = rows.len() as u32;
    let width = rows.first().map_or(0, |r| r.chars().count()) as u32;
    let mut cells = Vec::with_capacity((width * height) as usize);
    for (y, row) in rows.iter().enumerate() {
        assert_eq!(
            row.chars().count() as u32,
            width,
            "row {y} has a different length"
        );
        cells.extend(row.chars().map(cell_for));
    }
    LevelGrid::new(width, height, cells).expect("fixture dimensions are consistent")
}

fn cell_for(ch: char) -> Cell {
    match ch {
        '.' => Cell::new(TileId::GROUND),
        ',' => Cell::new(TileId::RUBBLE),
        '=' => Cell::new(TileId::POWER_PATH),
        '#' => Cell::new(TileId::SOLID_ROCK),
        'R' => Cell::new(TileId(TileId::DIRT.0 + 50)),
        'd' => Cell::new(TileId::DIRT),
        'l' => Cell::new(TileId::LOOSE_ROCK),
        'h' => Cell::new(TileId::HARD_ROCK),
        'c' => Cell::new(TileId::CRYSTAL_SEAM),
        'o' => Cell::new(TileId::ORE_SEAM),
        '~' => Cell::new(TileId::WATER),
        '*' => Cell::new(TileId::LAVA),
        'T' => Cell::new(TileId::GROUND).with_building(BuildingKind::ToolStore),
        'C' => Cell::new(TileId::GROUND).with_crystals(1),
        'O' => Cell::new(TileId::GROUND).with_ore(1),
        '?' => Cell::new(TileId(13)),
        ' ' => Cell::unassigned(),
        other => panic!("unknown fixture char {other:?}"),
    }
}

/// Mutable scaffold for building a [`LevelGrid`] cell by cell.
///
/// Starts as all-ground; setters overwrite individual cells.
#[derive(Clone, Debug)]
pub struct GridBuilder {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
}

impl GridBuilder {
    /// An all-ground `width x height` grid.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Cell::new(TileId::GROUND))
    }

    /// A `width x height` grid filled with `cell`.
    pub fn filled(width: u32, height: u32, cell: Cell) -> Self {
        Self {
            width,
            height,
            cells: vec![cell; (width * height) as usize],
        }
    }

    fn cell_mut(&mut self, x: u32, y: u32) -> &mut Cell {
        assert!(x < self.width && y < self.height, "({x}, {y}) out of fixture");
        &mut self.cells[(y * self.width + x) as usize]
    }

    /// Replace the whole cell.
    pub fn cell(mut self, x: u32, y: u32, cell: Cell) -> Self {
        *self.cell_mut(x, y) = cell;
        self
    }

    /// Set the tile at `(x, y)`.
    pub fn tile(mut self, x: u32, y: u32, tile: TileId) -> Self {
        self.cell_mut(x, y).tile_id = Some(tile);
        self
    }

    /// Put solid rock at `(x, y)`.
    pub fn wall(self, x: u32, y: u32) -> Self {
        self.tile(x, y, TileId::SOLID_ROCK)
    }

    /// Surround `(x, y)` with solid rock on all 8 sides (clipped to the grid).
    pub fn walled_in(mut self, x: u32, y: u32) -> Self {
        let center = Coord::new(x, y);
        for dy in -1i32..=1 {
            for dx in -1i32..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                if let Some(c) = center.offset(dx, dy) {
                    if c.x < self.width && c.y < self.height {
                        self = self.wall(c.x, c.y);
                    }
                }
            }
        }
        self
    }

    /// Set loose crystals at `(x, y)`.
    pub fn crystals(mut self, x: u32, y: u32, n: u32) -> Self {
        self.cell_mut(x, y).crystals = n;
        self
    }

    /// Set loose ore at `(x, y)`.
    pub fn ore(mut self, x: u32, y: u32, n: u32) -> Self {
        self.cell_mut(x, y).ore = n;
        self
    }

    /// Set the elevation at `(x, y)`.
    pub fn elevation(mut self, x: u32, y: u32, e: u32) -> Self {
        self.cell_mut(x, y).elevation = e;
        self
    }

    /// Place a building at `(x, y)`.
    pub fn building(mut self, x: u32, y: u32, kind: BuildingKind) -> Self {
        self.cell_mut(x, y).building_id = Some(kind);
        self
    }

    /// Place a tool store (connectivity origin) at `(x, y)`.
    pub fn tool_store(self, x: u32, y: u32) -> Self {
        self.building(x, y, BuildingKind::ToolStore)
    }

    /// Finish the grid.
    pub fn build(self) -> LevelGrid {
        LevelGrid::from_raw(self.width, self.height, self.cells)
    }
}

/// 10x10 all-ground grid with a tool store at (0, 0).
pub fn open_level() -> LevelGrid {
    GridBuilder::new(10, 10).tool_store(0, 0).build()
}
