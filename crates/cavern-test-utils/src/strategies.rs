//! Proptest strategies for level grids.

use cavern_core::{BuildingKind, Cell, Coord, LevelGrid, TileId};
use proptest::prelude::*;

/// A cell drawn mostly from floor tiles, with some walls, liquids and
/// loose resources sprinkled in.
pub fn arb_cell() -> impl Strategy<Value = Cell> {
    let tile = prop_oneof![
        6 => Just(TileId::GROUND),
        1 => Just(TileId::RUBBLE),
        1 => Just(TileId::POWER_PATH),
        2 => Just(TileId::SOLID_ROCK),
        2 => Just(TileId::DIRT),
        1 => Just(TileId::HARD_ROCK),
        1 => Just(TileId::CRYSTAL_SEAM),
        1 => Just(TileId::WATER),
        1 => Just(TileId::LAVA),
    ];
    let deposit = || prop_oneof![4 => Just(0u32), 1 => 1u32..5];
    (tile, 0u32..6, deposit(), deposit())
        .prop_map(|(tile, elevation, crystals, ore)| {
            Cell::new(tile)
                .with_elevation(elevation)
                .with_crystals(crystals)
                .with_ore(ore)
        })
}

/// A well-formed grid between 1x1 and `max_side x max_side`.
pub fn arb_grid(max_side: u32) -> impl Strategy<Value = LevelGrid> {
    (1..=max_side, 1..=max_side).prop_flat_map(|(w, h)| {
        proptest::collection::vec(arb_cell(), (w * h) as usize)
            .prop_map(move |cells| LevelGrid::from_raw(w, h, cells))
    })
}

/// A well-formed grid plus one pathable origin cell carrying a tool store.
pub fn arb_grid_with_origin(max_side: u32) -> impl Strategy<Value = (LevelGrid, Coord)> {
    (arb_grid(max_side), any::<prop::sample::Index>()).prop_map(|(grid, pick)| {
        let origin = grid.coord_of(pick.index(grid.cell_count()));
        let mut cells = grid.cells().to_vec();
        let index = grid.index_of(origin).unwrap_or(0);
        cells[index] = Cell::new(TileId::GROUND).with_building(BuildingKind::ToolStore);
        (LevelGrid::from_raw(grid.width(), grid.height(), cells), origin)
    })
}

/// An in-bounds coordinate for a grid of the given size.
pub fn arb_coord_in(width: u32, height: u32) -> impl Strategy<Value = Coord> {
    (0..width, 0..height).prop_map(|(x, y)| Coord::new(x, y))
}
