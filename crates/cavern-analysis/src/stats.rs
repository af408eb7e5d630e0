//! Aggregate grid statistics in a single pass.

use std::collections::BTreeMap;

use cavern_core::{BuildingKind, LevelGrid, TileCategory, TileId};
use serde::Serialize;

/// Counts and totals over every cell of a grid.
///
/// `total_tiles` is always `width * height`. Histograms use ordered maps
/// so the serialized form is stable.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    /// Grid width.
    pub width: u32,
    /// Grid height.
    pub height: u32,
    /// `width * height`.
    pub total_tiles: usize,
    /// Cells per raw tile id.
    pub tile_histogram: BTreeMap<TileId, usize>,
    /// Cells per known category.
    pub category_histogram: BTreeMap<TileCategory, usize>,
    /// Cells with no tile.
    pub unassigned_tiles: usize,
    /// Cells whose tile id is outside the catalogue.
    pub illegal_tiles: usize,
    /// Cells carrying a reinforced wall.
    pub reinforced_tiles: usize,
    /// Pathable cells.
    pub pathable_tiles: usize,
    /// `pathable_tiles / total_tiles`, or 0 for an empty grid.
    pub pathable_ratio: f64,
    /// Cells per elevation value.
    pub elevation_histogram: BTreeMap<u32, usize>,
    /// Lowest elevation.
    pub min_elevation: Option<u32>,
    /// Highest elevation.
    pub max_elevation: Option<u32>,
    /// Mean elevation.
    pub mean_elevation: f64,
    /// Loose crystals on the grid.
    pub crystals: u64,
    /// Loose ore on the grid.
    pub ore: u64,
    /// Crystal seam walls.
    pub crystal_seams: usize,
    /// Ore seam walls.
    pub ore_seams: usize,
    /// Recharge seam walls.
    pub recharge_seams: usize,
    /// Placed buildings per kind.
    pub buildings: BTreeMap<BuildingKind, usize>,
}

/// Compute [`Statistics`] for `grid`.
///
/// Cells a malformed grid is missing are simply not counted; only
/// `total_tiles` reflects the declared size.
pub fn compute_statistics(grid: &LevelGrid) -> Statistics {
    let mut stats = Statistics {
        width: grid.width(),
        height: grid.height(),
        total_tiles: grid.cell_count(),
        ..Statistics::default()
    };
    let mut elevation_sum = 0u64;
    let mut visited = 0usize;

    for (_, cell) in grid.iter() {
        visited += 1;
        match cell.tile_id {
            None => stats.unassigned_tiles += 1,
            Some(tile) => {
                *stats.tile_histogram.entry(tile).or_default() += 1;
                match tile.classify() {
                    None => stats.illegal_tiles += 1,
                    Some(kind) => {
                        *stats.category_histogram.entry(kind.category).or_default() += 1;
                        if kind.reinforced {
                            stats.reinforced_tiles += 1;
                        }
                        match kind.category {
                            TileCategory::CrystalSeam => stats.crystal_seams += 1,
                            TileCategory::OreSeam => stats.ore_seams += 1,
                            TileCategory::RechargeSeam => stats.recharge_seams += 1,
                            _ => {}
                        }
                    }
                }
            }
        }
        if cell.is_pathable() {
            stats.pathable_tiles += 1;
        }

        *stats.elevation_histogram.entry(cell.elevation).or_default() += 1;
        elevation_sum += u64::from(cell.elevation);
        let e = cell.elevation;
        stats.min_elevation = Some(stats.min_elevation.map_or(e, |m| m.min(e)));
        stats.max_elevation = Some(stats.max_elevation.map_or(e, |m| m.max(e)));

        stats.crystals += u64::from(cell.crystals);
        stats.ore += u64::from(cell.ore);
        if let Some(kind) = cell.building_id {
            *stats.buildings.entry(kind).or_default() += 1;
        }
    }

    if visited > 0 {
        stats.mean_elevation = elevation_sum as f64 / visited as f64;
    }
    if stats.total_tiles > 0 {
        stats.pathable_ratio = stats.pathable_tiles as f64 / stats.total_tiles as f64;
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use cavern_core::Cell;
    use cavern_test_utils::{grid_from_ascii, GridBuilder};

    #[test]
    fn counts_every_category() {
        let grid = grid_from_ascii(&["T.#c", "dRo?", "~*, "]);
        let s = compute_statistics(&grid);
        assert_eq!(s.total_tiles, 12);
        assert_eq!(s.unassigned_tiles, 1);
        assert_eq!(s.illegal_tiles, 1);
        assert_eq!(s.reinforced_tiles, 1);
        assert_eq!(s.crystal_seams, 1);
        assert_eq!(s.ore_seams, 1);
        assert_eq!(s.category_histogram[&TileCategory::Ground], 2);
        assert_eq!(s.category_histogram[&TileCategory::Dirt], 2);
        assert_eq!(s.tile_histogram[&TileId::GROUND], 2);
        assert_eq!(s.pathable_tiles, 3);
        assert_eq!(s.buildings[&BuildingKind::ToolStore], 1);
    }

    #[test]
    fn totals_and_elevation() {
        let grid = GridBuilder::new(4, 4)
            .crystals(0, 0, 5)
            .crystals(1, 1, 7)
            .ore(2, 2, 3)
            .elevation(3, 3, 16)
            .build();
        let s = compute_statistics(&grid);
        assert_eq!(s.crystals, 12);
        assert_eq!(s.ore, 3);
        assert_eq!(s.min_elevation, Some(0));
        assert_eq!(s.max_elevation, Some(16));
        assert!((s.mean_elevation - 1.0).abs() < 1e-12);
        assert_eq!(s.elevation_histogram[&0], 15);
        assert!((s.pathable_ratio - 1.0).abs() < 1e-12);
    }

    #[test]
    fn malformed_grid_still_reports_declared_total() {
        let grid = LevelGrid::from_raw(3, 3, vec![Cell::new(TileId::GROUND); 4]);
        let s = compute_statistics(&grid);
        assert_eq!(s.total_tiles, 9);
        assert_eq!(s.pathable_tiles, 4);
    }

    #[test]
    fn serializes_with_stable_keys() {
        let s = compute_statistics(&grid_from_ascii(&["T#"]));
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["totalTiles"], 2);
        assert_eq!(json["categoryHistogram"]["solidRock"], 1);
        assert_eq!(json["buildings"]["toolStore"], 1);
        assert_eq!(json["tileHistogram"]["38"], 1);
    }
}
