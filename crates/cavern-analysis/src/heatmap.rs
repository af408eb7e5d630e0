//! Per-cell heat maps.
//!
//! Three kinds are supported:
//!
//! - **Pathfinding**: movement difficulty. A base score from the cell's
//!   own tile (0 for clean floor up to 2 for hazards and walls) plus one
//!   per blocked 8-neighbour, clamped to [`HEAT_MAX`].
//! - **Resources**: every resource cell spreads `value / distance` to the
//!   cells within `resource_radius` (itself counting as distance 1), then
//!   the field is scaled so its peak is [`HEAT_MAX`].
//! - **Elevation**: the raw elevation, optionally scaled so its peak is
//!   [`HEAT_MAX`].

use cavern_core::{Cell, Coord, GridError, LevelGrid, TileCategory};
use serde::{Deserialize, Serialize};

/// Upper bound of normalized heat values.
pub const HEAT_MAX: f32 = 10.0;

/// Which heat map to compute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HeatMapKind {
    /// Movement difficulty.
    Pathfinding,
    /// Resource density.
    Resources,
    /// Terrain height.
    Elevation,
}

/// Heat map tuning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeatMapOptions {
    /// Spread radius for resource heat, Euclidean. Default: 2.
    pub resource_radius: u32,
    /// Scale elevation into `[0, HEAT_MAX]`. Default: false (raw values).
    pub normalize_elevation: bool,
}

impl Default for HeatMapOptions {
    fn default() -> Self {
        Self {
            resource_radius: 2,
            normalize_elevation: false,
        }
    }
}

/// Row-major per-cell scores.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HeatMap {
    /// Which map this is.
    pub kind: HeatMapKind,
    /// Grid width.
    pub width: u32,
    /// Grid height.
    pub height: u32,
    /// One value per cell, row-major.
    pub values: Vec<f32>,
}

impl HeatMap {
    /// Value at `coord`.
    pub fn at(&self, coord: Coord) -> Option<f32> {
        if coord.x >= self.width || coord.y >= self.height {
            return None;
        }
        self.values
            .get((coord.y as usize) * (self.width as usize) + coord.x as usize)
            .copied()
    }

    /// Largest value, or 0 for an empty map.
    pub fn peak(&self) -> f32 {
        self.values.iter().copied().fold(0.0, f32::max)
    }
}

/// Compute a heat map of `kind` for a well-formed grid.
pub fn compute_heat_map(
    grid: &LevelGrid,
    kind: HeatMapKind,
    options: &HeatMapOptions,
) -> Result<HeatMap, GridError> {
    grid.ensure_well_formed()?;
    let values = match kind {
        HeatMapKind::Pathfinding => pathfinding(grid),
        HeatMapKind::Resources => resources(grid, options.resource_radius),
        HeatMapKind::Elevation => elevation(grid, options.normalize_elevation),
    };
    Ok(HeatMap {
        kind,
        width: grid.width(),
        height: grid.height(),
        values,
    })
}

fn base_difficulty(cell: &Cell) -> f32 {
    match cell.category() {
        Some(TileCategory::Ground | TileCategory::PowerPath) => 0.0,
        Some(TileCategory::Rubble) => 1.0,
        _ => 2.0,
    }
}

fn pathfinding(grid: &LevelGrid) -> Vec<f32> {
    grid.iter()
        .map(|(coord, cell)| {
            let blocked = grid
                .neighbours_unchecked(coord, true)
                .iter()
                .filter(|&&n| !grid.get(n).is_some_and(Cell::is_pathable))
                .count();
            (base_difficulty(cell) + blocked as f32).min(HEAT_MAX)
        })
        .collect()
}

fn resources(grid: &LevelGrid, radius: u32) -> Vec<f32> {
    let mut field = vec![0.0f64; grid.cell_count()];
    // Anything wider than the grid reaches every cell anyway.
    let span = radius.min(grid.width().max(grid.height()));
    let r = i32::try_from(span).unwrap_or(i32::MAX);
    let r_sq = f64::from(radius).powi(2);

    for (coord, cell) in grid.iter() {
        let value = f64::from(cell.crystals) + f64::from(cell.ore);
        if value == 0.0 {
            continue;
        }
        for dy in -r..=r {
            for dx in -r..=r {
                let distance_sq = f64::from(dx).powi(2) + f64::from(dy).powi(2);
                if distance_sq > r_sq {
                    continue;
                }
                let Some(index) = coord.offset(dx, dy).and_then(|t| grid.index_of(t)) else {
                    continue;
                };
                field[index] += value / distance_sq.sqrt().max(1.0);
            }
        }
    }

    let peak = field.iter().copied().fold(0.0, f64::max);
    if peak <= 0.0 {
        return vec![0.0; field.len()];
    }
    let scale = f64::from(HEAT_MAX) / peak;
    field.into_iter().map(|v| (v * scale) as f32).collect()
}

fn elevation(grid: &LevelGrid, normalize: bool) -> Vec<f32> {
    let raw: Vec<f32> = grid.cells().iter().map(|c| c.elevation as f32).collect();
    if !normalize {
        return raw;
    }
    let peak = raw.iter().copied().fold(0.0, f32::max);
    if peak <= 0.0 {
        return raw;
    }
    raw.into_iter().map(|v| v / peak * HEAT_MAX).collect()
}
