//! Benchmark profiles for Cavern level analysis.
//!
//! Provides deterministic synthetic caves for benchmarking:
//!
//! - [`reference_cave`]: 128x128 grid (16K cells)
//! - [`stress_cave`]: 512x512 grid (~262K cells)
//! - [`generate_cave`]: any size, driven by a seed

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use cavern_core::{BuildingKind, Cell, LevelGrid, TileId};

/// 128x128 cave, seed 42.
pub fn reference_cave() -> LevelGrid {
    generate_cave(128, 128, 42)
}

/// 512x512 cave, seed 42.
pub fn stress_cave() -> LevelGrid {
    generate_cave(512, 512, 42)
}

/// Build a deterministic cave of `width` x `height` cells.
///
/// Roughly a quarter of the cells are rock walls of mixed hardness, a few
/// percent hold crystals or ore, and seams are sprinkled through the rock.
/// A tool store sits at the center on open ground so every profile has an
/// origin. Elevation varies smoothly across the map.
pub fn generate_cave(width: u32, height: u32, seed: u64) -> LevelGrid {
    let mut cells = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height {
        for x in 0..width {
            let roll = mix(seed, x, y) % 100;
            let tile = match roll {
                0..=9 => TileId::DIRT,
                10..=17 => TileId::LOOSE_ROCK,
                18..=22 => TileId::HARD_ROCK,
                23..=24 => TileId::SOLID_ROCK,
                25 => TileId::CRYSTAL_SEAM,
                26 => TileId::ORE_SEAM,
                27..=29 => TileId::RUBBLE,
                30 => TileId::WATER,
                _ => TileId::GROUND,
            };
            let mut cell = Cell::new(tile).with_elevation((x / 8 + y / 8) % 16);
            if tile == TileId::GROUND {
                match roll {
                    31..=33 => cell = cell.with_crystals(1 + (roll % 3) as u32),
                    34..=35 => cell = cell.with_ore(1 + (roll % 2) as u32),
                    _ => {}
                }
            }
            cells.push(cell);
        }
    }

    if width > 0 && height > 0 {
        let center = (height / 2) as usize * width as usize + (width / 2) as usize;
        cells[center] = Cell::new(TileId::GROUND).with_building(BuildingKind::ToolStore);
    }
    LevelGrid::from_raw(width, height, cells)
}

// Stateless per-cell hash so any cell can be generated independently.
fn mix(seed: u64, x: u32, y: u32) -> u64 {
    let mut h = seed
        .wrapping_mul(6364136223846793005)
        .wrapping_add(((u64::from(x) << 32) | u64::from(y)).wrapping_mul(1442695040888963407));
    h ^= h >> 33;
    h = h.wrapping_mul(0xff51afd7ed558ccd);
    h ^ (h >> 33)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cavern_core::Coord;

    #[test]
    fn reference_cave_is_well_formed() {
        let grid = reference_cave();
        assert!(grid.is_well_formed());
        assert_eq!(grid.cells().len(), 128 * 128);
        assert!(grid.at(Coord::new(64, 64)).unwrap().is_origin());
    }

    #[test]
    fn generation_is_deterministic() {
        assert_eq!(generate_cave(40, 30, 7), generate_cave(40, 30, 7));
        assert_ne!(
            generate_cave(40, 30, 7).content_hash(),
            generate_cave(40, 30, 8).content_hash()
        );
    }

    #[test]
    fn mix_of_walls_and_floor() {
        let grid = reference_cave();
        let pathable = grid.cells().iter().filter(|c| c.is_pathable()).count();
        let ratio = pathable as f64 / grid.cells().len() as f64;
        assert!((0.5..0.9).contains(&ratio), "pathable ratio {ratio}");
    }

    #[test]
    fn empty_dimensions_do_not_panic() {
        assert_eq!(generate_cave(0, 5, 1).cells().len(), 0);
    }
}
