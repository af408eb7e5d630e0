//! The immutable level grid snapshot.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cell::Cell;
use crate::coord::Coord;
use crate::error::GridError;
use crate::hash::grid_hash;

/// Cardinal offsets: N, S, W, E.
const OFFSETS_4: [(i32, i32); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

/// All 8 offsets: N, S, W, E, NW, NE, SW, SE.
const OFFSETS_8: [(i32, i32); 8] = [
    (0, -1),
    (0, 1),
    (-1, 0),
    (1, 0),
    (-1, -1),
    (1, -1),
    (-1, 1),
    (1, 1),
];

/// In-bounds neighbours of a cell. Never more than 8.
pub type Neighbours = SmallVec<[Coord; 8]>;

/// Row-major grid of [`Cell`]s describing one level.
///
/// Immutable after construction; analyses borrow it and share it across
/// threads behind an `Arc`. The content hash is computed once at
/// construction and keys result caches.
///
/// Two constructors exist: [`LevelGrid::new`] enforces
/// `cells.len() == width * height`, while [`LevelGrid::from_raw`] accepts
/// untrusted parser output as-is so the validator can report what is
/// wrong with it. Deserialization goes through `from_raw`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "GridParts")]
pub struct LevelGrid {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
    #[serde(skip)]
    content_hash: u64,
}

#[derive(Deserialize)]
struct GridParts {
    width: u32,
    height: u32,
    #[serde(default)]
    cells: Vec<Cell>,
}

impl From<GridParts> for LevelGrid {
    fn from(parts: GridParts) -> Self {
        LevelGrid::from_raw(parts.width, parts.height, parts.cells)
    }
}

impl LevelGrid {
    /// Build a grid, rejecting a cell array whose length disagrees with
    /// the dimensions.
    pub fn new(width: u32, height: u32, cells: Vec<Cell>) -> Result<Self, GridError> {
        let grid = Self::from_raw(width, height, cells);
        grid.ensure_well_formed()?;
        Ok(grid)
    }

    /// Build a grid of `width * height` copies of `cell`.
    pub fn filled(width: u32, height: u32, cell: Cell) -> Self {
        let count = (width as usize) * (height as usize);
        Self::from_raw(width, height, vec![cell; count])
    }

    /// Wrap untrusted parser output without checking it.
    pub fn from_raw(width: u32, height: u32, cells: Vec<Cell>) -> Self {
        let content_hash = grid_hash(width, height, &cells);
        Self {
            width,
            height,
            cells,
            content_hash,
        }
    }

    /// Width in cells.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in cells.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `width * height`, the number of cells the dimensions declare.
    pub fn cell_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Raw cell storage, row-major.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// FNV-1a hash of dimensions and cell contents.
    pub fn content_hash(&self) -> u64 {
        self.content_hash
    }

    /// Whether the cell array matches the declared dimensions.
    pub fn is_well_formed(&self) -> bool {
        self.cells.len() == self.cell_count()
    }

    /// `Err(DimensionMismatch)` unless [`is_well_formed`](Self::is_well_formed).
    pub fn ensure_well_formed(&self) -> Result<(), GridError> {
        if self.is_well_formed() {
            return Ok(());
        }
        Err(self.mismatch())
    }

    fn mismatch(&self) -> GridError {
        GridError::DimensionMismatch {
            width: self.width,
            height: self.height,
            expected: self.cell_count(),
            actual: self.cells.len(),
        }
    }

    /// Whether `coord` lies within the declared dimensions.
    pub fn contains(&self, coord: Coord) -> bool {
        coord.x < self.width && coord.y < self.height
    }

    /// Row-major storage index of `coord`, if in bounds.
    pub fn index_of(&self, coord: Coord) -> Option<usize> {
        if !self.contains(coord) {
            return None;
        }
        Some((coord.y as usize) * (self.width as usize) + coord.x as usize)
    }

    /// Coordinate of a storage index. Inverse of [`index_of`](Self::index_of).
    pub fn coord_of(&self, index: usize) -> Coord {
        let width = (self.width as usize).max(1);
        Coord::new((index % width) as u32, (index / width) as u32)
    }

    /// Cell at `coord`.
    ///
    /// Fails with [`GridError::OutOfBounds`] outside the declared
    /// dimensions, and with [`GridError::DimensionMismatch`] when the
    /// coordinate is in bounds but the malformed cell array has no entry
    /// for it. Never clamps.
    pub fn at(&self, coord: Coord) -> Result<&Cell, GridError> {
        let index = self.index_of(coord).ok_or(GridError::OutOfBounds {
            coord,
            width: self.width,
            height: self.height,
        })?;
        self.cells.get(index).ok_or_else(|| self.mismatch())
    }

    /// Cell at `coord`, or `None` when out of bounds or missing.
    pub fn get(&self, coord: Coord) -> Option<&Cell> {
        self.index_of(coord).and_then(|i| self.cells.get(i))
    }

    /// 4- or 8-connected neighbours of `coord`, clipped to the grid.
    ///
    /// Fails with [`GridError::OutOfBounds`] if `coord` itself is outside
    /// the grid.
    pub fn neighbors(&self, coord: Coord, diagonal: bool) -> Result<Neighbours, GridError> {
        if !self.contains(coord) {
            return Err(GridError::OutOfBounds {
                coord,
                width: self.width,
                height: self.height,
            });
        }
        Ok(self.neighbours_unchecked(coord, diagonal))
    }

    /// Neighbours of an in-bounds coordinate. Hot-path variant of
    /// [`neighbors`](Self::neighbors) for the search algorithms.
    pub fn neighbours_unchecked(&self, coord: Coord, diagonal: bool) -> Neighbours {
        let offsets: &[(i32, i32)] = if diagonal { &OFFSETS_8 } else { &OFFSETS_4 };
        offsets
            .iter()
            .filter_map(|&(dx, dy)| coord.offset(dx, dy))
            .filter(|&n| self.contains(n))
            .collect()
    }

    /// Every in-bounds coordinate in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Coord::new(x, y)))
    }

    /// `(coord, cell)` pairs for every stored in-bounds cell, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, &Cell)> + '_ {
        self.cells
            .iter()
            .take(self.cell_count())
            .enumerate()
            .map(|(i, cell)| (self.coord_of(i), cell))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::TileId;
    use proptest::prelude::*;

    fn ground(w: u32, h: u32) -> LevelGrid {
        LevelGrid::filled(w, h, Cell::new(TileId::GROUND))
    }

    #[test]
    fn new_rejects_wrong_length() {
        let err = LevelGrid::new(5, 5, vec![Cell::default(); 20]).unwrap_err();
        assert_eq!(
            err,
            GridError::DimensionMismatch {
                width: 5,
                height: 5,
                expected: 25,
                actual: 20
            }
        );
        assert!(LevelGrid::new(5, 4, vec![Cell::default(); 20]).is_ok());
    }

    #[test]
    fn at_fails_fast_out_of_bounds() {
        let grid = ground(3, 2);
        assert!(grid.at(Coord::new(2, 1)).is_ok());
        assert_eq!(
            grid.at(Coord::new(3, 0)),
            Err(GridError::OutOfBounds {
                coord: Coord::new(3, 0),
                width: 3,
                height: 2
            })
        );
        assert!(grid.at(Coord::new(0, 2)).is_err());
    }

    #[test]
    fn at_on_truncated_grid_reports_mismatch() {
        let grid = LevelGrid::from_raw(5, 5, vec![Cell::default(); 20]);
        assert!(grid.at(Coord::new(4, 3)).is_ok());
        assert!(matches!(
            grid.at(Coord::new(0, 4)),
            Err(GridError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn corner_neighbours_are_clipped() {
        let grid = ground(4, 4);
        assert_eq!(grid.neighbors(Coord::new(0, 0), false).unwrap().len(), 2);
        assert_eq!(grid.neighbors(Coord::new(0, 0), true).unwrap().len(), 3);
        assert_eq!(grid.neighbors(Coord::new(1, 1), true).unwrap().len(), 8);
        assert_eq!(grid.neighbors(Coord::new(3, 1), false).unwrap().len(), 3);
        assert!(grid.neighbors(Coord::new(4, 0), true).is_err());
    }

    #[test]
    fn content_hash_tracks_contents() {
        let a = ground(4, 4);
        let b = ground(4, 4);
        assert_eq!(a.content_hash(), b.content_hash());
        let mut cells = a.cells().to_vec();
        cells[5] = cells[5].with_crystals(1);
        let c = LevelGrid::new(4, 4, cells).unwrap();
        assert_ne!(a.content_hash(), c.content_hash());
    }

    #[test]
    fn deserialize_keeps_malformed_input() {
        let grid: LevelGrid =
            serde_json::from_str(r#"{"width": 2, "height": 2, "cells": [{"tileId": 1}]}"#)
                .unwrap();
        assert!(!grid.is_well_formed());
        assert_eq!(grid.cells().len(), 1);
        assert_eq!(
            grid.content_hash(),
            LevelGrid::from_raw(2, 2, vec![Cell::new(TileId::GROUND)]).content_hash()
        );
    }

    #[test]
    fn iter_visits_row_major() {
        let grid = ground(3, 2);
        let coords: Vec<Coord> = grid.iter().map(|(c, _)| c).collect();
        assert_eq!(coords, grid.coords().collect::<Vec<_>>());
        assert_eq!(coords[4], Coord::new(1, 1));
    }

    proptest! {
        #[test]
        fn neighbours_symmetric(
            w in 1u32..12,
            h in 1u32..12,
            x in 0u32..12,
            y in 0u32..12,
            diagonal in any::<bool>(),
        ) {
            let grid = ground(w, h);
            let coord = Coord::new(x % w, y % h);
            for nb in grid.neighbors(coord, diagonal).unwrap() {
                prop_assert!(grid.contains(nb));
                prop_assert!(grid.neighbors(nb, diagonal).unwrap().contains(&coord));
            }
        }

        #[test]
        fn index_round_trips(w in 1u32..20, h in 1u32..20, i in 0usize..400) {
            let grid = ground(w, h);
            let i = i % grid.cell_count();
            let coord = grid.coord_of(i);
            prop_assert_eq!(grid.index_of(coord), Some(i));
        }
    }
}
