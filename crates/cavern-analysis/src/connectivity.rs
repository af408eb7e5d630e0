//! Breadth-first reachability over pathable cells.
//!
//! All origins are seeded into the queue at distance zero before the
//! search starts (multi-source BFS), so a level with several start
//! positions is covered in a single O(width * height) pass.

use std::collections::{BTreeSet, VecDeque};

use cavern_core::{Cell, Coord, GridError, LevelGrid};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Distance value for cells the search never reached.
const UNREACHED: u32 = u32::MAX;

/// Which cells a search may enter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Traversal {
    /// Pathable floor only.
    #[default]
    Walk,
    /// Pathable floor plus drillable walls.
    Drill,
}

impl Traversal {
    fn admits(self, cell: &Cell) -> bool {
        match self {
            Self::Walk => cell.is_pathable(),
            Self::Drill => cell.is_pathable() || cell.is_drillable(),
        }
    }
}

/// Options for [`reachable_from_with`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConnectivityOptions {
    /// 8-connected when true, 4-connected otherwise. Default: true.
    pub diagonal: bool,
    /// Cells the search may enter. Default: [`Traversal::Walk`].
    pub traversal: Traversal,
}

impl Default for ConnectivityOptions {
    fn default() -> Self {
        Self {
            diagonal: true,
            traversal: Traversal::Walk,
        }
    }
}

/// Result of a reachability search.
///
/// Stores the BFS step distance of every reached cell, plus the pathable
/// cells that have no pathable neighbour at all. Those are listed
/// explicitly because they almost always indicate an authoring mistake.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reachability {
    width: u32,
    height: u32,
    distances: Vec<u32>,
    reached: usize,
    isolated: Vec<Coord>,
}

impl Reachability {
    fn index(&self, coord: Coord) -> Option<usize> {
        if coord.x >= self.width || coord.y >= self.height {
            return None;
        }
        Some((coord.y as usize) * (self.width as usize) + coord.x as usize)
    }

    /// Whether `coord` was reached.
    pub fn contains(&self, coord: Coord) -> bool {
        self.distance(coord).is_some()
    }

    /// BFS step count from the nearest origin, if reached.
    pub fn distance(&self, coord: Coord) -> Option<u32> {
        let d = *self.distances.get(self.index(coord)?)?;
        (d != UNREACHED).then_some(d)
    }

    /// Number of reached cells.
    pub fn len(&self) -> usize {
        self.reached
    }

    /// Whether nothing was reached.
    pub fn is_empty(&self) -> bool {
        self.reached == 0
    }

    /// Reached coordinates in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = Coord> + '_ {
        let width = (self.width as usize).max(1);
        self.distances
            .iter()
            .enumerate()
            .filter(|(_, &d)| d != UNREACHED)
            .map(move |(i, _)| Coord::new((i % width) as u32, (i / width) as u32))
    }

    /// Reached coordinates as an ordered set.
    pub fn to_set(&self) -> BTreeSet<Coord> {
        self.iter().collect()
    }

    /// Pathable cells with zero pathable neighbours, row-major.
    pub fn isolated(&self) -> &[Coord] {
        &self.isolated
    }
}

/// Cells reachable from any of `origins`, 8-connected over pathable cells.
pub fn reachable_from(grid: &LevelGrid, origins: &[Coord]) -> Result<Reachability, GridError> {
    reachable_from_with(grid, origins, &ConnectivityOptions::default())
}

/// Cells reachable from any of `origins` under `options`.
///
/// Origins the traversal cannot enter (walls, for [`Traversal::Walk`])
/// are not seeded. Fails with [`GridError::OutOfBounds`] for an origin
/// outside the grid and [`GridError::DimensionMismatch`] for a malformed
/// grid.
pub fn reachable_from_with(
    grid: &LevelGrid,
    origins: &[Coord],
    options: &ConnectivityOptions,
) -> Result<Reachability, GridError> {
    if let Some(&bad) = origins.iter().find(|&&o| !grid.contains(o)) {
        return Err(GridError::OutOfBounds {
            coord: bad,
            width: grid.width(),
            height: grid.height(),
        });
    }
    grid.ensure_well_formed()?;

    let cells = grid.cells();
    let mut distances = vec![UNREACHED; cells.len()];
    let mut queue = VecDeque::new();
    let mut reached = 0usize;

    for &origin in origins {
        let Some(index) = grid.index_of(origin) else {
            continue;
        };
        if distances[index] == 0 || !options.traversal.admits(&cells[index]) {
            continue;
        }
        distances[index] = 0;
        reached += 1;
        queue.push_back(origin);
    }

    while let Some(coord) = queue.pop_front() {
        let Some(current) = grid.index_of(coord) else {
            continue;
        };
        let next_distance = distances[current] + 1;
        for neighbour in grid.neighbours_unchecked(coord, options.diagonal) {
            let Some(index) = grid.index_of(neighbour) else {
                continue;
            };
            if distances[index] != UNREACHED || !options.traversal.admits(&cells[index]) {
                continue;
            }
            distances[index] = next_distance;
            reached += 1;
            queue.push_back(neighbour);
        }
    }

    let isolated = isolated_cells(grid, options.diagonal);
    debug!(
        origins = origins.len(),
        reached,
        isolated = isolated.len(),
        diagonal = options.diagonal,
        traversal = ?options.traversal,
        "reachability computed"
    );
    Ok(Reachability {
        width: grid.width(),
        height: grid.height(),
        distances,
        reached,
        isolated,
    })
}

/// Pathable cells with no pathable neighbour, row-major.
///
/// Cells missing from a malformed grid count as non-pathable.
pub fn isolated_cells(grid: &LevelGrid, diagonal: bool) -> Vec<Coord> {
    grid.iter()
        .filter(|(_, cell)| cell.is_pathable())
        .filter(|&(coord, _)| {
            grid.neighbours_unchecked(coord, diagonal)
                .iter()
                .all(|&n| !grid.get(n).is_some_and(Cell::is_pathable))
        })
        .map(|(coord, _)| coord)
        .collect()
}

/// A connected group of pathable cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cluster {
    cells: Vec<Coord>,
}

impl Cluster {
    /// Member cells, row-major.
    pub fn cells(&self) -> &[Coord] {
        &self.cells
    }

    /// Top-left-most member; used as the cluster's reported location.
    pub fn first(&self) -> Coord {
        self.cells[0]
    }

    /// Number of member cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false: clusters have at least one cell.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Label every pathable cell with its connected component.
///
/// Clusters come back ordered by their first cell, row-major. A malformed
/// grid yields no clusters.
pub fn components(grid: &LevelGrid, diagonal: bool) -> Vec<Cluster> {
    if !grid.is_well_formed() {
        return Vec::new();
    }
    let cells = grid.cells();
    let mut seen = vec![false; cells.len()];
    let mut clusters = Vec::new();
    let mut queue = VecDeque::new();

    for start in 0..cells.len() {
        if seen[start] || !cells[start].is_pathable() {
            continue;
        }
        seen[start] = true;
        let mut members = Vec::new();
        queue.push_back(grid.coord_of(start));
        while let Some(coord) = queue.pop_front() {
            members.push(coord);
            for neighbour in grid.neighbours_unchecked(coord, diagonal) {
                let Some(index) = grid.index_of(neighbour) else {
                    continue;
                };
                if !seen[index] && cells[index].is_pathable() {
                    seen[index] = true;
                    queue.push_back(neighbour);
                }
            }
        }
        members.sort();
        clusters.push(Cluster { cells: members });
    }
    clusters
}

/// Pathable clusters containing no cell of `reach`.
pub fn unreachable_clusters(
    grid: &LevelGrid,
    reach: &Reachability,
    diagonal: bool,
) -> Vec<Cluster> {
    components(grid, diagonal)
        .into_iter()
        .filter(|cluster| !cluster.cells.iter().any(|&c| reach.contains(c)))
        .collect()
}
