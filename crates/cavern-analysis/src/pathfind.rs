//! A* shortest path over pathable cells.
//!
//! Every move costs 1, diagonal or not. The heuristic is Manhattan
//! distance for 4-connected searches and Chebyshev distance for
//! 8-connected ones; both are consistent for unit step costs, so the
//! first time the goal is popped its cost is optimal.
//!
//! The open set is a min-heap keyed on `(f, seq)` where `seq` is a
//! monotone insertion counter. Equal-`f` entries therefore pop in the
//! order they were pushed, which makes the returned path deterministic.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use cavern_core::{Coord, GridError, LevelGrid};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

const NO_PARENT: usize = usize::MAX;

/// Path finder options.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PathOptions {
    /// Allow the 4 diagonal moves. Default: true.
    pub allow_diagonal: bool,
    /// Candidates whose `g + h` exceeds this are pruned. Default: 100 000.
    pub max_cost: u32,
}

impl Default for PathOptions {
    fn default() -> Self {
        Self {
            allow_diagonal: true,
            max_cost: 100_000,
        }
    }
}

/// Outcome of [`find_path`].
///
/// `path` runs from start to goal inclusive. When no path exists it is
/// `None` and `cost` is positive infinity.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PathResult {
    /// Cells from start to goal, inclusive.
    pub path: Option<Vec<Coord>>,
    /// Number of moves, or infinity when unreachable.
    #[serde(serialize_with = "serialize_cost")]
    pub cost: f64,
}

// JSON has no infinity; unreachable serializes as null.
fn serialize_cost<S: serde::Serializer>(cost: &f64, s: S) -> Result<S::Ok, S::Error> {
    if cost.is_finite() {
        s.serialize_f64(*cost)
    } else {
        s.serialize_none()
    }
}

impl PathResult {
    /// No path.
    pub fn unreachable() -> Self {
        Self {
            path: None,
            cost: f64::INFINITY,
        }
    }

    fn found(path: Vec<Coord>, moves: u32) -> Self {
        Self {
            path: Some(path),
            cost: f64::from(moves),
        }
    }

    /// Whether a path was found.
    pub fn is_found(&self) -> bool {
        self.path.is_some()
    }

    /// Number of moves, if a path was found.
    pub fn moves(&self) -> Option<u32> {
        self.path.as_ref().map(|p| (p.len() - 1) as u32)
    }
}

/// Shortest path from `start` to `goal`.
///
/// A start or goal outside the grid is an error. A non-pathable start or
/// goal is not: it simply has no path.
pub fn find_path(
    grid: &LevelGrid,
    start: Coord,
    goal: Coord,
    options: &PathOptions,
) -> Result<PathResult, GridError> {
    for endpoint in [start, goal] {
        if !grid.contains(endpoint) {
            return Err(GridError::OutOfBounds {
                coord: endpoint,
                width: grid.width(),
                height: grid.height(),
            });
        }
    }
    grid.ensure_well_formed()?;

    let cells = grid.cells();
    let (Some(start_index), Some(goal_index)) = (grid.index_of(start), grid.index_of(goal)) else {
        return Ok(PathResult::unreachable());
    };
    if !cells[start_index].is_pathable() || !cells[goal_index].is_pathable() {
        return Ok(PathResult::unreachable());
    }
    if start == goal {
        return Ok(PathResult::found(vec![start], 0));
    }

    let diagonal = options.allow_diagonal;
    let heuristic = |c: Coord| {
        if diagonal {
            c.chebyshev(goal)
        } else {
            c.manhattan(goal)
        }
    };
    if heuristic(start) > options.max_cost {
        trace!(%start, %goal, max_cost = options.max_cost, "path search pruned at start");
        return Ok(PathResult::unreachable());
    }

    let mut g = vec![u32::MAX; cells.len()];
    let mut parent = vec![NO_PARENT; cells.len()];
    let mut closed = vec![false; cells.len()];
    let mut open = BinaryHeap::new();
    let mut seq: u64 = 0;
    let mut expanded = 0usize;

    g[start_index] = 0;
    open.push(Reverse((heuristic(start), seq, start_index)));

    while let Some(Reverse((_, _, index))) = open.pop() {
        if closed[index] {
            continue;
        }
        closed[index] = true;

        if index == goal_index {
            let path = reconstruct(grid, &parent, goal_index);
            debug!(%start, %goal, moves = g[goal_index], expanded, "path found");
            return Ok(PathResult::found(path, g[goal_index]));
        }
        expanded += 1;

        let coord = grid.coord_of(index);
        let next_g = g[index] + 1;
        for neighbour in grid.neighbours_unchecked(coord, diagonal) {
            let Some(n) = grid.index_of(neighbour) else {
                continue;
            };
            if closed[n] || !cells[n].is_pathable() || next_g >= g[n] {
                continue;
            }
            let f = next_g.saturating_add(heuristic(neighbour));
            if f > options.max_cost {
                continue;
            }
            g[n] = next_g;
            parent[n] = index;
            seq += 1;
            open.push(Reverse((f, seq, n)));
        }
    }

    trace!(%start, %goal, expanded, "open set exhausted, no path");
    Ok(PathResult::unreachable())
}

fn reconstruct(grid: &LevelGrid, parent: &[usize], goal: usize) -> Vec<Coord> {
    let mut path = vec![grid.coord_of(goal)];
    let mut current = goal;
    while parent[current] != NO_PARENT {
        current = parent[current];
        path.push(grid.coord_of(current));
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use cavern_test_utils::{grid_from_ascii, GridBuilder};

    fn ortho() -> PathOptions {
        PathOptions {
            allow_diagonal: false,
            ..Default::default()
        }
    }

    fn assert_valid_path(grid: &LevelGrid, path: &[Coord], diagonal: bool) {
        for pair in path.windows(2) {
            let step = if diagonal {
                pair[0].chebyshev(pair[1])
            } else {
                pair[0].manhattan(pair[1])
            };
            assert_eq!(step, 1, "{} -> {} is not one move", pair[0], pair[1]);
            assert!(grid.at(pair[1]).unwrap().is_pathable());
        }
    }

    #[test]
    fn straight_line_on_open_grid() {
        let grid = GridBuilder::new(10, 10).build();
        let r = find_path(&grid, Coord::new(0, 0), Coord::new(9, 0), &ortho()).unwrap();
        assert_eq!(r.cost, 9.0);
        assert_eq!(r.moves(), Some(9));
        let path = r.path.unwrap();
        assert_eq!(path.first(), Some(&Coord::new(0, 0)));
        assert_eq!(path.last(), Some(&Coord::new(9, 0)));
    }

    #[test]
    fn diagonal_moves_cost_one() {
        let grid = GridBuilder::new(10, 10).build();
        let r = find_path(&grid, Coord::new(0, 0), Coord::new(9, 9), &PathOptions::default())
            .unwrap();
        assert_eq!(r.cost, 9.0);
        let r4 = find_path(&grid, Coord::new(0, 0), Coord::new(9, 9), &ortho()).unwrap();
        assert_eq!(r4.cost, 18.0);
    }

    #[test]
    fn routes_around_walls() {
        let grid = grid_from_ascii(&[
            ".....", //
            "####.",
            ".....",
            ".####",
            ".....",
        ]);
        let r = find_path(&grid, Coord::new(0, 0), Coord::new(4, 4), &ortho()).unwrap();
        assert_eq!(r.cost, 16.0);
        assert_valid_path(&grid, r.path.as_deref().unwrap(), false);
    }

    #[test]
    fn start_equals_goal() {
        let grid = GridBuilder::new(3, 3).build();
        let r = find_path(&grid, Coord::new(1, 1), Coord::new(1, 1), &PathOptions::default())
            .unwrap();
        assert_eq!(r.path, Some(vec![Coord::new(1, 1)]));
        assert_eq!(r.cost, 0.0);
    }

    #[test]
    fn blocked_endpoints_have_no_path() {
        let grid = grid_from_ascii(&["..#", "..."]);
        let r = find_path(&grid, Coord::new(0, 0), Coord::new(2, 0), &PathOptions::default())
            .unwrap();
        assert!(!r.is_found());
        assert!(r.cost.is_infinite());
        let r = find_path(&grid, Coord::new(2, 0), Coord::new(2, 0), &PathOptions::default())
            .unwrap();
        assert!(!r.is_found());
    }

    #[test]
    fn sealed_goal_exhausts_open_set() {
        let grid = grid_from_ascii(&[
            "..#..", //
            "..#..",
            "..#..",
        ]);
        let r = find_path(&grid, Coord::new(0, 0), Coord::new(4, 2), &PathOptions::default())
            .unwrap();
        assert_eq!(r, PathResult::unreachable());
    }

    #[test]
    fn out_of_bounds_endpoint_is_an_error() {
        let grid = GridBuilder::new(3, 3).build();
        let err = find_path(&grid, Coord::new(0, 0), Coord::new(0, 3), &PathOptions::default())
            .unwrap_err();
        assert!(matches!(err, GridError::OutOfBounds { .. }));
    }

    #[test]
    fn max_cost_prunes_long_paths() {
        let grid = GridBuilder::new(20, 1).build();
        let tight = PathOptions {
            max_cost: 10,
            ..Default::default()
        };
        let r = find_path(&grid, Coord::new(0, 0), Coord::new(19, 0), &tight).unwrap();
        assert!(!r.is_found());
        let r = find_path(&grid, Coord::new(0, 0), Coord::new(10, 0), &tight).unwrap();
        assert_eq!(r.cost, 10.0);
    }

    #[test]
    fn paths_are_deterministic() {
        let grid = GridBuilder::new(12, 12).wall(5, 5).wall(6, 6).build();
        let a = find_path(&grid, Coord::new(0, 0), Coord::new(11, 11), &PathOptions::default())
            .unwrap();
        let b = find_path(&grid, Coord::new(0, 0), Coord::new(11, 11), &PathOptions::default())
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn unreachable_serializes_cost_as_null() {
        let json = serde_json::to_value(PathResult::unreachable()).unwrap();
        assert_eq!(json, serde_json::json!({ "path": null, "cost": null }));
    }
}
