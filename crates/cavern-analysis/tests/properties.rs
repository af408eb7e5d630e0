//! Cross-module invariants checked over random grids.

use cavern_analysis::{
    compute_heat_map, compute_statistics, find_path, reachable_from, reachable_from_with,
    validate, ConnectivityOptions, HeatMapKind, HeatMapOptions, PathOptions, ValidationContext,
};
use cavern_test_utils::strategies::{arb_coord_in, arb_grid, arb_grid_with_origin};
use proptest::prelude::*;

fn four_connected() -> (ConnectivityOptions, PathOptions) {
    (
        ConnectivityOptions {
            diagonal: false,
            ..Default::default()
        },
        PathOptions {
            allow_diagonal: false,
            ..Default::default()
        },
    )
}

proptest! {
    #[test]
    fn total_tiles_is_width_times_height(grid in arb_grid(24)) {
        let stats = compute_statistics(&grid);
        prop_assert_eq!(stats.total_tiles, (grid.width() * grid.height()) as usize);
    }

    #[test]
    fn path_length_is_bounded_by_manhattan_and_bfs(
        (grid, origin) in arb_grid_with_origin(16),
        pick in any::<prop::sample::Index>(),
    ) {
        let (conn, path) = four_connected();
        let reach = reachable_from_with(&grid, &[origin], &conn).unwrap();
        let targets: Vec<_> = reach.iter().collect();
        let goal = targets[pick.index(targets.len())];
        let bfs = reach.distance(goal).unwrap();

        let result = find_path(&grid, origin, goal, &path).unwrap();
        let moves = result.moves().unwrap();
        prop_assert!(moves >= origin.manhattan(goal));
        prop_assert!(moves <= bfs);
        prop_assert_eq!(result.cost, f64::from(moves));
    }

    #[test]
    fn reachability_agrees_with_path_finding(
        (grid, origin) in arb_grid_with_origin(10),
        diagonal in any::<bool>(),
    ) {
        let conn = ConnectivityOptions { diagonal, ..Default::default() };
        let path = PathOptions { allow_diagonal: diagonal, ..Default::default() };
        let reach = reachable_from_with(&grid, &[origin], &conn).unwrap();
        for (coord, _) in grid.iter() {
            let result = find_path(&grid, origin, coord, &path).unwrap();
            prop_assert_eq!(
                reach.contains(coord),
                result.cost.is_finite(),
                "disagreement at {}", coord
            );
            if let Some(d) = reach.distance(coord) {
                prop_assert_eq!(result.cost, f64::from(d));
            }
        }
    }

    #[test]
    fn analyses_are_idempotent(
        (grid, origin) in arb_grid_with_origin(12),
        goal in arb_coord_in(12, 12),
    ) {
        let ctx = ValidationContext::default();
        prop_assert_eq!(validate(&grid, &ctx), validate(&grid, &ctx));
        prop_assert_eq!(compute_statistics(&grid), compute_statistics(&grid));
        prop_assert_eq!(
            reachable_from(&grid, &[origin]).unwrap(),
            reachable_from(&grid, &[origin]).unwrap()
        );
        let options = HeatMapOptions::default();
        prop_assert_eq!(
            compute_heat_map(&grid, HeatMapKind::Resources, &options).unwrap(),
            compute_heat_map(&grid, HeatMapKind::Resources, &options).unwrap()
        );
        if grid.contains(goal) {
            prop_assert_eq!(
                find_path(&grid, origin, goal, &PathOptions::default()).unwrap(),
                find_path(&grid, origin, goal, &PathOptions::default()).unwrap()
            );
        }
    }

    #[test]
    fn validation_never_panics_on_arbitrary_grids(grid in arb_grid(20)) {
        let report = validate(&grid, &ValidationContext::default());
        for pair in report.issues().windows(2) {
            prop_assert!(pair[0].severity <= pair[1].severity);
        }
    }
}
