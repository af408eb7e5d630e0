use cavern_core::{Cell, Coord, LevelGrid};

use super::issue::{IssueCode, ValidationIssue, ValidationReport};
use super::{Objective, Phase, ScriptReference, ValidationContext, ValidatorConfig};
use crate::connectivity::{
    isolated_cells, reachable_from_with, unreachable_clusters, ConnectivityOptions, Reachability,
    Traversal,
};

/// Mutable state threaded through the phases of one run.
pub(super) struct ValidationRun<'a> {
    grid: &'a LevelGrid,
    context: &'a ValidationContext,
    config: &'a ValidatorConfig,
    /// False once the structural phase finds the cell array untrustworthy.
    sound: bool,
    /// Walk-or-drill reachability from the origins.
    accessible: Option<Reachability>,
    issues: Vec<ValidationIssue>,
}

impl<'a> ValidationRun<'a> {
    pub(super) fn new(
        grid: &'a LevelGrid,
        context: &'a ValidationContext,
        config: &'a ValidatorConfig,
    ) -> Self {
        Self {
            grid,
            context,
            config,
            sound: true,
            accessible: None,
            issues: Vec::new(),
        }
    }

    /// Run one phase, returning how many issues it added.
    pub(super) fn run(&mut self, phase: Phase) -> usize {
        let before = self.issues.len();
        match phase {
            Phase::Structural => self.structural(),
            Phase::Tiles if self.sound => self.tiles(),
            Phase::Connectivity if self.sound => self.connectivity(),
            Phase::Resources if self.sound => self.resources(),
            Phase::Objectives if self.sound => self.objectives(),
            Phase::ScriptReferences => self.script_references(),
            _ => {}
        }
        self.issues.len() - before
    }

    pub(super) fn finish(self) -> ValidationReport {
        ValidationReport::from_issues(self.issues)
    }

    fn push(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    fn structural(&mut self) {
        let (w, h) = (self.grid.width(), self.grid.height());
        if !self.grid.is_well_formed() {
            self.sound = false;
            self.push(ValidationIssue::new(
                IssueCode::MalformedGrid,
                format!(
                    "grid declares {w}x{h} ({} cells) but holds {} cells",
                    self.grid.cell_count(),
                    self.grid.cells().len()
                ),
            ));
            return;
        }
        if w < self.config.min_width || h < self.config.min_height {
            self.push(ValidationIssue::new(
                IssueCode::GridTooSmall,
                format!(
                    "grid is {w}x{h}; levels must be at least {}x{}",
                    self.config.min_width, self.config.min_height
                ),
            ));
        }
    }

    fn tiles(&mut self) {
        let cap = self.config.max_tile_issues;
        let (mut illegal, mut misplaced) = (0usize, 0usize);
        let grid = self.grid;
        for (coord, cell) in grid.iter() {
            if let Some(tile) = cell.tile_id.filter(|t| !t.is_known()) {
                illegal += 1;
                if illegal <= cap {
                    self.push(
                        ValidationIssue::new(
                            IssueCode::IllegalTile,
                            format!("tile id {tile} is not in the catalogue"),
                        )
                        .at(coord),
                    );
                }
            }
            if let Some(building) = cell.building_id.filter(|_| !cell.is_pathable()) {
                misplaced += 1;
                if misplaced <= cap {
                    self.push(
                        ValidationIssue::new(
                            IssueCode::BuildingOnImpassableTile,
                            format!("{building} stands on {}", describe_tile(cell)),
                        )
                        .at(coord),
                    );
                }
            }
        }
        if illegal > cap {
            self.push(ValidationIssue::new(
                IssueCode::IllegalTileSummary,
                format!(
                    "{} more cells carry illegal tile ids ({illegal} in total)",
                    illegal - cap
                ),
            ));
        }
        if misplaced > cap {
            self.push(ValidationIssue::new(
                IssueCode::BuildingPlacementSummary,
                format!(
                    "{} more buildings stand on impassable tiles ({misplaced} in total)",
                    misplaced - cap
                ),
            ));
        }
    }

    fn connectivity(&mut self) {
        let (grid, context) = (self.grid, self.context);
        let diagonal = self.config.diagonal;

        let mut origins: Vec<Coord> = grid
            .iter()
            .filter(|(_, cell)| cell.is_origin())
            .map(|(coord, _)| coord)
            .collect();
        for &start in &context.start_positions {
            if grid.contains(start) {
                origins.push(start);
            } else {
                self.push(
                    ValidationIssue::new(
                        IssueCode::OriginOutOfBounds,
                        format!(
                            "start position {start} lies outside the {}x{} grid",
                            grid.width(),
                            grid.height()
                        ),
                    )
                    .at(start),
                );
            }
        }

        for coord in isolated_cells(grid, diagonal) {
            // An enclosed resource cell gets its own warning from the
            // resource phase.
            if grid.get(coord).is_some_and(Cell::has_resources) && is_enclosed(grid, coord) {
                continue;
            }
            self.push(
                ValidationIssue::new(
                    IssueCode::IsolatedCell,
                    "pathable cell has no pathable neighbours",
                )
                .at(coord),
            );
        }

        if origins.is_empty() {
            self.push(ValidationIssue::new(
                IssueCode::MissingOrigin,
                "no tool store or start position; reachability cannot be checked",
            ));
            return;
        }

        let walk = ConnectivityOptions {
            diagonal,
            traversal: Traversal::Walk,
        };
        if let Ok(reach) = reachable_from_with(grid, &origins, &walk) {
            for cluster in unreachable_clusters(grid, &reach, diagonal) {
                // Single cells were already reported as isolated.
                if cluster.len() < 2 {
                    continue;
                }
                self.push(
                    ValidationIssue::new(
                        IssueCode::UnreachableRegion,
                        format!(
                            "{} pathable cells cannot be reached from any start position",
                            cluster.len()
                        ),
                    )
                    .at(cluster.first()),
                );
            }
        }

        let drill = ConnectivityOptions {
            diagonal,
            traversal: Traversal::Drill,
        };
        self.accessible = reachable_from_with(grid, &origins, &drill).ok();
    }

    fn resources(&mut self) {
        let grid = self.grid;
        for (coord, cell) in grid.iter() {
            if !cell.has_resources() {
                continue;
            }
            if is_enclosed(grid, coord) {
                self.push(
                    ValidationIssue::new(
                        IssueCode::EnclosedResource,
                        format!(
                            "{} sealed in by impassable, undrillable walls",
                            describe_resources(cell)
                        ),
                    )
                    .at(coord),
                );
                continue;
            }
            let reachable = self
                .accessible
                .as_ref()
                .is_some_and(|reach| reach.contains(coord));
            if self.accessible.is_some() && !reachable {
                self.push(
                    ValidationIssue::new(
                        IssueCode::UnreachableResource,
                        format!(
                            "{} cannot be reached by walking or drilling from any start position",
                            describe_resources(cell)
                        ),
                    )
                    .at(coord),
                );
            }
        }
    }

    fn objectives(&mut self) {
        let (grid, context) = (self.grid, self.context);
        let (crystals, ore) = grid.cells().iter().fold((0u64, 0u64), |(c, o), cell| {
            (c + u64::from(cell.crystals), o + u64::from(cell.ore))
        });

        for objective in &context.objectives {
            match *objective {
                Objective::Crystals { amount } => self.check_supply("crystals", amount, crystals),
                Objective::Ore { amount } => self.check_supply("ore", amount, ore),
                Objective::Building { kind } => self.push(ValidationIssue::new(
                    IssueCode::ObjectiveUnverified,
                    format!("building objective ({kind}) is not checked against the grid"),
                )),
                Objective::DiscoverTile { at } if !grid.contains(at) => self.push(
                    ValidationIssue::new(
                        IssueCode::ObjectiveOutOfBounds,
                        format!(
                            "discovery objective at {at} lies outside the {}x{} grid",
                            grid.width(),
                            grid.height()
                        ),
                    )
                    .at(at),
                ),
                Objective::DiscoverTile { at } => self.push(
                    ValidationIssue::new(
                        IssueCode::ObjectiveUnverified,
                        format!("discovery objective at {at} is not checked against the grid"),
                    )
                    .at(at),
                ),
            }
        }
    }

    fn check_supply(&mut self, resource: &str, required: u32, supply: u64) {
        let required_wide = u64::from(required);
        if required_wide > supply {
            self.push(ValidationIssue::new(
                IssueCode::ObjectiveExceedsSupply,
                format!(
                    "objective requires {required} {resource} but the level holds only {supply}"
                ),
            ));
        } else if required > 0 && f64::from(required) > self.config.tight_margin * supply as f64 {
            self.push(ValidationIssue::new(
                IssueCode::ObjectiveTightMargin,
                format!(
                    "objective requires {required} of the {supply} {resource} available, \
                     over {:.0}% of supply",
                    self.config.tight_margin * 100.0
                ),
            ));
        }
    }

    fn script_references(&mut self) {
        let (grid, context) = (self.grid, self.context);
        for reference in &context.script_references {
            match reference {
                ScriptReference::Tile { name, at } if !grid.contains(*at) => self.push(
                    ValidationIssue::new(
                        IssueCode::ScriptMissingEntity,
                        format!(
                            "script variable `{name}` references {at}, outside the {}x{} grid",
                            grid.width(),
                            grid.height()
                        ),
                    )
                    .at(*at),
                ),
                ScriptReference::Building { name, kind }
                    if self.sound
                        && !grid.cells().iter().any(|c| c.building_id == Some(*kind)) =>
                {
                    self.push(ValidationIssue::new(
                        IssueCode::ScriptMissingEntity,
                        format!("script variable `{name}` references a {kind}, but none is placed"),
                    ))
                }
                _ => {}
            }
        }
    }
}

/// Every in-bounds 8-neighbour is neither pathable nor drillable. The
/// grid edge counts as wall.
fn is_enclosed(grid: &LevelGrid, coord: Coord) -> bool {
    grid.neighbours_unchecked(coord, true)
        .iter()
        .filter_map(|&n| grid.get(n))
        .all(|n| !n.is_pathable() && !n.is_drillable())
}

fn describe_tile(cell: &Cell) -> String {
    match (cell.tile_id, cell.category()) {
        (None, _) => "an unassigned tile".to_owned(),
        (Some(tile), Some(category)) => format!("{category} (tile {tile})"),
        (Some(tile), None) => format!("illegal tile {tile}"),
    }
}

fn describe_resources(cell: &Cell) -> String {
    match (cell.crystals, cell.ore) {
        (c, 0) => format!("{c} crystals"),
        (0, o) => format!("{o} ore"),
        (c, o) => format!("{c} crystals and {o} ore"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::{validate, Severity, ValidationContext, Validator};
    use cavern_core::{BuildingKind, TileId};
    use cavern_test_utils::{grid_from_ascii, open_level, GridBuilder};

    fn codes(report: &ValidationReport) -> Vec<IssueCode> {
        report.issues().iter().map(|i| i.code).collect()
    }

    #[test]
    fn open_level_is_clean() {
        let report = validate(&open_level(), &ValidationContext::default());
        assert!(report.is_empty(), "{:?}", report.issues());
    }

    #[test]
    fn malformed_grid_reports_once() {
        let grid = LevelGrid::from_raw(10, 10, vec![Cell::new(TileId::GROUND); 99]);
        let report = validate(&grid, &ValidationContext::default());
        assert_eq!(codes(&report), [IssueCode::MalformedGrid]);
    }

    #[test]
    fn small_grid_is_an_error_but_other_phases_still_run() {
        let grid = GridBuilder::new(5, 5).build();
        let report = validate(&grid, &ValidationContext::default());
        assert_eq!(
            codes(&report),
            [IssueCode::GridTooSmall, IssueCode::MissingOrigin]
        );
    }

    #[test]
    fn illegal_tiles_are_capped_with_summary() {
        let grid = GridBuilder::filled(10, 10, Cell::new(TileId(13)))
            .cell(0, 0, Cell::new(TileId::GROUND).with_building(BuildingKind::ToolStore))
            .build();
        let validator = Validator::new(ValidatorConfig {
            max_tile_issues: 3,
            ..Default::default()
        });
        let report = validator.validate(&grid, &ValidationContext::default());
        assert_eq!(report.by_code(IssueCode::IllegalTile).count(), 3);
        let summary: Vec<_> = report.by_code(IssueCode::IllegalTileSummary).collect();
        assert_eq!(summary.len(), 1);
        assert!(summary[0].message.contains("99 in total"));
    }

    #[test]
    fn building_on_wall() {
        let grid = GridBuilder::new(10, 10)
            .tool_store(0, 0)
            .wall(5, 5)
            .building(5, 5, BuildingKind::PowerStation)
            .build();
        let report = validate(&grid, &ValidationContext::default());
        let issue = report
            .by_code(IssueCode::BuildingOnImpassableTile)
            .next()
            .unwrap();
        assert_eq!(issue.location, Some(Coord::new(5, 5)));
        assert!(issue.message.contains("solid rock"), "{}", issue.message);
    }

    #[test]
    fn misplaced_buildings_are_capped_with_summary() {
        let mut builder = GridBuilder::new(10, 10).tool_store(0, 0);
        for x in 0..10 {
            builder = builder.wall(x, 9).building(x, 9, BuildingKind::PowerStation);
        }
        let validator = Validator::new(ValidatorConfig {
            max_tile_issues: 4,
            ..Default::default()
        });
        let report = validator.validate(&builder.build(), &ValidationContext::default());
        assert_eq!(report.by_code(IssueCode::BuildingOnImpassableTile).count(), 4);
        let summary: Vec<_> = report
            .by_code(IssueCode::BuildingPlacementSummary)
            .collect();
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].severity, Severity::Error);
        assert!(summary[0].message.contains("10 in total"), "{}", summary[0].message);
    }

    #[test]
    fn isolated_resource_cell_behind_dirt_is_still_isolated() {
        let rows = [
            "T.........",
            "..........",
            "..........",
            "..........",
            "....ddd...",
            "....dCd...",
            "....ddd...",
            "..........",
            "..........",
            "..........",
        ];
        let report = validate(&grid_from_ascii(&rows), &ValidationContext::default());
        let isolated: Vec<_> = report.by_code(IssueCode::IsolatedCell).collect();
        assert_eq!(isolated.len(), 1);
        assert_eq!(isolated[0].location, Some(Coord::new(5, 5)));
        assert_eq!(isolated[0].severity, Severity::Warning);
        // Reachable by drilling, so no resource warning on top.
        assert_eq!(report.by_code(IssueCode::UnreachableResource).count(), 0);
        assert_eq!(report.by_code(IssueCode::EnclosedResource).count(), 0);

        let plain = rows.map(|row| row.replace('C', "."));
        let plain: Vec<&str> = plain.iter().map(String::as_str).collect();
        let report = validate(&grid_from_ascii(&plain), &ValidationContext::default());
        assert_eq!(report.by_code(IssueCode::IsolatedCell).count(), 1);
    }

    #[test]
    fn enclosed_resource_is_not_also_isolated() {
        let grid = grid_from_ascii(&[
            "T.........",
            "..........",
            "..........",
            "..........",
            "....###...",
            "....#C#...",
            "....###...",
            "..........",
            "..........",
            "..........",
        ]);
        let report = validate(&grid, &ValidationContext::default());
        assert_eq!(codes(&report), [IssueCode::EnclosedResource]);
    }

    #[test]
    fn start_positions_act_as_origins() {
        let grid = GridBuilder::new(10, 10).build();
        let ctx = ValidationContext {
            start_positions: vec![Coord::new(4, 4), Coord::new(40, 4)],
            ..Default::default()
        };
        let report = validate(&grid, &ctx);
        assert_eq!(codes(&report), [IssueCode::OriginOutOfBounds]);
    }

    #[test]
    fn unreachable_region_reported_once_per_cluster() {
        let mut builder = GridBuilder::new(10, 10).tool_store(0, 0);
        for y in 0..10 {
            builder = builder.wall(6, y);
        }
        let report = validate(&builder.build(), &ValidationContext::default());
        let regions: Vec<_> = report.by_code(IssueCode::UnreachableRegion).collect();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].location, Some(Coord::new(7, 0)));
        assert!(regions[0].message.starts_with("30 "));
    }

    #[test]
    fn resource_behind_drillable_wall_is_accessible() {
        let grid = grid_from_ascii(&[
            "T...dddd..",
            "....dCOd..",
            "....dddd..",
            "..........",
            "..........",
            "..........",
            "..........",
            "..........",
            "..........",
            "..........",
        ]);
        let report = validate(&grid, &ValidationContext::default());
        assert!(report.by_code(IssueCode::UnreachableResource).next().is_none());
        assert!(report.by_code(IssueCode::EnclosedResource).next().is_none());
    }

    #[test]
    fn resource_across_lava_is_unreachable() {
        let grid = grid_from_ascii(&[
            "T....*....",
            ".....*....",
            ".....*....",
            ".....*....",
            ".....*..C.",
            ".....*....",
            ".....*....",
            ".....*....",
            ".....*....",
            ".....*....",
        ]);
        let report = validate(&grid, &ValidationContext::default());
        let issues: Vec<_> = report.by_code(IssueCode::UnreachableResource).collect();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].location, Some(Coord::new(8, 4)));
        assert_eq!(report.by_code(IssueCode::UnreachableRegion).count(), 1);
    }

    #[test]
    fn objective_supply_checks() {
        let grid = GridBuilder::new(10, 10)
            .tool_store(0, 0)
            .crystals(3, 3, 60)
            .crystals(4, 4, 40)
            .ore(5, 5, 10)
            .build();
        let ctx = ValidationContext {
            objectives: vec![
                Objective::Crystals { amount: 95 },
                Objective::Ore { amount: 11 },
                Objective::Crystals { amount: 50 },
                Objective::Building {
                    kind: BuildingKind::Docks,
                },
                Objective::DiscoverTile {
                    at: Coord::new(20, 2),
                },
            ],
            ..Default::default()
        };
        let report = validate(&grid, &ctx);
        assert_eq!(
            codes(&report),
            [
                IssueCode::ObjectiveExceedsSupply,
                IssueCode::ObjectiveOutOfBounds,
                IssueCode::ObjectiveTightMargin,
                IssueCode::ObjectiveUnverified,
            ]
        );
        assert_eq!(report.infos().next().unwrap().severity, Severity::Info);
        assert!(report.issues()[0].message.contains("only 10"));
    }

    #[test]
    fn script_references_are_checked() {
        let grid = open_level();
        let ctx = ValidationContext {
            script_references: vec![
                ScriptReference::Tile {
                    name: "gate".into(),
                    at: Coord::new(3, 3),
                },
                ScriptReference::Tile {
                    name: "exit".into(),
                    at: Coord::new(10, 3),
                },
                ScriptReference::Building {
                    name: "hq".into(),
                    kind: BuildingKind::ToolStore,
                },
                ScriptReference::Building {
                    name: "dock".into(),
                    kind: BuildingKind::Docks,
                },
            ],
            ..Default::default()
        };
        let report = validate(&grid, &ctx);
        let missing: Vec<_> = report.by_code(IssueCode::ScriptMissingEntity).collect();
        assert_eq!(missing.len(), 2);
        assert!(missing[0].message.contains("`exit`"));
        assert!(missing[1].message.contains("`dock`"));
    }
}
