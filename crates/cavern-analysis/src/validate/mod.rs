//! Phased level validation.
//!
//! A run walks the [`Phase`]s in order, each appending issues to a shared
//! list. The structural phase decides whether the cell array can be
//! trusted at all; when it cannot, the cell-reading phases produce
//! nothing and the report carries the single structural error instead of
//! a cascade of follow-on noise.
//!
//! ```text
//! Structural -> Tiles -> Connectivity -> Resources -> Objectives -> ScriptReferences
//! ```
//!
//! Connectivity computes reachability once; the resource phase reuses it.

mod issue;
mod phases;

pub use issue::{IssueCode, Severity, ValidationIssue, ValidationReport};

use cavern_core::{BuildingKind, Coord, LevelGrid};
use serde::{Deserialize, Serialize};
use tracing::debug;

use phases::ValidationRun;

/// Validator thresholds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidatorConfig {
    /// Minimum playable width. Default: 10.
    pub min_width: u32,
    /// Minimum playable height. Default: 10.
    pub min_height: u32,
    /// Illegal tiles, and separately misplaced buildings, reported
    /// individually before a summary issue takes over. Default: 25.
    pub max_tile_issues: usize,
    /// Fraction of supply above which an objective draws a
    /// tight-margin warning. Default: 0.9.
    pub tight_margin: f64,
    /// 8-connected reachability. Default: true.
    pub diagonal: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            min_width: 10,
            min_height: 10,
            max_tile_issues: 25,
            tight_margin: 0.9,
            diagonal: true,
        }
    }
}

/// A win condition attached to the level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Objective {
    /// Collect this many crystals.
    Crystals {
        /// Required count.
        amount: u32,
    },
    /// Collect this many ore.
    Ore {
        /// Required count.
        amount: u32,
    },
    /// Construct a building.
    Building {
        /// Required building.
        kind: BuildingKind,
    },
    /// Uncover a specific cell.
    DiscoverTile {
        /// Target cell.
        at: Coord,
    },
}

/// An entity a level script refers to by name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ScriptReference {
    /// A cell coordinate.
    Tile {
        /// Script variable name.
        #[serde(default)]
        name: String,
        /// Referenced cell.
        at: Coord,
    },
    /// A placed building.
    Building {
        /// Script variable name.
        #[serde(default)]
        name: String,
        /// Referenced building kind.
        kind: BuildingKind,
    },
}

/// Level metadata that lives outside the grid.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidationContext {
    /// Win conditions.
    pub objectives: Vec<Objective>,
    /// Extra connectivity origins on top of the tool stores.
    pub start_positions: Vec<Coord>,
    /// Names used by level scripts.
    pub script_references: Vec<ScriptReference>,
}

/// Validation phases in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Dimensions and cell count.
    Structural,
    /// Tile catalogue membership and building placement.
    Tiles,
    /// Origins, isolated cells, unreachable regions.
    Connectivity,
    /// Resource accessibility.
    Resources,
    /// Objective feasibility.
    Objectives,
    /// Script entity references.
    ScriptReferences,
}

impl Phase {
    /// First phase of every run.
    pub const FIRST: Phase = Phase::Structural;

    /// The phase after this one.
    pub fn next(self) -> Option<Phase> {
        match self {
            Self::Structural => Some(Self::Tiles),
            Self::Tiles => Some(Self::Connectivity),
            Self::Connectivity => Some(Self::Resources),
            Self::Resources => Some(Self::Objectives),
            Self::Objectives => Some(Self::ScriptReferences),
            Self::ScriptReferences => None,
        }
    }

    /// Short name for logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::Structural => "structural",
            Self::Tiles => "tiles",
            Self::Connectivity => "connectivity",
            Self::Resources => "resources",
            Self::Objectives => "objectives",
            Self::ScriptReferences => "script-references",
        }
    }
}

/// Runs every phase against a grid.
#[derive(Clone, Debug, Default)]
pub struct Validator {
    config: ValidatorConfig,
}

impl Validator {
    /// Validator with custom thresholds.
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    /// Active thresholds.
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validate `grid` against `context`.
    ///
    /// Never fails: every problem, including a malformed grid, becomes an
    /// issue in the report.
    pub fn validate(&self, grid: &LevelGrid, context: &ValidationContext) -> ValidationReport {
        let mut run = ValidationRun::new(grid, context, &self.config);
        let mut phase = Some(Phase::FIRST);
        while let Some(current) = phase {
            let found = run.run(current);
            debug!(phase = current.name(), found, "validation phase complete");
            phase = current.next();
        }
        let report = run.finish();
        debug!(
            width = grid.width(),
            height = grid.height(),
            errors = report.errors().count(),
            warnings = report.warnings().count(),
            infos = report.infos().count(),
            "validation finished"
        );
        report
    }
}

/// Validate with default thresholds.
pub fn validate(grid: &LevelGrid, context: &ValidationContext) -> ValidationReport {
    Validator::default().validate(grid, context)
}
