//! Spatial analysis over Cavern level grids.
//!
//! Every entry point is a synchronous, deterministic function of an
//! immutable [`LevelGrid`](cavern_core::LevelGrid) snapshot:
//!
//! - [`connectivity`]: multi-source breadth-first reachability, isolated
//!   cells and pathable clusters
//! - [`pathfind`]: A* shortest path with 4- or 8-connected movement
//! - [`validate`]: phased structural, tile, connectivity, resource,
//!   objective and script-reference checks producing a [`ValidationReport`]
//! - [`stats`]: single-pass aggregate [`Statistics`]
//! - [`heatmap`]: per-cell [`HeatMap`] scores
//!
//! Nothing here spawns threads or keeps state between calls; the engine
//! crate runs these functions off the caller's thread.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod connectivity;
pub mod heatmap;
pub mod pathfind;
pub mod stats;
pub mod validate;

pub use connectivity::{
    components, isolated_cells, reachable_from, reachable_from_with, unreachable_clusters,
    Cluster, ConnectivityOptions, Reachability, Traversal,
};
pub use heatmap::{compute_heat_map, HeatMap, HeatMapKind, HeatMapOptions, HEAT_MAX};
pub use pathfind::{find_path, PathOptions, PathResult};
pub use stats::{compute_statistics, Statistics};
pub use validate::{
    validate, IssueCode, Objective, Phase, ScriptReference, Severity, ValidationContext,
    ValidationIssue, ValidationReport, Validator, ValidatorConfig,
};
