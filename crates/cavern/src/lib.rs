//! Cavern: analysis tools for tile-based cave level grids.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the Cavern sub-crates. Most users only need `cavern` as a dependency.
//!
//! # Quick start
//!
//! ```rust
//! use cavern::prelude::*;
//!
//! // A 12×12 cave of open ground with a tool store in one corner.
//! let mut cells = vec![Cell::new(TileId::GROUND); 144];
//! cells[0] = cells[0].with_building(BuildingKind::ToolStore);
//! let grid = LevelGrid::new(12, 12, cells).unwrap();
//!
//! let report = validate(&grid, &ValidationContext::default());
//! assert!(report.is_playable());
//!
//! let route = find_path(&grid, Coord::new(0, 0), Coord::new(11, 11), &PathOptions::default())
//!     .unwrap();
//! assert_eq!(route.cost, 11.0);
//!
//! // The same work, off the calling thread.
//! let gateway = Gateway::new(GatewayConfig::default()).unwrap();
//! let response = gateway.call(Request::new(1u64, Query::Statistics { grid: grid.into() }));
//! assert!(response.is_success());
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `cavern-core` | Grid model, tiles, cells, coordinates |
//! | [`space`] | `cavern-space` | Chunking and viewport prioritisation |
//! | [`analysis`] | `cavern-analysis` | Reachability, paths, validation, stats, heat maps |
//! | [`engine`] | `cavern-engine` | Worker-pool request gateway |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Grid model and tile catalogue (`cavern-core`).
///
/// [`types::LevelGrid`] is the immutable input to every analysis.
pub use cavern_core as types;

/// Chunking and viewport prioritisation (`cavern-space`).
pub use cavern_space as space;

/// Synchronous analyses (`cavern-analysis`).
///
/// Every function here is pure over a borrowed grid and safe to call from
/// any thread.
pub use cavern_analysis as analysis;

/// Request gateway (`cavern-engine`).
///
/// [`engine::Gateway`] runs analyses on worker threads with id-tagged
/// responses and per-request timeouts.
pub use cavern_engine as engine;

/// Common imports for typical Cavern usage.
///
/// ```rust
/// use cavern::prelude::*;
/// ```
pub mod prelude {
    // Grid model
    pub use cavern_core::{BuildingKind, Cell, Coord, GridError, LevelGrid, TileCategory, TileId};

    // Chunking
    pub use cavern_space::{ChunkError, ChunkScheduler, Viewport};

    // Analyses
    pub use cavern_analysis::{
        compute_heat_map, compute_statistics, find_path, reachable_from, validate, HeatMapKind,
        HeatMapOptions, PathOptions, Severity, ValidationContext, ValidationReport,
    };

    // Gateway
    pub use cavern_engine::{Gateway, GatewayConfig, GatewayError, Query, Request, Response};
}
