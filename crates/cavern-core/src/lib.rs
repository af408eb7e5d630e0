//! Core types for the Cavern level analysis engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! immutable [`LevelGrid`] snapshot that every analysis operates on, the
//! tile catalogue that decides which cells are pathable or drillable, and
//! the [`GridError`] taxonomy for programming errors such as out-of-bounds
//! coordinates.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod building;
pub mod cell;
pub mod coord;
pub mod error;
pub mod grid;
pub mod hash;
pub mod tile;

pub use building::BuildingKind;
pub use cell::Cell;
pub use coord::Coord;
pub use error::GridError;
pub use grid::{LevelGrid, Neighbours};
pub use tile::{TileCategory, TileId, TileKind, REINFORCED_OFFSET};
