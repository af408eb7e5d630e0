//! Spatial partitioning for Cavern level grids.
//!
//! Splits a [`LevelGrid`](cavern_core::LevelGrid) into fixed-size
//! rectangular [`Chunk`]s and orders them by distance to a [`Viewport`] so
//! a progressive consumer renders visible content first. Pure geometry:
//! nothing here analyses the cells it copies.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod chunk;
pub mod error;
pub mod region;

pub use chunk::{build_chunks, prioritize, Chunk, ChunkScheduler};
pub use error::ChunkError;
pub use region::{Rect, Viewport};
