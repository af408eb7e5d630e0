//! Error types for chunk partitioning.

use cavern_core::GridError;
use thiserror::Error;

/// Errors arising from chunk construction.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ChunkError {
    /// A chunk size of zero cannot partition anything.
    #[error("chunk size must be at least 1")]
    ZeroChunkSize,
    /// The grid itself is unusable (malformed cell array).
    #[error(transparent)]
    Grid(#[from] GridError),
}
