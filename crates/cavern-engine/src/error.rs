//! Gateway error types.

use std::time::Duration;

use cavern_core::GridError;
use cavern_space::ChunkError;
use thiserror::Error;

use crate::request::RequestId;

/// Errors from gateway construction.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `request_timeout` is zero.
    #[error("request timeout must be non-zero")]
    ZeroTimeout,
    /// `queue_depth_per_worker` is zero.
    #[error("queue depth per worker must be at least 1")]
    ZeroQueueDepth,
    /// The OS refused to spawn a worker thread.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Per-request failure.
///
/// A failure never affects other requests. [`code`](Self::code) gives the
/// stable identifier sent on the wire as `errorCode`.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// No result within the configured timeout. The computation was
    /// abandoned, not interrupted.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    /// The query referenced coordinates or a grid the analysis rejected.
    #[error(transparent)]
    Grid(#[from] GridError),
    /// Chunk partitioning rejected its arguments.
    #[error(transparent)]
    Chunk(#[from] ChunkError),
    /// The gateway is shutting down or already stopped.
    #[error("gateway is shutting down")]
    ShuttingDown,
    /// Every queue slot is taken.
    #[error("request queue is full")]
    QueueFull,
    /// Another request with this id is still in flight.
    #[error("request id {0} is already in flight")]
    DuplicateRequestId(RequestId),
    /// The computation panicked.
    #[error("worker panicked: {0}")]
    WorkerPanicked(String),
    /// The request was cancelled before a result arrived.
    #[error("request was cancelled")]
    Cancelled,
    /// The request could not be decoded.
    #[error("invalid request: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Timeout(_) => "timeout",
            Self::Grid(e) | Self::Chunk(ChunkError::Grid(e)) => grid_code(e),
            Self::Chunk(ChunkError::ZeroChunkSize) => "invalid-chunk-size",
            Self::ShuttingDown => "shutting-down",
            Self::QueueFull => "queue-full",
            Self::DuplicateRequestId(_) => "duplicate-id",
            Self::WorkerPanicked(_) => "worker-panicked",
            Self::Cancelled => "cancelled",
            Self::Decode(_) => "decode",
        }
    }
}

fn grid_code(e: &GridError) -> &'static str {
    match e {
        GridError::OutOfBounds { .. } => "out-of-bounds",
        GridError::DimensionMismatch { .. } => "malformed-grid",
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cavern_core::Coord;

    #[test]
    fn codes_are_stable() {
        let oob = GridError::OutOfBounds {
            coord: Coord::new(9, 9),
            width: 4,
            height: 4,
        };
        assert_eq!(GatewayError::Grid(oob.clone()).code(), "out-of-bounds");
        assert_eq!(GatewayError::Chunk(ChunkError::Grid(oob)).code(), "out-of-bounds");
        assert_eq!(
            GatewayError::Chunk(ChunkError::ZeroChunkSize).code(),
            "invalid-chunk-size"
        );
        assert_eq!(GatewayError::Timeout(Duration::from_secs(30)).code(), "timeout");
        assert_eq!(GatewayError::QueueFull.code(), "queue-full");
    }

    #[test]
    fn transparent_messages() {
        let e = GatewayError::from(ChunkError::ZeroChunkSize);
        assert_eq!(e.to_string(), "chunk size must be at least 1");
    }
}
