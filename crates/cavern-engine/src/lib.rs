//! Computation gateway for the Cavern analysis engine.
//!
//! The [`Gateway`] owns a pool of worker threads. Callers submit a
//! tagged [`Request`] and get back a [`Response`] carrying the same id,
//! either a success with the [`AnalysisResult`] or an error with a
//! stable machine-readable code. Every wait is bounded by the configured
//! timeout (30 s by default); a timed-out computation is abandoned, not
//! interrupted, and its eventual result is discarded.
//!
//! The wire form is JSON:
//!
//! ```text
//! in:  { "id", "kind", "payload" }
//! out: { "id", "kind": "success", "result" }
//!    | { "id", "kind": "error", "errorMessage", "errorCode" }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod cache;
pub mod config;
pub mod error;
pub mod gateway;
pub mod metrics;
pub mod request;
mod worker;

pub use config::GatewayConfig;
pub use error::{ConfigError, GatewayError};
pub use gateway::{Gateway, PendingResponse, ShutdownReport};
pub use metrics::GatewayMetrics;
pub use request::{AnalysisResult, Query, Request, RequestId, Response};
