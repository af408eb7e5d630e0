//! User-facing [`Gateway`] API and shutdown sequence.
//!
//! # Architecture
//!
//! ```text
//! Caller Thread(s)                               Workers (N)
//!     |                                              |
//!     |--submit()------------------------------->    |
//!     |   register id -> ticket                 task_rx.recv()
//!     |   [task_tx: bounded(N*depth)]           check ticket still live
//!     |                                         cache lookup / execute
//!     |   PendingResponse::wait()               release ticket
//!     |   blocks on reply_rx until deadline     reply_tx.send(result)
//!     |<--result via reply_tx---------------------   |
//! ```
//!
//! A caller that reaches its deadline releases the ticket itself, so the
//! worker finds it gone and discards the late result.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{RecvTimeoutError, Sender, TrySendError};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::GatewayConfig;
use crate::error::{ConfigError, GatewayError};
use crate::metrics::{Counter, GatewayMetrics};
use crate::request::{Request, RequestId, Response};
use crate::worker::{worker_loop, Reply, Shared, Task};

// ── ShutdownReport ───────────────────────────────────────────────

/// Report from [`Gateway::shutdown`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShutdownReport {
    /// Wall time spent shutting down.
    pub total_ms: u64,
    /// Worker threads joined cleanly.
    pub workers_joined: usize,
    /// Requests still registered when shutdown began.
    pub abandoned: usize,
}

// ── Gateway ──────────────────────────────────────────────────────

/// Runs analyses on a worker pool with per-request timeouts.
///
/// `Gateway` is `Sync`: any number of threads may submit through a
/// shared reference. Dropping it shuts the pool down.
pub struct Gateway {
    task_tx: Option<Sender<Task>>,
    workers: Vec<JoinHandle<()>>,
    shared: Arc<Shared>,
    config: GatewayConfig,
}

impl Gateway {
    /// Validate `config` and spawn the workers.
    pub fn new(config: GatewayConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let worker_count = config.resolved_worker_count();
        let shared = Arc::new(Shared::new(config.cache_capacity));
        let (task_tx, task_rx) = crossbeam_channel::bounded(config.queue_capacity());

        let mut gateway = Self {
            task_tx: Some(task_tx),
            workers: Vec::with_capacity(worker_count),
            shared,
            config,
        };
        for i in 0..worker_count {
            let task_rx = task_rx.clone();
            let shared = Arc::clone(&gateway.shared);
            // On error `gateway` drops here and joins the workers already spawned.
            let handle = thread::Builder::new()
                .name(format!("cavern-worker-{i}"))
                .spawn(move || worker_loop(task_rx, shared))?;
            gateway.workers.push(handle);
        }

        info!(
            workers = worker_count,
            timeout_ms = gateway.config.request_timeout.as_millis() as u64,
            queue = gateway.config.queue_capacity(),
            "gateway started"
        );
        Ok(gateway)
    }

    /// Active configuration.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Number of live worker threads.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Enqueue `request` without waiting for it.
    ///
    /// Fails immediately when the id is already in flight, the queue is
    /// full, or the gateway is shutting down.
    pub fn submit(&self, request: Request) -> Result<PendingResponse, GatewayError> {
        let task_tx = match &self.task_tx {
            Some(tx) if !self.shared.is_shutting_down() => tx,
            _ => return Err(GatewayError::ShuttingDown),
        };
        let Request { id, query } = request;
        let ticket = self.shared.register(&id)?;
        let kind = query.kind();

        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        let task = Task {
            id: id.clone(),
            ticket,
            query,
            enqueued: Instant::now(),
            reply: reply_tx,
        };
        if let Err(e) = task_tx.try_send(task) {
            self.shared.release(&id, ticket);
            return Err(match e {
                TrySendError::Full(_) => {
                    self.shared.metrics.record(Counter::Rejected);
                    GatewayError::QueueFull
                }
                TrySendError::Disconnected(_) => GatewayError::ShuttingDown,
            });
        }
        self.shared.metrics.record(Counter::Submitted);
        debug!(%id, kind, "request dispatched");

        let timeout = self.config.request_timeout;
        Ok(PendingResponse {
            id,
            ticket,
            deadline: Instant::now() + timeout,
            timeout,
            reply_rx,
            shared: Arc::clone(&self.shared),
            settled: false,
        })
    }

    /// Submit `request` and wait for its response.
    ///
    /// Always answers: submission failures become error responses with
    /// the request's id.
    pub fn call(&self, request: Request) -> Response {
        let id = request.id.clone();
        match self.submit(request) {
            Ok(pending) => pending.wait(),
            Err(e) => Response::failure(id, e),
        }
    }

    /// Decode a JSON request, run it, and encode the response.
    pub fn call_json(&self, input: &str) -> String {
        let response = match Request::from_json(input) {
            Ok(request) => self.call(request),
            Err(response) => *response,
        };
        response.to_json().unwrap_or_else(|e| {
            let fallback = Response {
                id: response.id.clone(),
                result: Err(GatewayError::Decode(format!("unserializable result: {e}"))),
            };
            // Error responses hold only strings and always serialize.
            fallback.to_json().unwrap_or_default()
        })
    }

    /// Stop waiting for `id`.
    ///
    /// A queued task is skipped; a running one finishes and its result is
    /// discarded. The waiting caller gets a `cancelled` error once the
    /// worker lets go of the task. Returns false when `id` is not in
    /// flight.
    pub fn cancel(&self, id: &RequestId) -> bool {
        let cancelled = self.shared.cancel(id);
        if cancelled {
            self.shared.metrics.record(Counter::Cancelled);
            debug!(%id, "request cancelled");
        }
        cancelled
    }

    /// Requests currently registered.
    pub fn in_flight(&self) -> usize {
        self.shared.in_flight()
    }

    /// Counter snapshot.
    pub fn metrics(&self) -> GatewayMetrics {
        self.shared.metrics.snapshot()
    }

    /// Number of cached results.
    pub fn cached_results(&self) -> usize {
        self.shared.cached_results()
    }

    /// Drop every cached result.
    pub fn clear_cache(&self) {
        self.shared.clear_cache();
    }

    /// Whether [`shutdown`](Self::shutdown) has run.
    pub fn is_shut_down(&self) -> bool {
        self.task_tx.is_none()
    }

    /// Stop accepting requests, skip queued ones, and join the workers.
    ///
    /// Running computations finish first; their results are discarded.
    /// Idempotent: later calls return an empty report.
    pub fn shutdown(&mut self) -> ShutdownReport {
        if self.task_tx.is_none() {
            return ShutdownReport::default();
        }
        let start = Instant::now();
        let abandoned = self.shared.in_flight();

        self.shared.begin_shutdown();
        // Dropping the sender ends each worker's recv loop once drained.
        self.task_tx.take();

        let mut workers_joined = 0;
        for handle in self.workers.drain(..) {
            if handle.join().is_ok() {
                workers_joined += 1;
            }
        }

        let report = ShutdownReport {
            total_ms: start.elapsed().as_millis() as u64,
            workers_joined,
            abandoned,
        };
        info!(
            workers_joined,
            abandoned,
            total_ms = report.total_ms,
            "gateway shut down"
        );
        report
    }
}

impl Drop for Gateway {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("workers", &self.workers.len())
            .field("config", &self.config)
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}

// ── PendingResponse ──────────────────────────────────────────────

/// Handle to a submitted request.
///
/// Dropping it without waiting releases the id; the eventual result is
/// discarded.
#[derive(Debug)]
pub struct PendingResponse {
    id: RequestId,
    ticket: u64,
    deadline: Instant,
    timeout: Duration,
    reply_rx: crossbeam_channel::Receiver<Reply>,
    shared: Arc<Shared>,
    settled: bool,
}

impl PendingResponse {
    /// The request's id.
    pub fn id(&self) -> &RequestId {
        &self.id
    }

    /// Block until the result arrives or the deadline passes.
    pub fn wait(mut self) -> Response {
        self.settled = true;
        let id = self.id.clone();
        match self.reply_rx.recv_deadline(self.deadline) {
            Ok(reply) => Response { id: Some(id), result: reply },
            Err(RecvTimeoutError::Disconnected) => Response::failure(id, self.dropped_error()),
            Err(RecvTimeoutError::Timeout) => {
                if self.shared.release(&self.id, self.ticket) {
                    self.shared.metrics.record(Counter::TimedOut);
                    let timeout_ms = self.timeout.as_millis() as u64;
                    warn!(id = %self.id, timeout_ms, "request timed out");
                    return Response::failure(id, GatewayError::Timeout(self.timeout));
                }
                // The worker released first; its reply is already on the way.
                match self.reply_rx.recv() {
                    Ok(reply) => Response { id: Some(id), result: reply },
                    Err(_) => Response::failure(id, self.dropped_error()),
                }
            }
        }
    }

    fn dropped_error(&self) -> GatewayError {
        if self.shared.is_shutting_down() {
            GatewayError::ShuttingDown
        } else {
            GatewayError::Cancelled
        }
    }
}

impl Drop for PendingResponse {
    fn drop(&mut self) {
        if !self.settled {
            self.shared.release(&self.id, self.ticket);
        }
    }
}
