//! Worker pool for gateway requests.
//!
//! Each worker receives [`Task`]s via a crossbeam channel, checks that
//! the task is still wanted, runs the query (consulting the result cache
//! first), and sends the result back via the task's bounded(1) reply
//! channel.
//!
//! A request id is registered under a fresh ticket when it is submitted.
//! The worker only replies if it can release that exact registration.
//! When the caller has already timed out or cancelled, the registration
//! is gone and the result is dropped; a later request reusing the same id
//! holds a different ticket and can never receive it.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, trace, warn};

use crate::cache::{CacheKey, ResultCache};
use crate::error::GatewayError;
use crate::metrics::{Counter, MetricsCounters};
use crate::request::{AnalysisResult, Query, RequestId};

/// What a worker sends back.
pub(crate) type Reply = Result<Arc<AnalysisResult>, GatewayError>;

/// A request dispatched to a worker.
pub(crate) struct Task {
    pub(crate) id: RequestId,
    pub(crate) ticket: u64,
    pub(crate) query: Query,
    pub(crate) enqueued: Instant,
    pub(crate) reply: Sender<Reply>,
}

/// State shared by the gateway handle, pending responses and workers.
#[derive(Debug)]
pub(crate) struct Shared {
    inflight: Mutex<HashMap<RequestId, u64>>,
    next_ticket: AtomicU64,
    shutting_down: AtomicBool,
    cache: Mutex<ResultCache>,
    pub(crate) metrics: MetricsCounters,
}

impl Shared {
    pub(crate) fn new(cache_capacity: usize) -> Self {
        Self {
            inflight: Mutex::new(HashMap::new()),
            next_ticket: AtomicU64::new(0),
            shutting_down: AtomicBool::new(false),
            cache: Mutex::new(ResultCache::new(cache_capacity)),
            metrics: MetricsCounters::default(),
        }
    }

    // A panic while holding either lock cannot leave the map or cache
    // half-updated, so poisoning is ignored.
    fn inflight(&self) -> MutexGuard<'_, HashMap<RequestId, u64>> {
        self.inflight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cache(&self) -> MutexGuard<'_, ResultCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claim `id` for a new request.
    pub(crate) fn register(&self, id: &RequestId) -> Result<u64, GatewayError> {
        let mut inflight = self.inflight();
        if inflight.contains_key(id) {
            return Err(GatewayError::DuplicateRequestId(id.clone()));
        }
        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        inflight.insert(id.clone(), ticket);
        Ok(ticket)
    }

    /// Drop the registration if it still belongs to `ticket`.
    pub(crate) fn release(&self, id: &RequestId, ticket: u64) -> bool {
        let mut inflight = self.inflight();
        if inflight.get(id) == Some(&ticket) {
            inflight.remove(id);
            true
        } else {
            false
        }
    }

    fn is_live(&self, id: &RequestId, ticket: u64) -> bool {
        self.inflight().get(id) == Some(&ticket)
    }

    /// Forget `id` regardless of ticket.
    pub(crate) fn cancel(&self, id: &RequestId) -> bool {
        self.inflight().remove(id).is_some()
    }

    pub(crate) fn in_flight(&self) -> usize {
        self.inflight().len()
    }

    pub(crate) fn begin_shutdown(&self) {
        self.shutting_down.store(true, Ordering::Release);
    }

    pub(crate) fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::Acquire)
    }

    pub(crate) fn cached_results(&self) -> usize {
        self.cache().len()
    }

    pub(crate) fn clear_cache(&self) {
        self.cache().clear();
    }

    fn cached(&self, key: &CacheKey) -> Option<Arc<AnalysisResult>> {
        self.cache().get(key)
    }

    fn store(&self, key: CacheKey, value: Arc<AnalysisResult>) {
        self.cache().insert(key, value);
    }
}

/// Main loop for a worker thread.
///
/// Runs until the task channel is closed (sender dropped). Each
/// iteration: recv task → check liveness → execute → release → reply.
pub(crate) fn worker_loop(task_rx: Receiver<Task>, shared: Arc<Shared>) {
    while let Ok(task) = task_rx.recv() {
        // Dropping the task drops its reply sender, which wakes the caller.
        if shared.is_shutting_down() || !shared.is_live(&task.id, task.ticket) {
            trace!(id = %task.id, "skipping abandoned request");
            continue;
        }

        let kind = task.query.kind();
        let queued_us = task.enqueued.elapsed().as_micros() as u64;
        let started = Instant::now();
        let result = guarded(|| execute(&task.query, &shared));
        let elapsed_us = started.elapsed().as_micros() as u64;

        match &result {
            Ok(_) => shared.metrics.record(Counter::Completed),
            Err(e) => {
                shared.metrics.record(Counter::Failed);
                if let GatewayError::WorkerPanicked(reason) = e {
                    warn!(id = %task.id, kind, %reason, "computation panicked");
                }
            }
        }

        // Once shutdown begins the registration is left for the caller,
        // which sees the closed reply channel as `shutting-down`.
        if !shared.is_shutting_down() && shared.release(&task.id, task.ticket) {
            debug!(
                id = %task.id,
                kind,
                queued_us,
                elapsed_us,
                ok = result.is_ok(),
                "request completed"
            );
            let _ = task.reply.send(result);
        } else {
            shared.metrics.record(Counter::LateDiscarded);
            debug!(id = %task.id, kind, elapsed_us, "discarding result for released request");
        }
    }
    // Channel closed: worker exits.
}

/// Run a query, serving and filling the result cache.
fn execute(query: &Query, shared: &Shared) -> Reply {
    let key = query.cache_key();
    if let Some(key) = &key {
        if let Some(hit) = shared.cached(key) {
            shared.metrics.record(Counter::CacheHit);
            return Ok(hit);
        }
        shared.metrics.record(Counter::CacheMiss);
    }
    let result = Arc::new(query.execute()?);
    if let Some(key) = key {
        shared.store(key, Arc::clone(&result));
    }
    Ok(result)
}

/// Turn a panic inside `f` into a per-request error.
fn guarded<F: FnOnce() -> Reply>(f: F) -> Reply {
    panic::catch_unwind(AssertUnwindSafe(f))
        .unwrap_or_else(|payload| Err(GatewayError::WorkerPanicked(panic_message(&*payload))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_owned())
}
