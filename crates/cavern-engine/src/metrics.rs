//! Gateway counters.
//!
//! Workers and callers bump lock-free counters as requests move through
//! the gateway; [`GatewayMetrics`] is a point-in-time copy of them for
//! telemetry and tests.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Snapshot of cumulative gateway counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayMetrics {
    /// Requests accepted onto the queue.
    pub submitted: u64,
    /// Requests rejected because the queue was full.
    pub rejected: u64,
    /// Computations that produced a result.
    pub completed: u64,
    /// Computations that produced an error, panics included.
    pub failed: u64,
    /// Waits that hit the timeout.
    pub timed_out: u64,
    /// Requests cancelled by the caller.
    pub cancelled: u64,
    /// Results computed after their caller had stopped waiting.
    pub late_discarded: u64,
    /// Results served from the cache.
    pub cache_hits: u64,
    /// Cacheable queries that had to be computed.
    pub cache_misses: u64,
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum Counter {
    Submitted,
    Rejected,
    Completed,
    Failed,
    TimedOut,
    Cancelled,
    LateDiscarded,
    CacheHit,
    CacheMiss,
}

/// Live counters shared by the gateway and its workers.
#[derive(Debug, Default)]
pub(crate) struct MetricsCounters {
    submitted: AtomicU64,
    rejected: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    timed_out: AtomicU64,
    cancelled: AtomicU64,
    late_discarded: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
}

impl MetricsCounters {
    fn counter(&self, counter: Counter) -> &AtomicU64 {
        match counter {
            Counter::Submitted => &self.submitted,
            Counter::Rejected => &self.rejected,
            Counter::Completed => &self.completed,
            Counter::Failed => &self.failed,
            Counter::TimedOut => &self.timed_out,
            Counter::Cancelled => &self.cancelled,
            Counter::LateDiscarded => &self.late_discarded,
            Counter::CacheHit => &self.cache_hits,
            Counter::CacheMiss => &self.cache_misses,
        }
    }

    pub(crate) fn record(&self, counter: Counter) {
        self.counter(counter).fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> GatewayMetrics {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        GatewayMetrics {
            submitted: load(&self.submitted),
            rejected: load(&self.rejected),
            completed: load(&self.completed),
            failed: load(&self.failed),
            timed_out: load(&self.timed_out),
            cancelled: load(&self.cancelled),
            late_discarded: load(&self.late_discarded),
            cache_hits: load(&self.cache_hits),
            cache_misses: load(&self.cache_misses),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        assert_eq!(MetricsCounters::default().snapshot(), GatewayMetrics::default());
    }

    #[test]
    fn record_bumps_one_counter() {
        let counters = MetricsCounters::default();
        counters.record(Counter::CacheHit);
        counters.record(Counter::CacheHit);
        counters.record(Counter::TimedOut);
        let m = counters.snapshot();
        assert_eq!(m.cache_hits, 2);
        assert_eq!(m.timed_out, 1);
        assert_eq!(m.submitted, 0);
    }
}
