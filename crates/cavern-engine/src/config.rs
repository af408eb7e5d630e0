//! Gateway configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Configuration for [`Gateway`](crate::Gateway).
///
/// Controls the worker pool size, the per-request timeout, the depth of
/// the task queue that provides back-pressure, and the size of the
/// result cache.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Number of worker threads. `None` = auto-detect
    /// (`available_parallelism / 2`, clamped to `[1, 8]`).
    pub worker_count: Option<usize>,
    /// How long a caller waits for a result. Default: 30 s.
    pub request_timeout: Duration,
    /// Task queue slots per worker. Default: 4.
    pub queue_depth_per_worker: usize,
    /// Cached results kept, oldest evicted first. 0 disables caching.
    /// Default: 32.
    pub cache_capacity: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            worker_count: None,
            request_timeout: Duration::from_secs(30),
            queue_depth_per_worker: 4,
            cache_capacity: 32,
        }
    }
}

impl GatewayConfig {
    /// Resolve the actual worker count, applying auto-detection and clamping.
    pub fn resolved_worker_count(&self) -> usize {
        match self.worker_count {
            Some(n) => n.clamp(1, 64),
            None => {
                let cpus = std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(2);
                (cpus / 2).clamp(1, 8)
            }
        }
    }

    /// Bounded task queue capacity: workers x depth.
    pub fn queue_capacity(&self) -> usize {
        self.resolved_worker_count() * self.queue_depth_per_worker
    }

    /// Check invariants the gateway relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.queue_depth_per_worker == 0 {
            return Err(ConfigError::ZeroQueueDepth);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = GatewayConfig::default();
        assert_eq!(cfg.request_timeout, Duration::from_secs(30));
        assert_eq!(cfg.queue_depth_per_worker, 4);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn resolved_worker_count_clamps_zero() {
        let cfg = GatewayConfig {
            worker_count: Some(0),
            ..GatewayConfig::default()
        };
        assert_eq!(cfg.resolved_worker_count(), 1);
    }

    #[test]
    fn resolved_worker_count_clamps_large() {
        let cfg = GatewayConfig {
            worker_count: Some(200),
            ..GatewayConfig::default()
        };
        assert_eq!(cfg.resolved_worker_count(), 64);
        assert_eq!(cfg.queue_capacity(), 256);
    }

    #[test]
    fn resolved_worker_count_auto() {
        let count = GatewayConfig::default().resolved_worker_count();
        assert!((1..=8).contains(&count), "auto count {count} out of [1,8]");
    }

    #[test]
    fn validate_rejects_zeroes() {
        let cfg = GatewayConfig {
            request_timeout: Duration::ZERO,
            ..GatewayConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::ZeroTimeout)));
        let cfg = GatewayConfig {
            queue_depth_per_worker: 0,
            ..GatewayConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::ZeroQueueDepth)));
    }

    proptest::proptest! {
        #[test]
        fn explicit_worker_count_stays_in_range(n in 0usize..10_000, depth in 1usize..16) {
            let cfg = GatewayConfig {
                worker_count: Some(n),
                queue_depth_per_worker: depth,
                ..GatewayConfig::default()
            };
            let workers = cfg.resolved_worker_count();
            proptest::prop_assert!((1..=64).contains(&workers));
            proptest::prop_assert_eq!(workers, n.clamp(1, 64));
            proptest::prop_assert_eq!(cfg.queue_capacity(), workers * depth);
        }
    }

    #[test]
    fn deserializes_partial_json() {
        let cfg: GatewayConfig =
            serde_json::from_str(r#"{"workerCount": 3, "requestTimeout": {"secs": 2, "nanos": 0}}"#)
                .unwrap();
        assert_eq!(cfg.worker_count, Some(3));
        assert_eq!(cfg.request_timeout, Duration::from_secs(2));
        assert_eq!(cfg.cache_capacity, 32);
    }
}
