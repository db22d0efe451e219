//! # Client configuration.
//!
//! Provides [`Config`] centralized settings for both dispatch engines.
//!
//! Config is read once, at construction:
//! 1. **Client creation**: `Client::builder(config, backend)`
//! 2. **Engine creation**: `EventsWorker::new(&config, backend, logger)`
//!
//! ## Sentinel values
//! - `events_timeout = 0s` → no periodic flush (size threshold and explicit flushes only)
//! - `events_drop_log_interval = 0s` → no periodic drop summary (summary still logged on shutdown)
//! - `metrics_interval = 0s` → metrics collection disabled (`Client::increment` is a no-op)
//! - `events_batch_size`, `events_max_queue_size`, `notice_queue_capacity` are clamped to at least 1

use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Configuration for the notice dispatcher and the events engine.
///
/// ## Field semantics
/// - `events_batch_size`: Records per batch; reaching it triggers an immediate send
/// - `events_timeout`: Periodic flush interval (`0s` = disabled)
/// - `events_max_queue_size`: Records admitted before the oldest are dropped
/// - `events_max_retries`: Retries per batch before it is dropped
/// - `events_throttle_wait`: Cooldown after a rate-limit signal
/// - `events_drop_log_interval`: Drop summary period (`0s` = disabled)
/// - `metrics_interval`: Counter report period (`0s` = metrics disabled)
/// - `token`: Parent cancellation signal for the events engine
///
/// ## Notes
/// All fields are public for flexibility. Prefer using helper accessors to avoid
/// sprinkling sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Environment name attached to every notice (`production`, `staging`, ...).
    pub environment: Option<String>,

    /// Capacity of the notice dispatcher queue.
    ///
    /// When the queue is full, the newest notice is rejected with
    /// `DispatchError::Full`. Minimum value is 1.
    pub notice_queue_capacity: usize,

    /// Number of buffered records that triggers an immediate batch send.
    pub events_batch_size: usize,

    /// Interval of the periodic flush timer.
    ///
    /// - `Duration::ZERO` = no periodic flush
    /// - `> 0` = buffered records are sent at least this often
    pub events_timeout: Duration,

    /// Maximum number of records held by the engine (ring buffer plus pending batches).
    ///
    /// Once reached, every new record evicts the oldest buffered one.
    /// Also sizes the inbound submission channel.
    pub events_max_queue_size: usize,

    /// Number of retries granted to a failing batch.
    ///
    /// A batch is attempted at most `events_max_retries + 1` times, then dropped.
    pub events_max_retries: u32,

    /// Cooldown applied after the backend signals a rate limit.
    pub events_throttle_wait: Duration,

    /// Interval of the periodic drop summary.
    ///
    /// - `Duration::ZERO` = disabled
    pub events_drop_log_interval: Duration,

    /// Interval at which aggregated counters are reported.
    ///
    /// - `Duration::ZERO` = no metric collector is started
    pub metrics_interval: Duration,

    /// Parent cancellation signal.
    ///
    /// Cancelling it shuts the events engine down exactly like `stop()`:
    /// one final attempt cycle, then a drop summary.
    pub token: CancellationToken,
}

impl Config {
    /// Returns the batch size clamped to a minimum of 1.
    #[inline]
    pub fn batch_size(&self) -> usize {
        self.events_batch_size.max(1)
    }

    /// Returns the maximum queue size clamped to a minimum of 1.
    #[inline]
    pub fn max_queue_size(&self) -> usize {
        self.events_max_queue_size.max(1)
    }

    /// Returns the notice queue capacity clamped to a minimum of 1.
    #[inline]
    pub fn notice_queue_capacity(&self) -> usize {
        self.notice_queue_capacity.max(1)
    }

    /// Returns the periodic flush interval as an `Option`.
    ///
    /// - `None` → no periodic flush
    /// - `Some(d)` → flush at least every `d`
    #[inline]
    pub fn flush_interval(&self) -> Option<Duration> {
        if self.events_timeout == Duration::ZERO {
            None
        } else {
            Some(self.events_timeout)
        }
    }

    /// Returns the metrics report interval, `None` when metrics are disabled.
    #[inline]
    pub fn metrics_report_interval(&self) -> Option<Duration> {
        if self.metrics_interval == Duration::ZERO {
            None
        } else {
            Some(self.metrics_interval)
        }
    }

    /// Returns the drop summary interval as an `Option`.
    #[inline]
    pub fn drop_log_interval(&self) -> Option<Duration> {
        if self.events_drop_log_interval == Duration::ZERO {
            None
        } else {
            Some(self.events_drop_log_interval)
        }
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `notice_queue_capacity = 100`
    /// - `events_batch_size = 1000`
    /// - `events_timeout = 30s`
    /// - `events_max_queue_size = 100_000`
    /// - `events_max_retries = 3`
    /// - `events_throttle_wait = 60s`
    /// - `events_drop_log_interval = 60s`
    /// - `metrics_interval = 60s`
    /// - `token` = a fresh, never-cancelled token
    fn default() -> Self {
        Self {
            environment: None,
            notice_queue_capacity: 100,
            events_batch_size: 1000,
            events_timeout: Duration::from_secs(30),
            events_max_queue_size: 100_000,
            events_max_retries: 3,
            events_throttle_wait: Duration::from_secs(60),
            events_drop_log_interval: Duration::from_secs(60),
            metrics_interval: Duration::from_secs(60),
            token: CancellationToken::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_sizes_are_clamped() {
        let cfg = Config {
            events_batch_size: 0,
            events_max_queue_size: 0,
            notice_queue_capacity: 0,
            ..Config::default()
        };
        assert_eq!(cfg.batch_size(), 1);
        assert_eq!(cfg.max_queue_size(), 1);
        assert_eq!(cfg.notice_queue_capacity(), 1);
    }

    #[test]
    fn test_zero_intervals_disable_timers() {
        let cfg = Config {
            events_timeout: Duration::ZERO,
            events_drop_log_interval: Duration::ZERO,
            metrics_interval: Duration::ZERO,
            ..Config::default()
        };
        assert_eq!(cfg.flush_interval(), None);
        assert_eq!(cfg.drop_log_interval(), None);
        assert_eq!(cfg.metrics_report_interval(), None);
    }

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.batch_size(), 1000);
        assert_eq!(cfg.max_queue_size(), 100_000);
        assert_eq!(cfg.events_max_retries, 3);
        assert_eq!(cfg.flush_interval(), Some(Duration::from_secs(30)));
        assert_eq!(cfg.drop_log_interval(), Some(Duration::from_secs(60)));
        assert_eq!(cfg.metrics_report_interval(), Some(Duration::from_secs(60)));
        assert!(!cfg.token.is_cancelled());
    }
}
