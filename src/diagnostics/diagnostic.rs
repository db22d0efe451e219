//! # Operational diagnostics emitted by the dispatch engines.
//!
//! The [`DiagnosticKind`] enum classifies diagnostics across three categories:
//! - **Dispatcher**: work item failures, panics, and queue overflow
//! - **Delivery**: send failures, dropped batches, and throttling
//! - **Backpressure**: periodic summaries of records dropped under load
//!
//! The [`Diagnostic`] struct carries the metadata for each kind (counts, capacities,
//! attempt numbers, delays, and a free-form reason).
//!
//! ## Ordering guarantees
//! Each diagnostic has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use faultline::{Diagnostic, DiagnosticKind};
//!
//! let d = Diagnostic::events_dropped(2, 3, 3);
//! assert_eq!(d.kind, DiagnosticKind::EventsDropped);
//! assert_eq!(d.count, Some(2));
//! assert_eq!(
//!     d.to_string(),
//!     "events worker dropped 2 events due to full queue (capacity: 3, current size: 3)",
//! );
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for diagnostic ordering.
static DIAGNOSTIC_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    // === Dispatcher ===
    /// A work item returned an error.
    ///
    /// Sets:
    /// - `reason`: error message
    WorkFailed,

    /// A work item panicked; the dispatcher kept running.
    ///
    /// Sets:
    /// - `reason`: panic message
    WorkPanicked,

    /// A notice was rejected because the dispatcher queue was full or closed.
    ///
    /// Sets:
    /// - `reason`: `"full"` or `"closed"`
    NoticeOverflow,

    /// A metrics report was rejected because the dispatcher queue was full or closed.
    ///
    /// Sets:
    /// - `count`: number of counters in the lost report
    /// - `reason`: `"full"` or `"closed"`
    MetricsOverflow,

    // === Delivery ===
    /// Records were dropped since the last summary (full queue).
    ///
    /// Sets:
    /// - `count`: records dropped
    /// - `capacity`: configured maximum queue size
    /// - `size`: records currently held
    EventsDropped,

    /// A batch exhausted its retries and was discarded.
    ///
    /// Sets:
    /// - `attempts`: failed attempts
    /// - `count`: records in the batch
    BatchDropped,

    /// The backend failed to accept a batch; it will be retried.
    ///
    /// Sets:
    /// - `attempts`: failed attempts so far
    /// - `reason`: backend error
    SendFailed,

    /// The backend signalled a rate limit; sends are suspended.
    ///
    /// Sets:
    /// - `delay_ms`: cooldown length
    Throttled,

    /// The cooldown elapsed; sends resume.
    ThrottleExpired,
}

impl DiagnosticKind {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            DiagnosticKind::WorkFailed => "work_failed",
            DiagnosticKind::WorkPanicked => "work_panicked",
            DiagnosticKind::NoticeOverflow => "notice_overflow",
            DiagnosticKind::MetricsOverflow => "metrics_overflow",
            DiagnosticKind::EventsDropped => "events_dropped",
            DiagnosticKind::BatchDropped => "batch_dropped",
            DiagnosticKind::SendFailed => "send_failed",
            DiagnosticKind::Throttled => "throttled",
            DiagnosticKind::ThrottleExpired => "throttle_expired",
        }
    }
}

/// Diagnostic with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`DiagnosticKind`]
#[derive(Clone, Debug)]
pub struct Diagnostic {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Diagnostic classification.
    pub kind: DiagnosticKind,

    /// Number of records concerned (dropped records, batch length).
    pub count: Option<u64>,
    /// Configured capacity at the time of the diagnostic.
    pub capacity: Option<u64>,
    /// Current occupancy at the time of the diagnostic.
    pub size: Option<u64>,
    /// Attempt count of the batch concerned.
    pub attempts: Option<u32>,
    /// Cooldown in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Human-readable reason (errors, panic payloads, overflow details).
    pub reason: Option<Arc<str>>,
}

impl Diagnostic {
    /// Creates a new diagnostic of the given kind with current timestamp and next sequence number.
    pub fn new(kind: DiagnosticKind) -> Self {
        Self {
            seq: DIAGNOSTIC_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            count: None,
            capacity: None,
            size: None,
            attempts: None,
            delay_ms: None,
            reason: None,
        }
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a record count.
    #[inline]
    pub fn with_count(mut self, n: u64) -> Self {
        self.count = Some(n);
        self
    }

    /// Attaches the configured capacity and the current occupancy.
    #[inline]
    pub fn with_occupancy(mut self, capacity: u64, size: u64) -> Self {
        self.capacity = Some(capacity);
        self.size = Some(size);
        self
    }

    /// Attaches an attempt count.
    #[inline]
    pub fn with_attempts(mut self, n: u32) -> Self {
        self.attempts = Some(n);
        self
    }

    /// Attaches a delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Creates a work failure diagnostic.
    #[inline]
    pub fn work_failed(error: &anyhow::Error) -> Self {
        Diagnostic::new(DiagnosticKind::WorkFailed).with_reason(format!("{error:#}"))
    }

    /// Creates a work panic diagnostic.
    #[inline]
    pub fn work_panicked(info: String) -> Self {
        Diagnostic::new(DiagnosticKind::WorkPanicked).with_reason(info)
    }

    /// Creates a notice overflow diagnostic.
    #[inline]
    pub fn notice_overflow(reason: &'static str) -> Self {
        Diagnostic::new(DiagnosticKind::NoticeOverflow).with_reason(reason)
    }

    /// Creates a metrics overflow diagnostic.
    #[inline]
    pub fn metrics_overflow(reason: &'static str, counters: usize) -> Self {
        Diagnostic::new(DiagnosticKind::MetricsOverflow)
            .with_count(counters as u64)
            .with_reason(reason)
    }

    /// Creates a drop summary diagnostic.
    #[inline]
    pub fn events_dropped(dropped: u64, capacity: usize, size: usize) -> Self {
        Diagnostic::new(DiagnosticKind::EventsDropped)
            .with_count(dropped)
            .with_occupancy(capacity as u64, size as u64)
    }

    /// Creates a batch drop diagnostic.
    #[inline]
    pub fn batch_dropped(attempts: u32, records: usize) -> Self {
        Diagnostic::new(DiagnosticKind::BatchDropped)
            .with_attempts(attempts)
            .with_count(records as u64)
    }

    /// Creates a send failure diagnostic.
    #[inline]
    pub fn send_failed(attempts: u32, error: impl fmt::Display) -> Self {
        Diagnostic::new(DiagnosticKind::SendFailed)
            .with_attempts(attempts)
            .with_reason(error.to_string())
    }

    /// Creates a throttle diagnostic.
    #[inline]
    pub fn throttled(wait: Duration) -> Self {
        Diagnostic::new(DiagnosticKind::Throttled).with_delay(wait)
    }

    /// Creates a throttle expiry diagnostic.
    #[inline]
    pub fn throttle_expired() -> Self {
        Diagnostic::new(DiagnosticKind::ThrottleExpired)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = self.reason.as_deref().unwrap_or("unknown");
        match self.kind {
            DiagnosticKind::WorkFailed => write!(f, "worker processing error: {reason}"),
            DiagnosticKind::WorkPanicked => write!(f, "worker recovered from panic: {reason}"),
            DiagnosticKind::NoticeOverflow => {
                write!(f, "notice dropped: dispatch queue {reason}")
            }
            DiagnosticKind::MetricsOverflow => write!(
                f,
                "metrics report of {} counters dropped: dispatch queue {reason}",
                self.count.unwrap_or(0),
            ),
            DiagnosticKind::EventsDropped => write!(
                f,
                "events worker dropped {} events due to full queue (capacity: {}, current size: {})",
                self.count.unwrap_or(0),
                self.capacity.unwrap_or(0),
                self.size.unwrap_or(0),
            ),
            DiagnosticKind::BatchDropped => write!(
                f,
                "events worker dropping batch of {} events after {} failed attempts",
                self.count.unwrap_or(0),
                self.attempts.unwrap_or(0),
            ),
            DiagnosticKind::SendFailed => write!(
                f,
                "events worker send error (attempt {}): {reason}",
                self.attempts.unwrap_or(0),
            ),
            DiagnosticKind::Throttled => write!(
                f,
                "events worker received rate limit; throttling for {:?}",
                Duration::from_millis(u64::from(self.delay_ms.unwrap_or(0))),
            ),
            DiagnosticKind::ThrottleExpired => {
                write!(f, "events worker throttle window expired; resuming sends")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_is_monotonic() {
        let a = Diagnostic::throttle_expired();
        let b = Diagnostic::throttle_expired();
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_batch_dropped_message() {
        let d = Diagnostic::batch_dropped(4, 10);
        assert_eq!(d.attempts, Some(4));
        assert_eq!(
            d.to_string(),
            "events worker dropping batch of 10 events after 4 failed attempts"
        );
    }

    #[test]
    fn test_throttled_message_uses_delay() {
        let d = Diagnostic::throttled(Duration::from_secs(60));
        assert_eq!(d.delay_ms, Some(60_000));
        assert_eq!(
            d.to_string(),
            "events worker received rate limit; throttling for 60s"
        );
    }

    #[test]
    fn test_metrics_overflow_message() {
        let d = Diagnostic::metrics_overflow("closed", 3);
        assert_eq!(d.kind.as_label(), "metrics_overflow");
        assert_eq!(
            d.to_string(),
            "metrics report of 3 counters dropped: dispatch queue closed"
        );
    }

    #[test]
    fn test_work_failed_keeps_context_chain() {
        let err = anyhow::anyhow!("connection reset").context("notify failed");
        let d = Diagnostic::work_failed(&err);
        assert_eq!(d.reason.as_deref(), Some("notify failed: connection reset"));
    }
}
