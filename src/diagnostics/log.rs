//! # LogWriter: diagnostics through `tracing`
//!
//! The default [`Logger`]: forwards every [`Diagnostic`] to the `tracing` macros
//! with structured fields. Install any `tracing` subscriber to see the output.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! WARN faultline: events worker send error (attempt 1): transport error: connection refused kind="send_failed" attempts=1
//! WARN faultline: events worker received rate limit; throttling for 60s kind="throttled" delay_ms=60000
//! INFO faultline: events worker throttle window expired; resuming sends kind="throttle_expired"
//! WARN faultline: events worker dropped 12 events due to full queue (capacity: 100000, current size: 100000) kind="events_dropped" count=12
//! ERROR faultline: worker recovered from panic: boom kind="work_panicked"
//! ```

use tracing::{error, info, warn};

use crate::diagnostics::{Diagnostic, DiagnosticKind, Logger};

/// Diagnostic writer backed by `tracing`.
#[derive(Default, Debug, Clone, Copy)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Logger for LogWriter {
    fn log(&self, d: &Diagnostic) {
        let kind = d.kind.as_label();
        match d.kind {
            DiagnosticKind::WorkPanicked => {
                error!(target: "faultline", kind, seq = d.seq, "{d}");
            }
            DiagnosticKind::WorkFailed | DiagnosticKind::NoticeOverflow => {
                warn!(target: "faultline", kind, seq = d.seq, "{d}");
            }
            DiagnosticKind::MetricsOverflow => {
                warn!(target: "faultline", kind, count = d.count, "{d}");
            }
            DiagnosticKind::EventsDropped => {
                warn!(
                    target: "faultline",
                    kind,
                    count = d.count,
                    capacity = d.capacity,
                    size = d.size,
                    "{d}"
                );
            }
            DiagnosticKind::BatchDropped | DiagnosticKind::SendFailed => {
                warn!(target: "faultline", kind, attempts = d.attempts, count = d.count, "{d}");
            }
            DiagnosticKind::Throttled => {
                warn!(target: "faultline", kind, delay_ms = d.delay_ms, "{d}");
            }
            DiagnosticKind::ThrottleExpired => {
                info!(target: "faultline", kind, "{d}");
            }
        }
    }
}
