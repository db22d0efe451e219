//! Error types used by the dispatch engines and backends.
//!
//! This module defines two main error enums:
//!
//! - [`DispatchError`]: errors raised when submitting work to the [`BufferedWorker`](crate::BufferedWorker).
//! - [`BackendError`]: errors raised by a [`Backend`](crate::Backend) while delivering a payload.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging, and
//! [`BackendError::is_rate_limit`] separates throttling signals from ordinary failures.

use thiserror::Error;

/// # Errors produced when submitting a work item.
///
/// Overflow is never fatal: the rejected item is simply dropped and the caller
/// decides whether to log it.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    /// The dispatcher queue is at capacity; the newest item was rejected.
    #[error("dispatch queue full")]
    Full,

    /// The dispatcher was stopped and no longer accepts work.
    #[error("dispatch queue closed")]
    Closed,
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use faultline::DispatchError;
    ///
    /// assert_eq!(DispatchError::Full.as_label(), "dispatch_full");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::Full => "dispatch_full",
            DispatchError::Closed => "dispatch_closed",
        }
    }
}

/// # Errors produced by a delivery backend.
///
/// The events engine distinguishes exactly one variant: [`BackendError::RateExceeded`]
/// suspends all sends for the configured cooldown. Every other variant is treated as
/// transient and the batch is retried.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The collector asked the client to slow down.
    #[error("rate exceeded: slow down")]
    RateExceeded,

    /// The account cannot accept more data (expired trial or billing issue).
    #[error("payment required")]
    PaymentRequired,

    /// The collector rejected the credentials.
    #[error("unauthorized: bad api key?")]
    Unauthorized,

    /// The collector answered with an unexpected status code.
    #[error("request failed status={status}")]
    Status {
        /// The status code returned by the collector.
        status: u16,
    },

    /// The payload never reached the collector (connect error, timeout, encoding error).
    #[error("transport error: {error}")]
    Transport {
        /// The underlying error message.
        error: String,
    },
}

impl BackendError {
    /// Builds a [`BackendError::Transport`] from any displayable error.
    pub fn transport(error: impl std::fmt::Display) -> Self {
        BackendError::Transport {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use faultline::BackendError;
    ///
    /// let err = BackendError::Status { status: 500 };
    /// assert_eq!(err.as_label(), "backend_status");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            BackendError::RateExceeded => "backend_rate_exceeded",
            BackendError::PaymentRequired => "backend_payment_required",
            BackendError::Unauthorized => "backend_unauthorized",
            BackendError::Status { .. } => "backend_status",
            BackendError::Transport { .. } => "backend_transport",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            BackendError::RateExceeded => "rate exceeded".to_string(),
            BackendError::PaymentRequired => "payment required".to_string(),
            BackendError::Unauthorized => "unauthorized".to_string(),
            BackendError::Status { status } => format!("unexpected status: {status}"),
            BackendError::Transport { error } => format!("transport: {error}"),
        }
    }

    /// Indicates whether the error is a rate-limit signal.
    ///
    /// # Example
    /// ```
    /// use faultline::BackendError;
    ///
    /// assert!(BackendError::RateExceeded.is_rate_limit());
    /// assert!(!BackendError::Unauthorized.is_rate_limit());
    /// ```
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, BackendError::RateExceeded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_rate_exceeded_throttles() {
        let errors = [
            BackendError::PaymentRequired,
            BackendError::Unauthorized,
            BackendError::Status { status: 500 },
            BackendError::transport("connection refused"),
        ];
        for err in errors {
            assert!(!err.is_rate_limit(), "{} must be retried", err.as_label());
        }
        assert!(BackendError::RateExceeded.is_rate_limit());
    }

    #[test]
    fn test_transport_keeps_message() {
        let err = BackendError::transport("connection refused");
        assert_eq!(err.to_string(), "transport error: connection refused");
        assert_eq!(err.as_message(), "transport: connection refused");
    }

    #[test]
    fn test_dispatch_labels_are_distinct() {
        assert_ne!(DispatchError::Full.as_label(), DispatchError::Closed.as_label());
        assert_eq!(DispatchError::Closed.to_string(), "dispatch queue closed");
    }
}
