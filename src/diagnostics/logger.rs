//! # Diagnostic sink trait.
//!
//! Provides [`Logger`] an extension point for routing engine diagnostics to any
//! logging system.
//!
//! ## Rules
//! - Called from the engines' consumer tasks: keep it fast, never block on I/O.
//! - Must not panic; a logger has no way to report its own failures.
//! - Diagnostics arrive in `seq` order per engine.
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use faultline::{Diagnostic, DiagnosticKind, Logger};
//!
//! #[derive(Default)]
//! struct DropCounter(AtomicUsize);
//!
//! impl Logger for DropCounter {
//!     fn log(&self, d: &Diagnostic) {
//!         if d.kind == DiagnosticKind::EventsDropped {
//!             self.0.fetch_add(d.count.unwrap_or(0) as usize, Ordering::Relaxed);
//!         }
//!     }
//! }
//! ```

use crate::diagnostics::Diagnostic;

/// Sink for operational diagnostics (drop summaries, retries, overflow notices).
pub trait Logger: Send + Sync + 'static {
    /// Records a single diagnostic. Never fails.
    fn log(&self, diagnostic: &Diagnostic);
}
