//! Engine diagnostics: data model, sink trait, and the default `tracing` sink.
//!
//! ## Contents
//! - [`DiagnosticKind`], [`Diagnostic`] classification and metadata
//! - [`Logger`] the sink the engines write to
//! - [`LogWriter`] default sink forwarding to `tracing`
//!
//! ## Quick reference
//! - **Producers**: `BufferedWorker` consumer (work failures/panics),
//!   `EventsWorker` consumer (send failures, drops, throttling), `Client` (notice overflow),
//!   `MetricCollector` task (metrics overflow).
//! - **Consumers**: the `Arc<dyn Logger>` injected at construction.

mod diagnostic;
mod log;
mod logger;

pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use log::LogWriter;
pub use logger::Logger;
