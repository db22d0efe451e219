//! # faultline
//!
//! **faultline** is the client-side dispatch core of an error and event reporting SDK.
//!
//! It accepts error notices and structured telemetry events synchronously from the
//! application and delivers them asynchronously to a remote collector, without
//! blocking the caller and without unbounded memory growth.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!        application threads (never blocked)
//!        │                            │
//!   notify(Notice)               event(type, data)
//!        ▼                            ▼
//! ┌──────────────────────┐   ┌───────────────────────────────────────────┐
//! │ BufferedWorker       │   │ EventsWorker                              │
//! │ [queue, cap 100]     │   │ [inbound, cap max_queue_size]             │
//! │ full → reject newest │   │ at capacity → evict oldest                │
//! └──────────┬───────────┘   └──────────────────┬────────────────────────┘
//!            ▼                                  ▼
//!    consumer task                       consumer task
//!    - one item at a time                - RingBuffer → Batch (FIFO)
//!    - catch_unwind per item             - retry head batch (no overtaking)
//!    - rendezvous flush                  - throttle on RateExceeded
//!            │                           - final flush on shutdown
//!            ▼                                  ▼
//!   Backend::notify(feature, payload)   Backend::event(&[EventRecord])
//!            │                                  │
//!            └──────────► Logger (diagnostics) ◄┘
//! ```
//!
//! ### Events attempt cycle
//! ```text
//! trigger: batch size | tick | flush() | throttle expiry | shutdown
//!
//! drain ring buffer → Batch{attempts: 0} → pending.push_back
//! while head = pending.front() and not throttled {
//!   ├─► attempts > max_retries → log BatchDropped, pop
//!   └─► backend.event(head)
//!         ├─ Ok           → pop
//!         ├─ RateExceeded → throttle for throttle_wait, stop
//!         └─ other error  → attempts += 1, log SendFailed, stop
//! }
//! ```
//!
//! ## Features
//! | Area              | Description                                                     | Key types / traits                     |
//! |-------------------|-----------------------------------------------------------------|----------------------------------------|
//! | **Client**        | Non-blocking notice and event submission, flush, stop.          | [`Client`], [`ClientBuilder`]          |
//! | **Dispatch**      | Bounded fire-and-forget work queue with panic isolation.        | [`BufferedWorker`], [`Envelope`]       |
//! | **Events**        | Batching, retry, throttle, drop-oldest backpressure.            | [`EventsWorker`], [`EventRecord`]      |
//! | **Metrics**       | Named counters summed and reported on an interval.              | [`MetricCollector`]                    |
//! | **Backend**       | Transport seam implemented by the application or SDK.           | [`Backend`], [`MemoryBackend`]         |
//! | **Diagnostics**   | Structured operational logs, `tracing` sink by default.         | [`Logger`], [`Diagnostic`]             |
//! | **Errors**        | Typed errors for submission and delivery.                       | [`DispatchError`], [`BackendError`]    |
//! | **Configuration** | Centralized engine settings.                                    | [`Config`]                             |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use serde_json::Map;
//! use faultline::{Client, Config, MemoryBackend};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let cfg = Config {
//!         events_batch_size: 100,
//!         events_timeout: Duration::from_secs(5),
//!         ..Config::default()
//!     };
//!     let backend = Arc::new(MemoryBackend::new());
//!     let client = Client::builder(cfg, backend.clone()).build();
//!
//!     client.event("job_finished", Map::new());
//!     client.notify_error(&std::io::Error::other("disk full"));
//!
//!     // Final best-effort delivery.
//!     client.stop().await;
//!     assert_eq!(backend.events().len(), 1);
//!     assert_eq!(backend.notices().len(), 1);
//! }
//! ```
mod backend;
mod core;
mod diagnostics;
mod dispatch;
mod error;
mod events;
mod metrics;
mod notice;

// ---- Public re-exports ----

pub use backend::{Backend, Feature, MemoryBackend, Payload};
pub use crate::core::{Client, ClientBuilder, Config};
pub use diagnostics::{Diagnostic, DiagnosticKind, LogWriter, Logger};
pub use dispatch::{BufferedWorker, Envelope, WorkFuture};
pub use error::{BackendError, DispatchError};
pub use events::{Batch, EVENT_TYPE_KEY, EventRecord, EventsWorker, RingBuffer, TIMESTAMP_KEY};
pub use metrics::MetricCollector;
pub use notice::Notice;
