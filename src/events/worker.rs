//! # Event delivery engine handle.
//!
//! [`EventsWorker`] is the producer-facing side of the events engine. It owns the
//! inbound channels and the shutdown token; all engine state lives in the consumer
//! task (see [`EventsRunner`](super::runner)).
//!
//! ## Architecture
//! ```text
//! push(record) ──try_send──► [inbound, cap = max_queue_size] ──┐
//! flush()      ──send ack──► [flush requests, cap = 1] ────────┼──► consumer task ──► Backend::event
//! stop()       ──cancel────► CancellationToken (child of cfg) ─┘
//! ```
//!
//! ## Rules
//! - `push` never waits; a full inbound channel drops the record and counts it.
//! - `flush` waits for one attempt cycle, not for success.
//! - `stop` runs exactly one shutdown sequence, however many callers race on it.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::backend::Backend;
use crate::core::Config;
use crate::diagnostics::Logger;
use crate::events::EventRecord;
use crate::events::runner::{EventsRunner, RunnerChannels};

/// Batching, retrying, throttling event delivery engine.
///
/// # Example
/// ```rust
/// use std::sync::Arc;
/// use serde_json::Map;
/// use faultline::{Config, EventRecord, EventsWorker, LogWriter, MemoryBackend};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let backend = Arc::new(MemoryBackend::new());
///     let worker = EventsWorker::new(&Config::default(), backend.clone(), Arc::new(LogWriter));
///
///     worker.push(EventRecord::new("page_view", Map::new()));
///     worker.flush().await;
///     assert_eq!(backend.events().len(), 1);
///
///     worker.stop().await;
/// }
/// ```
#[derive(Debug)]
pub struct EventsWorker {
    records: mpsc::Sender<EventRecord>,
    flushes: mpsc::Sender<oneshot::Sender<()>>,
    dropped: Arc<AtomicU64>,
    token: CancellationToken,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl EventsWorker {
    /// Creates the engine and spawns its consumer task.
    ///
    /// Must be called from within a tokio runtime. The engine shuts down when
    /// [`stop`](Self::stop) is called, when `cfg.token` is cancelled, or when
    /// the handle is dropped.
    #[must_use]
    pub fn new(cfg: &Config, backend: Arc<dyn Backend>, logger: Arc<dyn Logger>) -> Self {
        let (records_tx, records_rx) = mpsc::channel(cfg.max_queue_size());
        let (flushes_tx, flushes_rx) = mpsc::channel(1);
        let dropped = Arc::new(AtomicU64::new(0));
        let token = cfg.token.child_token();

        let runner = EventsRunner::new(
            cfg,
            backend,
            logger,
            RunnerChannels {
                records: records_rx,
                flushes: flushes_rx,
                dropped: Arc::clone(&dropped),
            },
        );
        let handle = tokio::spawn(runner.run(token.clone()));

        Self {
            records: records_tx,
            flushes: flushes_tx,
            dropped,
            token,
            handle: Mutex::new(Some(handle)),
        }
    }

    /// Submits a record without waiting.
    ///
    /// Never fails from the caller's point of view: overflow is only visible
    /// through the periodic drop summary.
    pub fn push(&self, record: EventRecord) {
        match self.records.try_send(record) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {}
        }
    }

    /// Moves queued submissions into the engine and runs one attempt cycle.
    ///
    /// Returns once the cycle has completed, or immediately if the engine is stopped.
    pub async fn flush(&self) {
        if self.token.is_cancelled() {
            return;
        }

        let (done_tx, done_rx) = oneshot::channel();
        tokio::select! {
            sent = self.flushes.send(done_tx) => {
                if sent.is_err() {
                    return;
                }
            }
            _ = self.token.cancelled() => return,
        }

        // Err means the request was dropped with the consumer.
        let _ = done_rx.await;
    }

    /// Shuts the engine down: one final attempt cycle, a drop summary, then the consumer exits.
    ///
    /// Idempotent and safe to call concurrently; every caller returns after the
    /// consumer task has terminated.
    pub async fn stop(&self) {
        self.token.cancel();

        let mut handle = self.handle.lock().await;
        if let Some(h) = handle.take() {
            let _ = h.await;
        }
    }

    /// Returns `true` once shutdown has been requested (by `stop` or the parent token).
    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for EventsWorker {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
