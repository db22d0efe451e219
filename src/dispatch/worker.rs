//! # Bounded asynchronous dispatcher.
//!
//! Provides [`BufferedWorker`], which executes fire-and-forget work items on one dedicated
//! consumer task without ever blocking the submitter.
//!
//! ## Architecture
//! ```text
//! push(envelope)
//!     │ try_send (never waits)
//!     ▼
//! [bounded queue] ──► consumer task ──► envelope.into_future().await
//!     │                    ├──► Err(e)  → Diagnostic::WorkFailed, continue
//!     │                    └──► panic   → Diagnostic::WorkPanicked, continue
//!     └──► full → DispatchError::Full (newest item rejected)
//! ```
//!
//! ## Rules
//! - **Strict FIFO, one consumer**: items run one at a time in submission order
//! - **Overflow**: `push` rejects the newest item with [`DispatchError::Full`]
//! - **Isolation**: a failing or panicking item never stops the consumer
//! - **Rendezvous flush**: [`BufferedWorker::flush`] enqueues a marker and waits for it,
//!   so every item pushed before the call has finished when it returns
//!
//! ## Panic handling
//! The consumer uses `catch_unwind` around each item.
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a work item panics while holding a lock on data it shares with other items.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::diagnostics::{Diagnostic, Logger};
use crate::dispatch::{Envelope, panic_message};
use crate::error::DispatchError;

/// Fixed-capacity work queue drained by a single consumer task.
#[derive(Debug)]
pub struct BufferedWorker {
    tx: mpsc::Sender<Envelope>,
    token: CancellationToken,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl BufferedWorker {
    /// Queue capacity used by [`Client`](crate::Client) unless configured otherwise.
    pub const DEFAULT_CAPACITY: usize = 100;

    /// Creates the worker and spawns its consumer task.
    ///
    /// Must be called from within a tokio runtime. Capacity is clamped to a minimum of 1.
    #[must_use]
    pub fn new(capacity: usize, logger: Arc<dyn Logger>) -> Self {
        let (tx, rx) = mpsc::channel::<Envelope>(capacity.max(1));
        let token = CancellationToken::new();
        let handle = tokio::spawn(consume(rx, token.clone(), logger));

        Self {
            tx,
            token,
            handle: Mutex::new(Some(handle)),
        }
    }

    /// Submits a work item without waiting.
    ///
    /// - Queue full: the item is dropped, returns [`DispatchError::Full`].
    /// - Worker stopped: the item is dropped, returns [`DispatchError::Closed`].
    pub fn push(&self, work: Envelope) -> Result<(), DispatchError> {
        if self.token.is_cancelled() {
            return Err(DispatchError::Closed);
        }
        self.tx.try_send(work).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DispatchError::Full,
            mpsc::error::TrySendError::Closed(_) => DispatchError::Closed,
        })
    }

    /// Shorthand for `push(Envelope::new(f))`.
    pub fn push_fn<F, Fut>(&self, f: F) -> Result<(), DispatchError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: std::future::Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.push(Envelope::new(f))
    }

    /// Waits until every item submitted before this call has executed.
    ///
    /// Unlike `push`, enqueuing the marker waits for queue space. Returns early,
    /// without guarantees, once the worker is stopped.
    pub async fn flush(&self) {
        if self.token.is_cancelled() {
            return;
        }

        let (done_tx, done_rx) = oneshot::channel::<()>();
        let marker = Envelope::new(move || async move {
            let _ = done_tx.send(());
            Ok(())
        });

        tokio::select! {
            sent = self.tx.send(marker) => {
                if sent.is_err() {
                    return;
                }
            }
            _ = self.token.cancelled() => return,
        }

        // Err means the marker was dropped unexecuted: the consumer is gone.
        tokio::select! {
            _ = done_rx => {}
            _ = self.token.cancelled() => {}
        }
    }

    /// Stops accepting work, finishes the items already queued, and joins the consumer.
    ///
    /// Idempotent; concurrent callers all return after the consumer has exited.
    pub async fn stop(&self) {
        self.token.cancel();

        let mut handle = self.handle.lock().await;
        if let Some(h) = handle.take() {
            let _ = h.await;
        }
    }

    /// Returns `true` once [`stop`](Self::stop) has been called.
    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Consumer loop: executes items until stopped, then drains what is already queued.
async fn consume(
    mut rx: mpsc::Receiver<Envelope>,
    token: CancellationToken,
    logger: Arc<dyn Logger>,
) {
    loop {
        let work = tokio::select! {
            biased;
            _ = token.cancelled() => break,
            next = rx.recv() => match next {
                Some(work) => work,
                None => return,
            },
        };
        execute(work, logger.as_ref()).await;
    }

    rx.close();
    while let Some(work) = rx.recv().await {
        execute(work, logger.as_ref()).await;
    }
}

/// Runs one item; failures and panics become diagnostics.
async fn execute(work: Envelope, logger: &dyn Logger) {
    match AssertUnwindSafe(work.into_future()).catch_unwind().await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => logger.log(&Diagnostic::work_failed(&err)),
        Err(panic_err) => logger.log(&Diagnostic::work_panicked(panic_message(&*panic_err))),
    }
}
