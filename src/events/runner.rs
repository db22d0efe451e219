//! # Events consumer: batching, retry, throttle, and shutdown drain.
//!
//! [`EventsRunner`] is the single owner of the ring buffer, the pending batch list,
//! and the throttle timer. It runs on one task; producers reach it only through the
//! inbound record channel, the flush request channel, and the cancellation token.
//!
//! ## Event loop
//! ```text
//! select! (biased, in this priority order)
//!   ├─► token cancelled   → drain inbound, attempt cycle, drop summary, exit
//!   ├─► flush request     → drain inbound, attempt cycle, ack
//!   ├─► throttle expired  → clear throttle, drain inbound, attempt cycle
//!   ├─► flush tick        → attempt cycle
//!   ├─► drop-log tick     → drop summary
//!   └─► inbound record    → accept; if buffer ≥ batch size → attempt cycle, reset tick
//! ```
//!
//! ## Attempt cycle
//! ```text
//! ring buffer ──drain──► Batch{attempts: 0} ──► push_back(batches)
//!
//! while let Some(head) = batches.front():
//!   ├─ throttled                 → stop
//!   ├─ head.attempts > retries   → BatchDropped, pop, continue
//!   └─ backend.event(head)
//!        ├─ Ok                   → pop, continue
//!        ├─ Err(RateExceeded)    → arm throttle sleep, stop (head kept, attempts unchanged)
//!        └─ Err(other) / panic   → attempts += 1, SendFailed, stop (head-of-line blocking)
//! ```
//!
//! ## Accounting
//! `queue_size` counts records in the ring buffer plus records in pending batches.
//! Records still in the inbound channel are not counted. At capacity the oldest
//! record in the ring buffer is evicted; pending batches are left intact.

use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Instant, Interval, MissedTickBehavior, Sleep};
use tokio_util::sync::CancellationToken;

use crate::backend::Backend;
use crate::core::Config;
use crate::diagnostics::{Diagnostic, Logger};
use crate::dispatch::panic_message;
use crate::error::BackendError;
use crate::events::{Batch, EventRecord, RingBuffer};

/// Channels connecting an [`EventsWorker`](crate::EventsWorker) handle to its runner.
pub(crate) struct RunnerChannels {
    pub(crate) records: mpsc::Receiver<EventRecord>,
    pub(crate) flushes: mpsc::Receiver<oneshot::Sender<()>>,
    pub(crate) dropped: Arc<AtomicU64>,
}

/// State owned by the events consumer task.
pub(crate) struct EventsRunner {
    backend: Arc<dyn Backend>,
    logger: Arc<dyn Logger>,

    batch_size: usize,
    max_queue_size: usize,
    max_retries: u32,
    throttle_wait: Duration,
    flush_interval: Option<Duration>,
    drop_log_interval: Option<Duration>,

    queue: RingBuffer<EventRecord>,
    queue_size: usize,
    batches: VecDeque<Batch>,
    throttle: Option<Pin<Box<Sleep>>>,
    dropped: Arc<AtomicU64>,

    records: mpsc::Receiver<EventRecord>,
    flushes: mpsc::Receiver<oneshot::Sender<()>>,
}

impl EventsRunner {
    /// Builds the runner from the configuration read once at construction.
    pub(crate) fn new(
        cfg: &Config,
        backend: Arc<dyn Backend>,
        logger: Arc<dyn Logger>,
        channels: RunnerChannels,
    ) -> Self {
        let batch_size = cfg.batch_size();
        Self {
            backend,
            logger,
            batch_size,
            max_queue_size: cfg.max_queue_size(),
            max_retries: cfg.events_max_retries,
            throttle_wait: cfg.events_throttle_wait,
            flush_interval: cfg.flush_interval(),
            drop_log_interval: cfg.drop_log_interval(),
            // +1 so a record can be pushed before the batch threshold is checked.
            queue: RingBuffer::new(batch_size + 1),
            queue_size: 0,
            batches: VecDeque::new(),
            throttle: None,
            dropped: channels.dropped,
            records: channels.records,
            flushes: channels.flushes,
        }
    }

    /// Runs until `token` is cancelled, then performs the shutdown drain.
    pub(crate) async fn run(mut self, token: CancellationToken) {
        let mut ticker = self.flush_interval.map(periodic);
        let mut drop_ticker = self.drop_log_interval.map(periodic);

        loop {
            tokio::select! {
                biased;

                _ = token.cancelled() => {
                    self.drain_inbound();
                    self.flush(&mut ticker).await;
                    self.log_drop_summary();
                    break;
                }
                Some(done) = self.flushes.recv() => {
                    self.drain_inbound();
                    self.flush(&mut ticker).await;
                    let _ = done.send(());
                }
                _ = expired(&mut self.throttle) => {
                    self.throttle = None;
                    self.logger.log(&Diagnostic::throttle_expired());
                    self.drain_inbound();
                    self.flush(&mut ticker).await;
                }
                _ = tick(&mut ticker) => {
                    self.flush(&mut ticker).await;
                }
                _ = tick(&mut drop_ticker) => {
                    self.log_drop_summary();
                }
                Some(record) = self.records.recv() => {
                    self.accept(record);
                    if self.queue.len() >= self.batch_size {
                        self.flush(&mut ticker).await;
                        if let Some(t) = ticker.as_mut() {
                            t.reset();
                        }
                    }
                }
            }
        }
    }

    /// Admits one record, evicting the oldest buffered record when at capacity.
    ///
    /// Eviction only touches the ring buffer: records already sealed into a pending
    /// batch are never removed, so a retried batch always resends the same content.
    /// While older batches wait, the record evicted may be the one just admitted.
    fn accept(&mut self, record: EventRecord) {
        if !self.queue.push(record) {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return;
        }
        if self.queue_size >= self.max_queue_size {
            self.queue.pop();
            self.dropped.fetch_add(1, Ordering::Relaxed);
        } else {
            self.queue_size += 1;
        }
    }

    /// Moves everything waiting in the inbound channel into the ring buffer.
    ///
    /// Whenever the buffer reaches the batch size it is sealed into a pending batch
    /// (without sending) so the buffer never overflows.
    fn drain_inbound(&mut self) {
        while let Ok(record) = self.records.try_recv() {
            self.accept(record);
            if self.queue.len() >= self.batch_size {
                self.seal();
            }
        }
    }

    /// Drains the ring buffer into a new batch at the tail of the pending list.
    fn seal(&mut self) {
        let records = self.queue.drain();
        if !records.is_empty() {
            self.batches.push_back(Batch::new(records));
        }
    }

    /// Runs an attempt cycle if anything is buffered or pending.
    ///
    /// The periodic tick is pushed back when batches remain and sends are not throttled.
    async fn flush(&mut self, ticker: &mut Option<Interval>) {
        if self.queue.is_empty() && self.batches.is_empty() {
            return;
        }
        let pending = self.attempt_send().await;
        if pending && self.throttle.is_none() {
            if let Some(t) = ticker.as_mut() {
                t.reset();
            }
        }
    }

    /// One attempt cycle. Returns whether batches remain pending.
    async fn attempt_send(&mut self) -> bool {
        self.seal();

        while let Some(batch) = self.batches.front_mut() {
            if self.throttle.is_some() {
                break;
            }

            if batch.attempts() > self.max_retries {
                let (attempts, len) = (batch.attempts(), batch.len());
                self.logger.log(&Diagnostic::batch_dropped(attempts, len));
                self.batches.pop_front();
                self.queue_size = self.queue_size.saturating_sub(len);
                continue;
            }

            match send(self.backend.as_ref(), batch.records()).await {
                Ok(()) => {
                    let len = batch.len();
                    self.batches.pop_front();
                    self.queue_size = self.queue_size.saturating_sub(len);
                }
                Err(BackendError::RateExceeded) => {
                    self.logger.log(&Diagnostic::throttled(self.throttle_wait));
                    self.throttle = Some(Box::pin(time::sleep(self.throttle_wait)));
                    break;
                }
                Err(err) => {
                    let attempts = batch.record_failure();
                    self.logger.log(&Diagnostic::send_failed(attempts, &err));
                    break;
                }
            }
        }

        !self.batches.is_empty()
    }

    /// Logs and resets the drop counter, if anything was dropped.
    fn log_drop_summary(&self) {
        let dropped = self.dropped.swap(0, Ordering::Relaxed);
        if dropped > 0 {
            self.logger.log(&Diagnostic::events_dropped(
                dropped,
                self.max_queue_size,
                self.queue_size,
            ));
        }
    }
}

/// Sends one batch; a panicking backend counts as a transient failure.
async fn send(backend: &dyn Backend, records: &[EventRecord]) -> Result<(), BackendError> {
    match AssertUnwindSafe(backend.event(records)).catch_unwind().await {
        Ok(res) => res,
        Err(panic_err) => Err(BackendError::transport(format!(
            "backend panicked: {}",
            panic_message(&*panic_err)
        ))),
    }
}

/// Interval whose first tick fires one full period from now.
fn periodic(period: Duration) -> Interval {
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

/// Completes on the next tick, or never when the timer is disabled.
async fn tick(interval: &mut Option<Interval>) {
    match interval {
        Some(i) => {
            i.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

/// Completes when the throttle sleep elapses, or never when not throttled.
async fn expired(throttle: &mut Option<Pin<Box<Sleep>>>) {
    match throttle {
        Some(sleep) => sleep.as_mut().await,
        None => std::future::pending::<()>().await,
    }
}
