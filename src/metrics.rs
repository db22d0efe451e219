//! # Counter aggregation and periodic reporting.
//!
//! [`MetricCollector`] sums named counters on a dedicated task and, once per
//! report interval, hands the totals to the notice dispatcher as one
//! [`Feature::Metrics`] payload.
//!
//! ## Architecture
//! ```text
//! increment(name, n) ──try_send──► [counter channel] ──► collector task
//!                                                           │ HashMap<String, i64> += n
//!                                                           ▼
//!                    tick | flush() | stop ──► report ──► BufferedWorker::push
//!                                                           │   └─► Backend::notify(Metrics, payload)
//!                                                           └─► full/closed → Diagnostic::MetricsOverflow
//! ```
//!
//! ## Rules
//! - Totals are reset after every report; an empty report is never sent.
//! - `increment` never waits: when the counter channel is full the increment is lost.
//! - `stop` reports whatever is left, so the dispatcher must be stopped afterwards.
//!
//! ## Payload
//! ```text
//! { "metrics": ["errors 2", "requests 3"], "environment": "production" }
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use serde_json::json;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::backend::{Backend, Feature};
use crate::core::Config;
use crate::diagnostics::{Diagnostic, Logger};
use crate::dispatch::BufferedWorker;
use crate::error::DispatchError;

/// One named increment on its way to the collector task.
#[derive(Debug)]
struct Counter {
    name: String,
    value: i64,
}

/// Aggregates counters and reports them through the notice dispatcher.
#[derive(Debug)]
pub struct MetricCollector {
    counters: mpsc::Sender<Counter>,
    flushes: mpsc::Sender<oneshot::Sender<()>>,
    token: CancellationToken,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl MetricCollector {
    /// Capacity of the counter channel.
    pub const CHANNEL_CAPACITY: usize = 1024;

    /// Creates the collector and spawns its task.
    ///
    /// Reports every [`Config::metrics_report_interval`]; when that is disabled
    /// counters are only reported on [`flush`](Self::flush) and [`stop`](Self::stop).
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new(
        cfg: &Config,
        dispatcher: Arc<BufferedWorker>,
        backend: Arc<dyn Backend>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        let (counters_tx, counters_rx) = mpsc::channel(Self::CHANNEL_CAPACITY);
        let (flushes_tx, flushes_rx) = mpsc::channel(1);
        let token = cfg.token.child_token();

        let reporter = Reporter {
            environment: cfg.environment.clone(),
            dispatcher,
            backend,
            logger,
        };
        let handle = tokio::spawn(collect(
            counters_rx,
            flushes_rx,
            cfg.metrics_report_interval(),
            reporter,
            token.clone(),
        ));

        Self {
            counters: counters_tx,
            flushes: flushes_tx,
            token,
            handle: Mutex::new(Some(handle)),
        }
    }

    /// Adds `value` to the counter `name`.
    pub fn increment(&self, name: impl Into<String>, value: i64) {
        let _ = self.counters.try_send(Counter {
            name: name.into(),
            value,
        });
    }

    /// Reports the current totals to the dispatcher now.
    ///
    /// Returns once the report has been handed to the dispatcher (not delivered),
    /// or immediately if the collector is stopped.
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
        let _ = done_rx.await;
    }

    /// Reports the remaining totals and joins the collector task.
    ///
    /// Idempotent.
    pub async fn stop(&self) {
        self.token.cancel();

        let mut handle = self.handle.lock().await;
        if let Some(h) = handle.take() {
            let _ = h.await;
        }
    }

    /// Returns `true` once shutdown has been requested.
    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for MetricCollector {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Turns accumulated totals into dispatcher work items.
struct Reporter {
    environment: Option<String>,
    dispatcher: Arc<BufferedWorker>,
    backend: Arc<dyn Backend>,
    logger: Arc<dyn Logger>,
}

impl Reporter {
    fn report(&self, totals: &mut HashMap<String, i64>) {
        if totals.is_empty() {
            return;
        }

        let mut lines: Vec<String> = totals
            .drain()
            .map(|(name, value)| format!("{name} {value}"))
            .collect();
        lines.sort();
        let counters = lines.len();
        let payload = json!({
            "metrics": lines,
            "environment": self.environment,
        });

        let backend = Arc::clone(&self.backend);
        let pushed = self.dispatcher.push_fn(move || async move {
            backend
                .notify(Feature::Metrics, payload)
                .await
                .context("delivering metrics")?;
            Ok(())
        });

        if let Err(err) = pushed {
            let reason = match err {
                DispatchError::Full => "full",
                _ => "closed",
            };
            self.logger.log(&Diagnostic::metrics_overflow(reason, counters));
        }
    }
}

/// Collector loop: sums counters, reports on tick, flush request and shutdown.
async fn collect(
    mut counters: mpsc::Receiver<Counter>,
    mut flushes: mpsc::Receiver<oneshot::Sender<()>>,
    period: Option<Duration>,
    reporter: Reporter,
    token: CancellationToken,
) {
    let mut totals: HashMap<String, i64> = HashMap::new();
    let mut ticker = period.map(|p| {
        let mut interval: Interval = time::interval_at(Instant::now() + p, p);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    });

    loop {
        tokio::select! {
            biased;

            _ = token.cancelled() => {
                drain(&mut counters, &mut totals);
                reporter.report(&mut totals);
                break;
            }
            Some(done) = flushes.recv() => {
                drain(&mut counters, &mut totals);
                reporter.report(&mut totals);
                let _ = done.send(());
            }
            _ = tick(&mut ticker) => {
                reporter.report(&mut totals);
            }
            Some(counter) = counters.recv() => {
                *totals.entry(counter.name).or_insert(0) += counter.value;
            }
        }
    }
}

fn drain(counters: &mut mpsc::Receiver<Counter>, totals: &mut HashMap<String, i64>) {
    while let Ok(counter) = counters.try_recv() {
        *totals.entry(counter.name).or_insert(0) += counter.value;
    }
}

async fn tick(interval: &mut Option<Interval>) {
    match interval {
        Some(i) => {
            i.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
