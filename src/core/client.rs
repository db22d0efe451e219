//! # Client: the application-facing wrapper around both engines.
//!
//! The [`Client`] owns the notice dispatcher ([`BufferedWorker`]), the events engine
//! ([`EventsWorker`]), the backend, and the report context. It adds no delivery
//! semantics of its own: everything it does is non-blocking submission plus
//! flush/stop fan-out.
//!
//! ## High-level architecture
//! ```text
//! notify(Notice) ──► merge context ──► BufferedWorker::push(work item)
//!                                           └──► Backend::notify(Notices, payload)
//!
//! event(type, data) ──► EventRecord ──► EventsWorker::push
//!                                           └──► Backend::event(&[EventRecord]) (batched)
//!
//! increment(name, n) ──► MetricCollector ──(interval)──► BufferedWorker::push
//!                                           └──► Backend::notify(Metrics, payload)
//!
//! flush() ──► MetricCollector::flush ──► BufferedWorker::flush ──► EventsWorker::flush
//! stop()  ──► MetricCollector::stop  ──► BufferedWorker::stop  ──► EventsWorker::stop
//! ```
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use serde_json::{json, Map};
//! use faultline::{Client, Config, MemoryBackend};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let backend = Arc::new(MemoryBackend::new());
//!     let client = Client::builder(Config::default(), backend.clone()).build();
//!
//!     let mut data = Map::new();
//!     data.insert("path".into(), json!("/checkout"));
//!     client.event("page_view", data);
//!
//!     let err = std::io::Error::other("disk full");
//!     let token = client.notify_error(&err);
//!
//!     client.flush().await;
//!     assert_eq!(backend.events().len(), 1);
//!     assert_eq!(backend.notices()[0].1["token"], json!(token.to_string()));
//!
//!     client.stop().await;
//! }
//! ```

use std::sync::{Arc, RwLock};

use anyhow::Context as _;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
    backend::{Backend, Feature},
    core::Config,
    diagnostics::{Diagnostic, Logger},
    dispatch::BufferedWorker,
    error::DispatchError,
    events::{EventRecord, EventsWorker},
    metrics::MetricCollector,
    notice::Notice,
};

use super::builder::ClientBuilder;

/// Reports error notices and telemetry events without blocking the caller.
pub struct Client {
    cfg: Config,
    backend: Arc<dyn Backend>,
    logger: Arc<dyn Logger>,
    context: RwLock<Map<String, Value>>,
    notices: Arc<BufferedWorker>,
    events: EventsWorker,
    metrics: Option<MetricCollector>,
}

impl Client {
    /// Returns a builder; see [`ClientBuilder`].
    pub fn builder(cfg: Config, backend: Arc<dyn Backend>) -> ClientBuilder {
        ClientBuilder::new(cfg, backend)
    }

    pub(super) fn new_internal(
        cfg: Config,
        backend: Arc<dyn Backend>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        let notices = Arc::new(BufferedWorker::new(
            cfg.notice_queue_capacity(),
            Arc::clone(&logger),
        ));
        let events = EventsWorker::new(&cfg, Arc::clone(&backend), Arc::clone(&logger));
        let metrics = cfg.metrics_report_interval().map(|_| {
            MetricCollector::new(
                &cfg,
                Arc::clone(&notices),
                Arc::clone(&backend),
                Arc::clone(&logger),
            )
        });
        Self {
            cfg,
            backend,
            logger,
            context: RwLock::new(Map::new()),
            notices,
            events,
            metrics,
        }
    }

    /// Returns the configuration the client was built with.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Merges `context` into the context attached to every subsequent notice.
    pub fn set_context(&self, context: Map<String, Value>) {
        self.context
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .extend(context);
    }

    /// Removes all context.
    pub fn clear_context(&self) {
        self.context
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }

    /// Queues a notice for delivery and returns its token.
    ///
    /// Client context is applied first, so keys already set on the notice win.
    /// When the dispatcher is full or stopped the notice is dropped and a
    /// `NoticeOverflow` diagnostic is logged; the token is still returned.
    pub fn notify(&self, notice: Notice) -> Uuid {
        let mut notice = notice;
        let mut context = self
            .context
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        context.extend(std::mem::take(&mut notice.context));
        notice.context = context;
        if notice.environment.is_none() {
            notice.environment = self.cfg.environment.clone();
        }

        let token = notice.token;
        let backend = Arc::clone(&self.backend);
        let pushed = self.notices.push_fn(move || async move {
            let payload = serde_json::to_value(&notice).context("encoding notice")?;
            backend
                .notify(Feature::Notices, payload)
                .await
                .with_context(|| format!("delivering notice {}", notice.token))?;
            Ok(())
        });

        if let Err(err) = pushed {
            let reason = match err {
                DispatchError::Full => "full",
                _ => "closed",
            };
            self.logger.log(&Diagnostic::notice_overflow(reason));
        }
        token
    }

    /// Shorthand for `notify(Notice::from_error(error))`.
    pub fn notify_error<E>(&self, error: &E) -> Uuid
    where
        E: std::error::Error + ?Sized,
    {
        self.notify(Notice::from_error(error))
    }

    /// Records a telemetry event; never blocks and never fails.
    pub fn event(&self, event_type: impl Into<String>, data: Map<String, Value>) {
        self.events.push(EventRecord::new(event_type, data));
    }

    /// Adds `value` to the counter `name`; a no-op when metrics are disabled.
    pub fn increment(&self, name: impl Into<String>, value: i64) {
        if let Some(metrics) = &self.metrics {
            metrics.increment(name, value);
        }
    }

    /// Reports pending counters, waits until queued notices have executed,
    /// then runs one events attempt cycle.
    pub async fn flush(&self) {
        if let Some(metrics) = &self.metrics {
            metrics.flush().await;
        }
        self.notices.flush().await;
        self.events.flush().await;
    }

    /// Stops every engine after a final best-effort delivery attempt.
    ///
    /// The collector stops first so its last report still reaches the dispatcher.
    pub async fn stop(&self) {
        if let Some(metrics) = &self.metrics {
            metrics.stop().await;
        }
        self.notices.stop().await;
        self.events.stop().await;
    }
}
