//! # Example: client
//!
//! Reports an error notice, a few telemetry events and some counters, then shuts down.
//!
//! Shows how to:
//! - Configure batching and the metrics interval with [`Config`].
//! - Build a [`Client`] over the in-memory backend.
//! - Rely on [`Client::stop`] for the final best-effort delivery.
//!
//! ## Flow
//! ```text
//! notify_error ──► BufferedWorker ──► Backend::notify(Notices)
//! event × 5    ──► EventsWorker   ──► Backend::event(batch of 2, 2, 1)
//! increment    ──► MetricCollector ──(stop)──► Backend::notify(Metrics)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example client
//! ```

use std::sync::Arc;
use std::time::Duration;

use faultline::{Client, Config, MemoryBackend, Notice};
use serde_json::{Map, json};

#[tokio::main]
async fn main() {
    let cfg = Config {
        environment: Some("development".into()),
        events_batch_size: 2,
        events_timeout: Duration::from_secs(5),
        metrics_interval: Duration::from_secs(30),
        ..Config::default()
    };
    let backend = Arc::new(MemoryBackend::new());
    let client = Client::builder(cfg, backend.clone()).build();

    let mut context = Map::new();
    context.insert("request_id".into(), json!("req-42"));
    client.set_context(context);

    let token = client.notify(Notice::from_message("payment gateway timed out"));
    println!("reported notice {token}");

    for step in 0..5 {
        let mut data = Map::new();
        data.insert("step".into(), json!(step));
        client.event("checkout_step", data);
        client.increment("checkout.steps", 1);
    }

    client.stop().await;

    for (feature, payload) in backend.notices() {
        println!("[{}] {payload}", feature.endpoint());
    }
    for record in backend.events() {
        println!("[events] {}", serde_json::to_string(&record).unwrap_or_default());
    }
}
