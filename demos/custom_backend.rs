//! # Example: custom_backend
//!
//! Plugs a hand-written [`Backend`] and [`Logger`] into the client.
//!
//! Shows how to:
//! - Implement [`Backend`] and signal a rate limit with [`BackendError::RateExceeded`].
//! - Implement [`Logger`] to observe engine diagnostics.
//! - Watch a throttled batch being resent after the cooldown.
//!
//! ## Run
//! ```bash
//! cargo run --example custom_backend
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use faultline::{
    Backend, BackendError, Client, Config, Diagnostic, EventRecord, Feature, Logger, Payload,
};
use serde_json::Map;

/// Prints deliveries; rejects the first event batch with a rate limit.
#[derive(Default)]
struct ConsoleBackend {
    batches: AtomicUsize,
}

#[async_trait]
impl Backend for ConsoleBackend {
    async fn notify(&self, feature: Feature, payload: Payload) -> Result<(), BackendError> {
        println!("POST /{} {payload}", feature.endpoint());
        Ok(())
    }

    async fn event(&self, records: &[EventRecord]) -> Result<(), BackendError> {
        if self.batches.fetch_add(1, Ordering::SeqCst) == 0 {
            println!("POST /events ({} records) -> 429", records.len());
            return Err(BackendError::RateExceeded);
        }
        println!("POST /events ({} records) -> 201", records.len());
        Ok(())
    }
}

/// Prints every diagnostic with its label.
struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, diagnostic: &Diagnostic) {
        println!("[{}] {diagnostic}", diagnostic.kind.as_label());
    }
}

#[tokio::main]
async fn main() {
    let cfg = Config {
        events_batch_size: 3,
        events_throttle_wait: Duration::from_secs(1),
        ..Config::default()
    };
    let client = Client::builder(cfg, Arc::new(ConsoleBackend::default()))
        .with_logger(Arc::new(ConsoleLogger))
        .build();

    for _ in 0..3 {
        client.event("heartbeat", Map::new());
    }
    client.flush().await;

    // The rejected batch goes out again once the cooldown has elapsed.
    tokio::time::sleep(Duration::from_millis(1500)).await;
    client.stop().await;
}
