//! Integration tests for counter aggregation and reporting.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::CaptureLogger;
use faultline::{
    BufferedWorker, Client, Config, DiagnosticKind, Feature, MemoryBackend, MetricCollector,
};
use serde_json::json;

fn config(interval: Duration) -> Config {
    Config {
        environment: Some("production".into()),
        metrics_interval: interval,
        ..Config::default()
    }
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

#[tokio::test(start_paused = true)]
async fn counters_are_summed_and_reported_each_interval() {
    let backend = Arc::new(MemoryBackend::new());
    let logger = CaptureLogger::new();
    let dispatcher = Arc::new(BufferedWorker::new(8, logger.clone()));
    let collector = MetricCollector::new(
        &config(Duration::from_secs(10)),
        Arc::clone(&dispatcher),
        backend.clone(),
        logger.clone(),
    );

    for _ in 0..3 {
        collector.increment("requests", 1);
    }
    collector.increment("errors", 2);
    settle().await;
    assert!(backend.notices().is_empty(), "nothing before the first tick");

    tokio::time::sleep(Duration::from_millis(10_500)).await;
    dispatcher.flush().await;

    let notices = backend.notices();
    assert_eq!(notices.len(), 1);
    let (feature, payload) = &notices[0];
    assert_eq!(*feature, Feature::Metrics);
    assert_eq!(feature.endpoint(), "metrics");
    assert_eq!(payload["metrics"], json!(["errors 2", "requests 3"]));
    assert_eq!(payload["environment"], json!("production"));

    tokio::time::sleep(Duration::from_secs(20)).await;
    dispatcher.flush().await;
    assert_eq!(backend.notices().len(), 1, "totals reset; empty reports skipped");

    collector.increment("requests", 5);
    settle().await;
    tokio::time::sleep(Duration::from_secs(10)).await;
    dispatcher.flush().await;
    let notices = backend.notices();
    assert_eq!(notices.len(), 2);
    assert_eq!(notices[1].1["metrics"], json!(["requests 5"]));

    collector.stop().await;
    dispatcher.stop().await;
}

#[tokio::test(start_paused = true)]
async fn closed_dispatcher_logs_metrics_overflow() {
    let backend = Arc::new(MemoryBackend::new());
    let logger = CaptureLogger::new();
    let dispatcher = Arc::new(BufferedWorker::new(8, logger.clone()));
    let collector = MetricCollector::new(
        &config(Duration::from_secs(10)),
        Arc::clone(&dispatcher),
        backend.clone(),
        logger.clone(),
    );

    dispatcher.stop().await;
    collector.increment("requests", 1);
    collector.increment("errors", 1);
    collector.flush().await;

    let overflow = logger.of_kind(DiagnosticKind::MetricsOverflow);
    assert_eq!(overflow.len(), 1);
    assert_eq!(overflow[0].reason.as_deref(), Some("closed"));
    assert_eq!(overflow[0].count, Some(2));
    assert!(backend.notices().is_empty());

    collector.stop().await;
}

#[tokio::test(start_paused = true)]
async fn stop_reports_remaining_counters() {
    let backend = Arc::new(MemoryBackend::new());
    let client = Client::builder(config(Duration::from_secs(3600)), backend.clone()).build();

    client.increment("jobs", 4);
    client.stop().await;

    let notices = backend.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].0, Feature::Metrics);
    assert_eq!(notices[0].1["metrics"], json!(["jobs 4"]));
}

#[tokio::test(start_paused = true)]
async fn zero_interval_disables_metrics() {
    let backend = Arc::new(MemoryBackend::new());
    let client = Client::builder(config(Duration::ZERO), backend.clone()).build();

    client.increment("jobs", 4);
    client.flush().await;
    tokio::time::sleep(Duration::from_secs(120)).await;
    client.stop().await;

    assert!(backend.notices().is_empty());
}
