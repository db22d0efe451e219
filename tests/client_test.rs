//! End-to-end tests for the client facade.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{CaptureLogger, ScriptedBackend, record};
use faultline::{Client, Config, DiagnosticKind, EVENT_TYPE_KEY, Feature, MemoryBackend, Notice};
use serde_json::{Map, json};

fn context(pairs: &[(&str, serde_json::Value)]) -> Map<String, serde_json::Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

#[tokio::test]
async fn notice_carries_client_context_and_environment() {
    let backend = Arc::new(MemoryBackend::new());
    let cfg = Config {
        environment: Some("production".into()),
        ..Config::default()
    };
    let client = Client::builder(cfg, backend.clone()).build();

    client.set_context(context(&[("user", json!(1)), ("region", json!("eu"))]));
    let notice =
        Notice::from_message("charge declined").with_context(context(&[("user", json!(2))]));
    let token = client.notify(notice);
    client.flush().await;

    let notices = backend.notices();
    assert_eq!(notices.len(), 1);
    let (feature, payload) = &notices[0];
    assert_eq!(*feature, Feature::Notices);
    assert_eq!(payload["token"], json!(token.to_string()));
    assert_eq!(payload["error_message"], json!("charge declined"));
    assert_eq!(payload["environment"], json!("production"));
    assert_eq!(payload["context"]["user"], json!(2), "notice keys win");
    assert_eq!(payload["context"]["region"], json!("eu"));

    client.stop().await;
}

#[tokio::test]
async fn cleared_context_is_not_attached() {
    let backend = Arc::new(MemoryBackend::new());
    let client = Client::builder(Config::default(), backend.clone()).build();

    client.set_context(context(&[("user", json!(1))]));
    client.clear_context();
    client.notify(Notice::from_message("boom"));
    client.flush().await;

    let notices = backend.notices();
    assert_eq!(notices[0].1["context"], json!({}));
    client.stop().await;
}

#[tokio::test]
async fn events_are_batched_to_backend() {
    let backend = ScriptedBackend::new();
    let cfg = Config {
        events_batch_size: 2,
        ..Config::default()
    };
    let client = Client::builder(cfg, backend.clone()).build();

    let mut data = Map::new();
    data.insert("id".into(), json!(1));
    client.event("signup", data);
    let mut data = Map::new();
    data.insert("id".into(), json!(2));
    client.event("signup", data);
    client.flush().await;

    assert_eq!(backend.calls(), vec![vec![1, 2]]);
    client.stop().await;
}

#[tokio::test]
async fn stop_delivers_everything_submitted() {
    let backend = Arc::new(MemoryBackend::new());
    let client = Client::builder(Config::default(), backend.clone()).build();

    client.notify_error(&std::io::Error::other("disk full"));
    client.event("job_finished", Map::new());
    client.stop().await;

    assert_eq!(backend.notices().len(), 1);
    let events = backend.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].get(EVENT_TYPE_KEY), Some(&json!("job_finished")));
}

#[tokio::test]
async fn notice_overflow_is_logged_not_raised() {
    let backend = Arc::new(MemoryBackend::new());
    let logger = CaptureLogger::new();
    let cfg = Config {
        notice_queue_capacity: 1,
        ..Config::default()
    };
    let client = Client::builder(cfg, backend.clone())
        .with_logger(logger.clone())
        .build();

    // No yield between the two calls: the single slot is still taken.
    client.notify(Notice::from_message("first"));
    client.notify(Notice::from_message("second"));
    client.flush().await;

    assert_eq!(backend.notices().len(), 1);
    let overflow = logger.of_kind(DiagnosticKind::NoticeOverflow);
    assert_eq!(overflow.len(), 1);
    assert_eq!(overflow[0].reason.as_deref(), Some("full"));

    client.stop().await;
    client.notify(Notice::from_message("late"));
    let overflow = logger.of_kind(DiagnosticKind::NoticeOverflow);
    assert_eq!(overflow.len(), 2);
    assert_eq!(overflow[1].reason.as_deref(), Some("closed"));
}

#[tokio::test(start_paused = true)]
async fn parent_token_stops_events_engine() {
    let backend = ScriptedBackend::new();
    let cfg = Config {
        events_timeout: Duration::from_secs(3600),
        ..Config::default()
    };
    let parent = cfg.token.clone();
    let client = Client::builder(cfg, backend.clone()).build();

    client.event("test", record(9).into_data());
    tokio::time::sleep(Duration::from_millis(1)).await;
    parent.cancel();
    client.stop().await;

    let calls = backend.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0], vec![9]);
}
