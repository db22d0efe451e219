//! Shared test doubles: a scripted backend and a capturing logger.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use faultline::{
    Backend, BackendError, Diagnostic, DiagnosticKind, EventRecord, Feature, Logger, Payload,
};
use serde_json::{Map, json};

/// Backend that records every call and answers from a script.
///
/// When the script is empty every call succeeds.
#[derive(Default)]
pub struct ScriptedBackend {
    script: Mutex<VecDeque<Result<(), BackendError>>>,
    calls: Mutex<Vec<Vec<EventRecord>>>,
    notices: Mutex<Vec<Payload>>,
}

impl ScriptedBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Creates a backend whose first calls return `results`, in order.
    pub fn with_script(results: Vec<Result<(), BackendError>>) -> Arc<Self> {
        let backend = Self::default();
        backend.script.lock().unwrap().extend(results);
        Arc::new(backend)
    }

    /// Appends results to the script.
    pub fn then(&self, result: Result<(), BackendError>) {
        self.script.lock().unwrap().push_back(result);
    }

    /// Returns the `id` field of each record, per call.
    pub fn calls(&self) -> Vec<Vec<u64>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|batch| batch.iter().map(id_of).collect())
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn notices(&self) -> Vec<Payload> {
        self.notices.lock().unwrap().clone()
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    async fn notify(&self, _feature: Feature, payload: Payload) -> Result<(), BackendError> {
        self.notices.lock().unwrap().push(payload);
        Ok(())
    }

    async fn event(&self, records: &[EventRecord]) -> Result<(), BackendError> {
        self.calls.lock().unwrap().push(records.to_vec());
        self.script.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }
}

/// Logger that keeps every diagnostic.
#[derive(Default)]
pub struct CaptureLogger {
    entries: Mutex<Vec<Diagnostic>>,
}

impl CaptureLogger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn kinds(&self) -> Vec<DiagnosticKind> {
        self.entries.lock().unwrap().iter().map(|d| d.kind).collect()
    }

    pub fn of_kind(&self, kind: DiagnosticKind) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.kind == kind)
            .cloned()
            .collect()
    }
}

impl Logger for CaptureLogger {
    fn log(&self, diagnostic: &Diagnostic) {
        self.entries.lock().unwrap().push(diagnostic.clone());
    }
}

/// Builds a record carrying a numeric `id`.
pub fn record(id: u64) -> EventRecord {
    let mut data = Map::new();
    data.insert("id".into(), json!(id));
    EventRecord::new("test", data)
}

pub fn id_of(record: &EventRecord) -> u64 {
    record.get("id").and_then(|v| v.as_u64()).unwrap_or(u64::MAX)
}
