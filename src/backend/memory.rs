//! In-memory backend for tests and local development.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::backend::{Backend, Feature, Payload};
use crate::error::BackendError;
use crate::events::EventRecord;

/// Backend that keeps every delivered payload in memory.
///
/// Always succeeds. Notices and events are stored in arrival order; the
/// batch boundaries of events are not kept.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    notices: Mutex<Vec<(Feature, Payload)>>,
    events: Mutex<Vec<EventRecord>>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the delivered notices.
    pub fn notices(&self) -> Vec<(Feature, Payload)> {
        lock(&self.notices).clone()
    }

    /// Returns a copy of the delivered event records.
    pub fn events(&self) -> Vec<EventRecord> {
        lock(&self.events).clone()
    }

    /// Forgets everything delivered so far.
    pub fn reset(&self) {
        lock(&self.notices).clear();
        lock(&self.events).clear();
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn notify(&self, feature: Feature, payload: Payload) -> Result<(), BackendError> {
        lock(&self.notices).push((feature, payload));
        Ok(())
    }

    async fn event(&self, records: &[EventRecord]) -> Result<(), BackendError> {
        lock(&self.events).extend_from_slice(records);
        Ok(())
    }
}

/// Locks `m`, recovering the data if a previous holder panicked.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
