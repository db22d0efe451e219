//! # Delivery backend seam.
//!
//! The engines never talk to the network themselves. They call a [`Backend`], which
//! owns encoding, transport, per-request timeouts, and status-code mapping.
//!
//! ## Contract
//! - [`Backend::notify`] delivers one encoded notice; any error is logged by the dispatcher.
//! - [`Backend::event`] delivers one batch. Returning [`BackendError::RateExceeded`]
//!   throttles the events engine; any other error schedules a retry of the same batch.
//! - Calls are serialized per engine: at most one send is in flight at a time.
//! - A hung call delays the engine; enforce timeouts inside the backend.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use faultline::{Backend, BackendError, EventRecord, Feature, Payload};
//!
//! struct Stdout;
//!
//! #[async_trait]
//! impl Backend for Stdout {
//!     async fn notify(&self, feature: Feature, payload: Payload) -> Result<(), BackendError> {
//!         println!("{} {payload}", feature.endpoint());
//!         Ok(())
//!     }
//!
//!     async fn event(&self, records: &[EventRecord]) -> Result<(), BackendError> {
//!         for record in records {
//!             let line = serde_json::to_string(record).map_err(BackendError::transport)?;
//!             println!("{line}");
//!         }
//!         Ok(())
//!     }
//! }
//! ```

mod memory;

use async_trait::async_trait;

use crate::error::BackendError;
use crate::events::EventRecord;

pub use memory::MemoryBackend;

/// Encoded notice body handed to [`Backend::notify`].
pub type Payload = serde_json::Value;

/// Kind of payload delivered through [`Backend::notify`].
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// Error notices.
    Notices,
    /// Aggregated counter reports.
    Metrics,
}

impl Feature {
    /// Returns the collector endpoint segment for this feature.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Feature::Notices => "notices",
            Feature::Metrics => "metrics",
        }
    }
}

/// Remote collector, as seen by the engines.
#[async_trait]
pub trait Backend: Send + Sync + 'static {
    /// Delivers one encoded notice.
    async fn notify(&self, feature: Feature, payload: Payload) -> Result<(), BackendError>;

    /// Delivers one batch of event records, in order.
    async fn event(&self, records: &[EventRecord]) -> Result<(), BackendError>;
}
