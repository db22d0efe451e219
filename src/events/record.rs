//! # Event records and batches.
//!
//! An [`EventRecord`] is one telemetry event: an ordered key→value mapping with
//! `event_type` and `ts` up front, followed by the user fields in insertion order.
//! A [`Batch`] groups drained records together with the number of failed send attempts.
//!
//! ## Ownership
//! ```text
//! Client::event() ──► EventRecord ──► RingBuffer ──► Batch ──► Backend::event(&[EventRecord])
//!                      (moved)         (moved)      (moved)      (borrowed per attempt)
//! ```
//! A record is owned by exactly one structure at a time. The backend only borrows
//! a batch, so the content of a retried batch is identical across attempts.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key holding the event type.
pub const EVENT_TYPE_KEY: &str = "event_type";
/// Key holding the RFC 3339 timestamp.
pub const TIMESTAMP_KEY: &str = "ts";

/// A single telemetry event.
///
/// Serializes transparently as its underlying JSON object.
///
/// # Example
/// ```rust
/// use serde_json::{json, Map};
/// use faultline::EventRecord;
///
/// let mut data = Map::new();
/// data.insert("user_id".into(), json!(42));
///
/// let record = EventRecord::new("signup", data);
/// assert_eq!(record.event_type(), Some("signup"));
/// assert!(record.ts().is_some());
/// assert_eq!(record.get("user_id"), Some(&json!(42)));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventRecord {
    data: Map<String, Value>,
}

impl EventRecord {
    /// Creates a record of the given type.
    ///
    /// - `event_type` always wins over an `event_type` key in `data`.
    /// - `ts` is taken from `data` when present, otherwise stamped with the current UTC time.
    pub fn new(event_type: impl Into<String>, data: Map<String, Value>) -> Self {
        let mut record = Map::with_capacity(data.len() + 2);
        record.insert(EVENT_TYPE_KEY.to_string(), Value::String(event_type.into()));

        let ts = data.get(TIMESTAMP_KEY).cloned().unwrap_or_else(|| {
            Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true))
        });
        record.insert(TIMESTAMP_KEY.to_string(), ts);

        for (key, value) in data {
            if key != EVENT_TYPE_KEY && key != TIMESTAMP_KEY {
                record.insert(key, value);
            }
        }
        Self { data: record }
    }

    /// Returns the event type.
    pub fn event_type(&self) -> Option<&str> {
        self.data.get(EVENT_TYPE_KEY).and_then(Value::as_str)
    }

    /// Returns the timestamp, if it is a string.
    pub fn ts(&self) -> Option<&str> {
        self.data.get(TIMESTAMP_KEY).and_then(Value::as_str)
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Returns the full mapping.
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Consumes the record and returns the full mapping.
    pub fn into_data(self) -> Map<String, Value> {
        self.data
    }
}

/// An ordered group of records sent together, plus its failed attempt count.
#[derive(Clone, Debug)]
pub struct Batch {
    records: Vec<EventRecord>,
    attempts: u32,
}

impl Batch {
    /// Creates a fresh batch (`attempts = 0`).
    pub fn new(records: Vec<EventRecord>) -> Self {
        Self {
            records,
            attempts: 0,
        }
    }

    /// Returns the records in insertion order.
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Returns the number of failed attempts so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the batch holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records one failed attempt and returns the new count.
    pub(crate) fn record_failure(&mut self) -> u32 {
        self.attempts = self.attempts.saturating_add(1);
        self.attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_type_and_ts_lead_user_fields() {
        let record = EventRecord::new("checkout", fields(&[("b", json!(2)), ("a", json!(1))]));
        let keys: Vec<&str> = record.data().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["event_type", "ts", "b", "a"]);
    }

    #[test]
    fn test_event_type_argument_wins() {
        let record = EventRecord::new("real", fields(&[("event_type", json!("fake"))]));
        assert_eq!(record.event_type(), Some("real"));
    }

    #[test]
    fn test_user_timestamp_is_kept() {
        let record = EventRecord::new("tick", fields(&[("ts", json!("2024-01-01T00:00:00Z"))]));
        assert_eq!(record.ts(), Some("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn test_generated_timestamp_is_rfc3339_utc() {
        let record = EventRecord::new("tick", Map::new());
        let ts = record.ts().unwrap();
        assert!(ts.ends_with('Z'), "{ts}");
        assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let record = EventRecord::new("x", fields(&[("ts", json!("t")), ("k", json!(true))]));
        let encoded = serde_json::to_string(&record).unwrap();
        assert_eq!(encoded, r#"{"event_type":"x","ts":"t","k":true}"#);
    }

    #[test]
    fn test_batch_counts_failures() {
        let mut batch = Batch::new(vec![EventRecord::new("x", Map::new())]);
        assert_eq!(batch.attempts(), 0);
        assert_eq!(batch.record_failure(), 1);
        assert_eq!(batch.record_failure(), 2);
        assert_eq!(batch.len(), 1);
    }
}
