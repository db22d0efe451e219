//! Telemetry events: data model, ring buffer, and the delivery engine.
//!
//! This module groups the event **data model** and the **engine** that batches
//! records and delivers them to the [`Backend`](crate::Backend).
//!
//! ## Contents
//! - [`EventRecord`], [`Batch`] records and send units
//! - [`RingBuffer`] fixed-capacity holding area, owned by the consumer task
//! - [`EventsWorker`] producer handle; the consumer loop lives in `runner`
//!
//! ## Quick reference
//! - **Producers**: application code via `EventsWorker::push` / `Client::event`.
//! - **Consumer**: one task per engine; the only place engine state is mutated.
//! - **Triggers for a send**: batch size reached, periodic tick, explicit flush,
//!   throttle expiry, shutdown.

mod record;
mod ring;
mod runner;
mod worker;

pub use record::{Batch, EVENT_TYPE_KEY, EventRecord, TIMESTAMP_KEY};
pub use ring::RingBuffer;
pub use worker::EventsWorker;
