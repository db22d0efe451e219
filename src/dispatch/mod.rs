//! Notice dispatch: work items and the bounded asynchronous dispatcher.
//!
//! ## Contents
//! - [`Envelope`] a zero-argument, fallible unit of work
//! - [`BufferedWorker`] bounded queue plus one consumer task with panic isolation

mod envelope;
mod worker;

use std::any::Any;

pub use envelope::{Envelope, WorkFuture};
pub use worker::BufferedWorker;

/// Extracts a readable message from a `catch_unwind` payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
