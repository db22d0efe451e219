//! Client core: configuration, builder, and the application-facing client.
//!
//! The public API from this module is [`Config`], [`ClientBuilder`], and [`Client`].
//!
//! Internal modules:
//! - [`config`]: engine knobs and their sentinel accessors;
//! - [`builder`]: injects backend and logger, starts both engines;
//! - [`client`]: notice/event submission, context, flush and stop fan-out.

mod builder;
mod client;
mod config;

pub use builder::ClientBuilder;
pub use client::Client;
pub use config::Config;
