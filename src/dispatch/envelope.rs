//! # Work items for the dispatcher.
//!
//! [`Envelope`] wraps a closure `F: FnOnce() -> Fut`, producing the future only when
//! the consumer task picks the item up. Building the future inside the consumer means
//! a panic in the closure itself is contained the same way as a panic while polling.
//!
//! ## Example
//! ```rust
//! use faultline::Envelope;
//!
//! let work = Envelope::new(|| async {
//!     // deliver something...
//!     Ok(())
//! });
//! # let _ = work;
//! ```

use std::fmt;
use std::future::Future;

use futures::FutureExt;
use futures::future::BoxFuture;

/// Future produced by an [`Envelope`].
pub type WorkFuture = BoxFuture<'static, anyhow::Result<()>>;

/// A zero-argument, fallible unit of work.
pub struct Envelope {
    f: Box<dyn FnOnce() -> WorkFuture + Send + 'static>,
}

impl Envelope {
    /// Wraps a closure that creates the work future.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self {
            f: Box::new(move || f().boxed()),
        }
    }

    /// Consumes the envelope and returns a future that runs the work.
    ///
    /// The closure is invoked on first poll, not here.
    pub(crate) fn into_future(self) -> WorkFuture {
        let f = self.f;
        Box::pin(async move { f().await })
    }
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope").finish_non_exhaustive()
    }
}
