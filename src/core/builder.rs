use std::sync::Arc;

use crate::{
    backend::Backend,
    core::Config,
    diagnostics::{LogWriter, Logger},
};

use super::client::Client;

/// Builder for constructing a [`Client`] with injected collaborators.
pub struct ClientBuilder {
    cfg: Config,
    backend: Arc<dyn Backend>,
    logger: Arc<dyn Logger>,
}

impl ClientBuilder {
    /// Creates a new builder with the given configuration and backend.
    ///
    /// The logger defaults to [`LogWriter`].
    pub fn new(cfg: Config, backend: Arc<dyn Backend>) -> Self {
        Self {
            cfg,
            backend,
            logger: Arc::new(LogWriter::new()),
        }
    }

    /// Sets the diagnostic sink shared by both engines.
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Builds the client and starts both engines.
    ///
    /// Must be called from within a tokio runtime:
    /// - Notice dispatcher (capacity from [`Config::notice_queue_capacity`])
    /// - Events engine (child of [`Config::token`])
    pub fn build(self) -> Client {
        Client::new_internal(self.cfg, self.backend, self.logger)
    }
}
