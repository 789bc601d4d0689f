//! Transport factories and the process-wide default factory.

use std::fmt;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use super::config::RetryConfig;
use super::{HttpTransport, Transport};
use crate::Configuration;

/// Builds a [`Transport`] for one configuration snapshot.
///
/// Substituting the factory replaces the network layer while keeping the
/// request executor's URL and parsing logic intact, which is how tests run
/// the client without a network.
pub trait TransportFactory: Send + Sync + fmt::Debug {
    /// Create a transport for `config`.
    ///
    /// `base_client` is the shared HTTP client; implementations that do real
    /// I/O should reuse it to keep connection pooling effective.
    fn create(
        &self,
        config: Arc<Configuration>,
        debug: bool,
        base_client: reqwest::Client,
    ) -> Arc<dyn Transport>;
}

/// Factory producing [`HttpTransport`]s.
#[derive(Debug, Clone, Default)]
pub struct DefaultTransportFactory {
    retry: Option<RetryConfig>,
}

impl DefaultTransportFactory {
    /// Create a factory whose transports do not retry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make created transports retry according to `retry`.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = Some(retry);
        self
    }
}

impl TransportFactory for DefaultTransportFactory {
    fn create(
        &self,
        config: Arc<Configuration>,
        debug: bool,
        base_client: reqwest::Client,
    ) -> Arc<dyn Transport> {
        let transport = HttpTransport::new(config, debug, base_client);
        match &self.retry {
            Some(retry) => Arc::new(transport.with_retry(retry.clone())),
            None => Arc::new(transport),
        }
    }
}

static DEFAULT_FACTORY: LazyLock<RwLock<Arc<dyn TransportFactory>>> =
    LazyLock::new(|| RwLock::new(Arc::new(DefaultTransportFactory::new())));

/// The current process-wide default factory.
pub fn default_factory() -> Arc<dyn TransportFactory> {
    DEFAULT_FACTORY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Replace the process-wide default factory.
///
/// Executors without an injected factory pick the new default up on their
/// next request.
pub fn set_default_factory(factory: Arc<dyn TransportFactory>) {
    tracing::debug!(?factory, "replacing default transport factory");
    *DEFAULT_FACTORY
        .write()
        .unwrap_or_else(PoisonError::into_inner) = factory;
}

/// Restore the built-in [`DefaultTransportFactory`].
pub fn reset_default_factory() {
    set_default_factory(Arc::new(DefaultTransportFactory::new()));
}
