//! The client facade.

use std::sync::Arc;

use crate::auth::Session;
use crate::transport::{DefaultTransportFactory, Transport, TransportFactory};
use crate::{Configuration, Environment, Result};

use super::config::ClientOptions;
use super::executor::{RequestExecutor, TransportSource};

/// The main entry point of the library.
///
/// The client owns the [`Session`] and a [`RequestExecutor`]. Resource
/// services are built on top of [`executor`](Self::executor).
///
/// # Example
///
/// ```no_run
/// use checkout_api::{CheckoutClient, Configuration, Environment};
/// use checkout_api::client::Endpoint;
/// use serde_json::Value;
///
/// # async fn example() -> checkout_api::Result<()> {
/// let config = Configuration::builder("acme")
///     .token("sk_test_123")
///     .environment(Environment::Sandbox)
///     .build()?;
/// let client = CheckoutClient::new(config)?;
///
/// let methods = client
///     .executor()
///     .execute_empty::<Value>(&Endpoint::get("/payment-methods"))
///     .await?;
/// println!("{}", methods.raw());
///
/// // Rotate credentials; the next request picks them up.
/// client.replace_token(Some("sk_test_456".to_string())).await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CheckoutClient {
    executor: RequestExecutor,
    options: ClientOptions,
}

impl CheckoutClient {
    /// Create a client with default options and the default transport.
    pub fn new(config: Configuration) -> Result<Self> {
        Self::builder(config).build()
    }

    /// Create a client from `CHECKOUT_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(Configuration::from_env()?)
    }

    /// Start building a client.
    pub fn builder(config: Configuration) -> CheckoutClientBuilder {
        CheckoutClientBuilder::new(config)
    }

    /// The request executor resource services call into.
    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    /// The session holding the current configuration.
    pub fn session(&self) -> &Session {
        self.executor.session()
    }

    /// The options this client was built with.
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Snapshot of the current configuration.
    pub async fn configuration(&self) -> Arc<Configuration> {
        self.session().current().await
    }

    /// Get the current environment.
    pub async fn environment(&self) -> Environment {
        self.session().environment().await
    }

    /// Replace the bearer token used by subsequent requests.
    pub async fn replace_token(&self, token: Option<String>) {
        self.session().replace_token(token).await;
    }

    /// Replace the merchant id used by subsequent requests.
    pub async fn replace_merchant_id(&self, merchant_id: Option<String>) {
        self.session().replace_merchant_id(merchant_id).await;
    }
}

/// Builder for [`CheckoutClient`].
///
/// A transport given with [`with_transport`](Self::with_transport) takes
/// precedence over any factory; the factory is then never invoked.
///
/// The retry policy in [`ClientOptions`] only configures the built-in
/// factory. With an injected transport or factory it has no effect and
/// `build` logs a warning. [`with_debug`](Self::with_debug) wins over the
/// `debug` flag of options given before or after it.
#[derive(Debug)]
pub struct CheckoutClientBuilder {
    config: Configuration,
    options: ClientOptions,
    debug: Option<bool>,
    transport: Option<Arc<dyn Transport>>,
    factory: Option<Arc<dyn TransportFactory>>,
    http_client: Option<reqwest::Client>,
}

impl CheckoutClientBuilder {
    /// Create a builder.
    pub fn new(config: Configuration) -> Self {
        Self {
            config,
            options: ClientOptions::default(),
            debug: None,
            transport: None,
            factory: None,
            http_client: None,
        }
    }

    /// Set the client options.
    pub fn with_options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    /// Enable or disable debug diagnostics.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = Some(debug);
        self
    }

    /// Use a fully configured transport for every request.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build transports with `factory` instead of the default factory.
    pub fn with_transport_factory(mut self, factory: Arc<dyn TransportFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Share an existing `reqwest` client instead of building one from the
    /// options.
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<CheckoutClient> {
        let mut options = self.options;
        if let Some(debug) = self.debug {
            options.debug = debug;
        }

        let base_client = match self.http_client {
            Some(client) => client,
            None => options.build_http_client()?,
        };

        let retry_requested = options.retry.max_retries > 0;
        if retry_requested && (self.transport.is_some() || self.factory.is_some()) {
            tracing::warn!(
                max_retries = options.retry.max_retries,
                "retry options ignored: an injected transport or factory is in use"
            );
        }

        // A retry policy in the options applies when the built-in factory is used.
        let factory = match self.factory {
            Some(factory) => Some(factory),
            None if retry_requested => Some(Arc::new(
                DefaultTransportFactory::new().with_retry(options.retry.clone()),
            )
                as Arc<dyn TransportFactory>),
            None => None,
        };

        let source = TransportSource::resolve(self.transport, factory);
        tracing::debug!(?source, environment = %self.config.environment(), "building checkout client");

        let executor = RequestExecutor::new(Session::new(self.config), source, base_client)
            .with_debug(options.debug);

        Ok(CheckoutClient { executor, options })
    }
}
