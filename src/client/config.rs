//! Client configuration.
//!
//! [`Configuration`] is the immutable snapshot every request reads: account
//! identifier, credentials, environment and default timeout. It is never
//! mutated in place; the `with_*` methods return a new value.
//! [`ClientOptions`] carries the knobs of the HTTP stack underneath.

use std::env;
use std::fmt;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::transport::RetryConfig;
use crate::{Environment, Error, Result};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default API domain the account instance is prefixed onto.
pub const DEFAULT_API_DOMAIN: &str = "api.checkout-gateway.com";

/// Immutable configuration snapshot.
///
/// # Example
///
/// ```
/// use checkout_api::{Configuration, Environment};
///
/// let config = Configuration::builder("acme")
///     .token("sk_test_123")
///     .environment(Environment::Sandbox)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.instance(), "sandbox.acme");
/// assert_eq!(config.timeout_secs(), 30.0);
/// ```
#[derive(Clone)]
pub struct Configuration {
    account_id: String,
    token: Option<SecretString>,
    merchant_id: Option<String>,
    environment: Environment,
    timeout: Duration,
    api_domain: String,
    base_url_override: Option<String>,
}

impl Configuration {
    /// Start building a configuration for the given account identifier.
    pub fn builder(account_id: impl Into<String>) -> ConfigurationBuilder {
        ConfigurationBuilder::new(account_id)
    }

    /// Create a configuration with defaults for everything but the account.
    pub fn new(account_id: impl Into<String>, environment: Environment) -> Result<Self> {
        Self::builder(account_id).environment(environment).build()
    }

    /// Load a configuration from `CHECKOUT_*` environment variables.
    ///
    /// | Variable | Meaning |
    /// |---|---|
    /// | `CHECKOUT_ACCOUNT_ID` | account identifier (required) |
    /// | `CHECKOUT_API_TOKEN` | bearer token |
    /// | `CHECKOUT_MERCHANT_ID` | merchant account header value |
    /// | `CHECKOUT_ENVIRONMENT` | `sandbox` (default) or `production` |
    /// | `CHECKOUT_TIMEOUT_SECS` | default timeout in seconds |
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let account_id = lookup("CHECKOUT_ACCOUNT_ID").ok_or(Error::InvalidIdentifier)?;
        let mut builder = Self::builder(account_id);

        if let Some(token) = lookup("CHECKOUT_API_TOKEN") {
            builder = builder.token(token);
        }
        if let Some(merchant_id) = lookup("CHECKOUT_MERCHANT_ID") {
            builder = builder.merchant_id(merchant_id);
        }
        if let Some(environment) = lookup("CHECKOUT_ENVIRONMENT") {
            builder = builder.environment(environment.parse()?);
        }
        if let Some(secs) = lookup("CHECKOUT_TIMEOUT_SECS") {
            let timeout = secs
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
                .ok_or_else(|| {
                    Error::Decoding(format!(
                        "invalid configuration: CHECKOUT_TIMEOUT_SECS '{}' is not a number of seconds",
                        secs
                    ))
                })?;
            builder = builder.timeout(timeout);
        }

        builder.build()
    }

    /// The merchant account identifier.
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// The bearer token, if one is configured.
    pub fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    /// Returns `true` if a bearer token is configured.
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// The secondary merchant id sent in the merchant account header.
    pub fn merchant_id(&self) -> Option<&str> {
        self.merchant_id.as_deref()
    }

    /// The target environment.
    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Default request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Default request timeout in seconds.
    pub fn timeout_secs(&self) -> f64 {
        self.timeout.as_secs_f64()
    }

    /// The API domain the instance is prefixed onto.
    pub fn api_domain(&self) -> &str {
        &self.api_domain
    }

    /// Host segment for this account: `sandbox.{id}` in the sandbox,
    /// `{id}` in production.
    pub fn instance(&self) -> String {
        match self.environment {
            Environment::Sandbox => format!("sandbox.{}", self.account_id),
            Environment::Production => self.account_id.clone(),
        }
    }

    /// Base URL requests are resolved against, without a trailing slash.
    pub fn base_url(&self) -> String {
        match &self.base_url_override {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}.{}", self.instance(), self.api_domain),
        }
    }

    /// A copy with a different token.
    pub fn with_token(&self, token: Option<String>) -> Self {
        Self {
            token: token.map(SecretString::from),
            ..self.clone()
        }
    }

    /// A copy with a different merchant id.
    pub fn with_merchant_id(&self, merchant_id: Option<String>) -> Self {
        Self {
            merchant_id,
            ..self.clone()
        }
    }

    /// A copy targeting a different environment.
    pub fn with_environment(&self, environment: Environment) -> Self {
        Self {
            environment,
            ..self.clone()
        }
    }

    /// A copy with a different default timeout.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            timeout,
            ..self.clone()
        }
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("account_id", &self.account_id)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("merchant_id", &self.merchant_id)
            .field("environment", &self.environment)
            .field("timeout", &self.timeout)
            .field("base_url", &self.base_url())
            .finish()
    }
}

/// Builder for [`Configuration`].
#[derive(Debug, Clone)]
pub struct ConfigurationBuilder {
    account_id: String,
    token: Option<String>,
    merchant_id: Option<String>,
    environment: Environment,
    timeout: Duration,
    api_domain: String,
    base_url_override: Option<String>,
}

impl ConfigurationBuilder {
    /// Create a builder for the given account identifier.
    pub fn new(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            token: None,
            merchant_id: None,
            environment: Environment::default(),
            timeout: DEFAULT_TIMEOUT,
            api_domain: DEFAULT_API_DOMAIN.to_string(),
            base_url_override: None,
        }
    }

    /// Set the bearer token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the merchant id sent in the merchant account header.
    pub fn merchant_id(mut self, merchant_id: impl Into<String>) -> Self {
        self.merchant_id = Some(merchant_id.into());
        self
    }

    /// Set the target environment.
    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Set the default request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use a different API domain.
    pub fn api_domain(mut self, domain: impl Into<String>) -> Self {
        self.api_domain = domain.into();
        self
    }

    /// Send every request to `url` instead of the account instance host.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url_override = Some(url.into());
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentifier`] if the account identifier is
    /// empty or cannot be used as a host label.
    pub fn build(self) -> Result<Configuration> {
        let account_id = self.account_id.trim().to_string();
        validate_account_id(&account_id)?;

        Ok(Configuration {
            account_id,
            token: self.token.map(SecretString::from),
            merchant_id: self.merchant_id,
            environment: self.environment,
            timeout: self.timeout,
            api_domain: self.api_domain,
            base_url_override: self.base_url_override,
        })
    }
}

/// Account ids become a DNS label of the API host.
fn validate_account_id(id: &str) -> Result<()> {
    let valid = !id.is_empty()
        && id.len() <= 63
        && !id.starts_with('-')
        && !id.ends_with('-')
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');

    if valid {
        Ok(())
    } else {
        Err(Error::InvalidIdentifier)
    }
}

/// Token text, for header construction.
pub(crate) fn expose_token(config: &Configuration) -> Option<&str> {
    config.token.as_ref().map(|t| t.expose_secret())
}

/// Options for the HTTP stack underneath the client.
///
/// # Example
///
/// ```
/// use checkout_api::ClientOptions;
/// use std::time::Duration;
///
/// let options = ClientOptions::default()
///     .with_connect_timeout(Duration::from_secs(5))
///     .with_user_agent("my-shop/1.0")
///     .with_debug(true);
/// ```
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// User-Agent header value
    pub user_agent: String,
    /// TCP connect timeout
    pub connect_timeout: Duration,
    /// Transport-level retry policy used by the default transport factory
    pub retry: RetryConfig,
    /// Log request and response diagnostics
    pub debug: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            user_agent: format!("checkout-api-rs/{} (Rust)", env!("CARGO_PKG_VERSION")),
            connect_timeout: Duration::from_secs(10),
            retry: RetryConfig::no_retry(),
            debug: false,
        }
    }
}

impl ClientOptions {
    /// Create options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the User-Agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the retry configuration.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Enable or disable debug diagnostics.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Build the base `reqwest` client these options describe.
    pub fn build_http_client(&self) -> Result<reqwest::Client> {
        Ok(reqwest::Client::builder()
            .user_agent(&self.user_agent)
            .connect_timeout(self.connect_timeout)
            .build()?)
    }
}
