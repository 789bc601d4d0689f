//! Generic request execution.
//!
//! [`RequestExecutor`] turns a typed request into a typed response:
//! resolve overrides, build the URL, pick a transport, perform the call,
//! classify the status and parse the body. Resource services call it with
//! an [`Endpoint`] and never build URLs or headers themselves.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use url::{form_urlencoded, Url};

use super::request::{ApiRequest, ResolvedOverrides};
use super::response::{ApiResponse, Response};
use crate::auth::Session;
use crate::error::{HttpError, NetworkError};
use crate::transport::{default_factory, Transport, TransportFactory, TransportRequest};
use crate::{Configuration, Error, Result};

/// Verb, path and query of one API operation.
///
/// # Example
///
/// ```
/// use checkout_api::client::Endpoint;
/// use checkout_api::Configuration;
///
/// let config = Configuration::builder("acme").build().unwrap();
/// let endpoint = Endpoint::get("/payment-methods").query("limit", "10");
/// assert_eq!(
///     endpoint.url_for(&config).unwrap().as_str(),
///     "https://sandbox.acme.api.checkout-gateway.com/payment-methods?limit=10"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
}

impl Endpoint {
    /// Create an endpoint.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
        }
    }

    /// A GET endpoint.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// A POST endpoint.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// A PUT endpoint.
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// A PATCH endpoint.
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    /// A DELETE endpoint.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Add a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// The HTTP verb.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The path, as declared.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Absolute URL of this endpoint for `config`.
    ///
    /// Path segments are percent-encoded, so `#` and `?` inside a segment
    /// reach the server. Query text declared after a `?` in the path is
    /// kept ahead of the pairs added with [`query`](Self::query).
    ///
    /// # Errors
    ///
    /// Returns [`Error::BadUrl`] if the configured base URL cannot carry a
    /// path.
    pub fn url_for(&self, config: &Configuration) -> Result<Url> {
        let base = config.base_url();
        let mut url = Url::parse(&base).map_err(|_| Error::BadUrl(base.clone()))?;

        let (path, declared_query) = match self.path.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (self.path.as_str(), None),
        };

        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| Error::BadUrl(base.clone()))?;
            segments.pop_if_empty();
            segments.extend(path.split('/').filter(|s| !s.is_empty()));
            if path.len() > 1 && path.ends_with('/') {
                segments.push("");
            }
        }

        let declared: Vec<(String, String)> = declared_query
            .map(|q| {
                form_urlencoded::parse(q.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default();

        if !declared.is_empty() || !self.query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(declared.iter())
                .extend_pairs(self.query.iter());
        }

        Ok(url)
    }
}

/// Where the executor gets its transport from.
#[derive(Clone)]
pub enum TransportSource {
    /// A fully configured transport, used as-is. Any factory is ignored.
    Direct(Arc<dyn Transport>),
    /// A factory asked for a fresh transport on every call.
    Factory(Arc<dyn TransportFactory>),
    /// The process-wide default factory.
    Default,
}

impl fmt::Debug for TransportSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportSource::Direct(transport) => {
                f.debug_tuple("Direct").field(transport).finish()
            }
            TransportSource::Factory(factory) => f.debug_tuple("Factory").field(factory).finish(),
            TransportSource::Default => f.write_str("Default"),
        }
    }
}

impl TransportSource {
    /// Resolve a direct transport and an optional factory; the direct
    /// transport wins when both are given.
    pub fn resolve(
        transport: Option<Arc<dyn Transport>>,
        factory: Option<Arc<dyn TransportFactory>>,
    ) -> Self {
        match (transport, factory) {
            (Some(transport), _) => TransportSource::Direct(transport),
            (None, Some(factory)) => TransportSource::Factory(factory),
            (None, None) => TransportSource::Default,
        }
    }
}

/// Executes typed requests against the API.
///
/// Cloning is cheap; clones share the session and the base HTTP client.
///
/// # Example
///
/// ```no_run
/// use checkout_api::client::{Endpoint, RequestExecutor, TransportSource};
/// use checkout_api::{Configuration, Session};
/// use serde_json::{json, Value};
///
/// # async fn example() -> checkout_api::Result<()> {
/// let session = Session::new(Configuration::builder("acme").token("sk_test").build()?);
/// let executor = RequestExecutor::new(session, TransportSource::Default, reqwest::Client::new());
///
/// let response = executor
///     .execute::<_, Value>(
///         &Endpoint::get("/payment-options"),
///         &json!({"currency": "USD", "bin": "42424242"}),
///     )
///     .await?;
/// println!("{:?} {}", response.id(), response.raw());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    session: Session,
    source: TransportSource,
    base_client: reqwest::Client,
    debug: bool,
}

impl RequestExecutor {
    /// Create an executor.
    pub fn new(session: Session, source: TransportSource, base_client: reqwest::Client) -> Self {
        Self {
            session,
            source,
            base_client,
            debug: false,
        }
    }

    /// Enable or disable debug diagnostics in created transports.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// The session this executor reads before every call.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The transport source.
    pub fn transport_source(&self) -> &TransportSource {
        &self.source
    }

    /// Execute `endpoint` with `request` as body (or query, for GET).
    pub async fn execute<R, T>(&self, endpoint: &Endpoint, request: &R) -> Result<ApiResponse<T>>
    where
        R: ApiRequest + ?Sized,
        T: Response,
    {
        let overrides = ResolvedOverrides::from_request(request);
        let body = serde_json::to_value(request)
            .map_err(|e| Error::Decoding(format!("Failed to serialize request body: {}", e)))?;
        self.run(endpoint, Some(body), overrides).await
    }

    /// Execute `endpoint` without a body.
    pub async fn execute_empty<T: Response>(&self, endpoint: &Endpoint) -> Result<ApiResponse<T>> {
        self.run(endpoint, None, ResolvedOverrides::default()).await
    }

    /// Execute on a background task and hand the result to `callback`.
    ///
    /// Success and failure are classified exactly as by
    /// [`execute`](Self::execute). Returns the task handle; aborting it
    /// cancels the request. Outside a Tokio runtime nothing is spawned: the
    /// callback receives a [`Error::Network`] immediately and `None` is
    /// returned.
    pub fn execute_with_callback<R, T, F>(
        &self,
        endpoint: Endpoint,
        request: R,
        callback: F,
    ) -> Option<JoinHandle<()>>
    where
        R: ApiRequest + 'static,
        T: Response + 'static,
        F: FnOnce(Result<ApiResponse<T>>) + Send + 'static,
    {
        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(err) => {
                tracing::warn!(path = %endpoint.path(), "no async runtime for callback request");
                callback(Err(Error::Network(NetworkError::new(err))));
                return None;
            }
        };

        let executor = self.clone();
        Some(handle.spawn(async move {
            let result = executor.execute::<R, T>(&endpoint, &request).await;
            callback(result);
        }))
    }

    /// Resolve the transport for one call.
    fn transport_for(&self, config: &Arc<Configuration>) -> Arc<dyn Transport> {
        match &self.source {
            TransportSource::Direct(transport) => transport.clone(),
            TransportSource::Factory(factory) => {
                factory.create(config.clone(), self.debug, self.base_client.clone())
            }
            TransportSource::Default => {
                default_factory().create(config.clone(), self.debug, self.base_client.clone())
            }
        }
    }

    async fn run<T: Response>(
        &self,
        endpoint: &Endpoint,
        body: Option<Value>,
        overrides: ResolvedOverrides,
    ) -> Result<ApiResponse<T>> {
        // The lock is released here; nothing below holds it across I/O.
        let config = self.session.current().await;

        let merchant_id = overrides
            .merchant_id
            .or_else(|| config.merchant_id().map(str::to_string));
        let timeout = overrides.timeout.unwrap_or_else(|| config.timeout());
        let url = endpoint.url_for(&config)?;

        let mut request = TransportRequest::new(String::from(url), endpoint.method().clone())
            .with_merchant_id(merchant_id)
            .with_timeout(Some(timeout));
        request.body = body;

        let transport = self.transport_for(&config);

        tracing::debug!(
            method = %endpoint.method(),
            path = %endpoint.path(),
            timeout_ms = timeout.as_millis() as u64,
            "executing request"
        );

        let response = perform_with_timeout(transport.as_ref(), request, timeout).await?;

        if !response.is_success() {
            let error = HttpError::from_response(response.status, response.body.as_bytes());
            tracing::debug!(status = response.status, code = ?error.code, "request failed");
            return Err(Error::Http(error));
        }

        ApiResponse::parse(response.body)
    }
}

async fn perform_with_timeout(
    transport: &dyn Transport,
    request: TransportRequest,
    timeout: Duration,
) -> Result<crate::transport::TransportResponse> {
    match tokio::time::timeout(timeout, transport.perform(request)).await {
        Ok(result) => result,
        Err(_) => Err(Error::Network(NetworkError::timeout(format!(
            "request timed out after {:.1}s",
            timeout.as_secs_f64()
        )))),
    }
}
