//! HTTP transport implementation using reqwest.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use url::Url;

use super::config::{AttemptOutcome, RetryConfig};
use super::query::fold_into_query;
use super::{Transport, TransportRequest, TransportResponse};
use crate::client::config::expose_token;
use crate::error::NetworkError;
use crate::{Configuration, Error, Result};

/// Header carrying the merchant account a request acts for.
pub const MERCHANT_ACCOUNT_HEADER: &str = "X-Merchant-Account";

/// Validates that `url` is a non-empty HTTP(S) URL.
pub fn validate_url(url: &str) -> Result<Url> {
    if url.trim().is_empty() {
        return Err(Error::BadUrl(url.to_string()));
    }

    let parsed = Url::parse(url).map_err(|_| Error::BadUrl(url.to_string()))?;
    match parsed.scheme() {
        "http" | "https" if parsed.has_host() => Ok(parsed),
        _ => Err(Error::BadUrl(url.to_string())),
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| {
        Error::Network(NetworkError::message(format!(
            "invalid value for header {}",
            name
        )))
    })
}

/// Transport backed by a [`reqwest::Client`].
///
/// The configuration snapshot supplies the bearer token, the default
/// merchant id and the default timeout. Requests are built by
/// [`build_request`](Self::build_request), which can be inspected without
/// performing any I/O.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use checkout_api::transport::{HttpTransport, TransportRequest};
/// use checkout_api::Configuration;
/// use reqwest::Method;
/// use serde_json::json;
///
/// let config = Arc::new(Configuration::builder("acme").build().unwrap());
/// let transport = HttpTransport::new(config, false, reqwest::Client::new());
///
/// let request = TransportRequest::new("https://x.test/payment-options", Method::GET)
///     .with_json(json!({"currency": "USD", "bin": "42424242"}));
/// let built = transport.build_request(&request).unwrap();
/// assert_eq!(built.url().query(), Some("currency=USD&bin=42424242"));
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    config: Arc<Configuration>,
    debug: bool,
    client: reqwest::Client,
    retry: RetryConfig,
}

impl HttpTransport {
    /// Create a transport without retries.
    pub fn new(config: Arc<Configuration>, debug: bool, client: reqwest::Client) -> Self {
        Self {
            config,
            debug,
            client,
            retry: RetryConfig::no_retry(),
        }
    }

    /// Set the retry configuration.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// The configuration snapshot this transport was built from.
    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    /// Returns `true` if debug diagnostics are enabled.
    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Build request headers.
    fn build_headers(&self, merchant_id: Option<&str>, has_payload: bool) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if has_payload {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        if let Some(token) = expose_token(&self.config) {
            headers.insert(
                AUTHORIZATION,
                header_value("Authorization", &format!("Bearer {}", token))?,
            );
        }

        if let Some(merchant_id) = merchant_id {
            headers.insert(
                HeaderName::from_static("x-merchant-account"),
                header_value(MERCHANT_ACCOUNT_HEADER, merchant_id)?,
            );
        }

        Ok(headers)
    }

    /// Build the outgoing request without sending it.
    ///
    /// GET bodies are folded into the query string; every other verb sends
    /// the body as JSON.
    pub fn build_request(&self, request: &TransportRequest) -> Result<reqwest::Request> {
        let mut url = validate_url(&request.url)?;

        let is_get = request.method == Method::GET;
        let payload = match (&request.body, is_get) {
            (Some(body), true) => {
                fold_into_query(&mut url, body)?;
                None
            }
            (Some(body), false) => Some(serde_json::to_vec(body).map_err(|e| {
                Error::Decoding(format!("Failed to serialize request body: {}", e))
            })?),
            (None, _) => None,
        };

        let merchant_id = request
            .merchant_id
            .as_deref()
            .or_else(|| self.config.merchant_id());
        let headers = self.build_headers(merchant_id, payload.is_some())?;
        let timeout = request.timeout.unwrap_or_else(|| self.config.timeout());

        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .headers(headers)
            .timeout(timeout);
        if let Some(payload) = payload {
            builder = builder.body(payload);
        }

        Ok(builder.build()?)
    }

    async fn send_once(&self, request: reqwest::Request) -> Result<TransportResponse> {
        let method = request.method().clone();
        let url = request.url().clone();

        if self.debug {
            let body = request
                .body()
                .and_then(|b| b.as_bytes())
                .map(String::from_utf8_lossy);
            tracing::debug!(%method, %url, body = ?body, "sending request");
        } else {
            tracing::trace!(%method, %url, "sending request");
        }

        let response = self.client.execute(request).await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        if self.debug {
            tracing::debug!(%method, %url, status, body = %body, "received response");
        } else {
            tracing::trace!(%method, %url, status, "received response");
        }

        Ok(TransportResponse { status, body })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn perform(&self, request: TransportRequest) -> Result<TransportResponse> {
        let prepared = self.build_request(&request)?;
        let mut attempt = 0;

        loop {
            let outgoing = prepared.try_clone().ok_or_else(|| {
                Error::Network(NetworkError::message("request body cannot be replayed"))
            })?;
            let result = self.send_once(outgoing).await;

            let outcome = match &result {
                Ok(response) => AttemptOutcome::Status(response.status),
                Err(Error::Network(_)) => AttemptOutcome::NetworkFailure,
                Err(_) => return result,
            };

            if let Some(backoff) = self.retry.next_backoff(&request.method, attempt, outcome) {
                tracing::warn!(
                    url = %request.url,
                    attempt = attempt + 1,
                    ?outcome,
                    backoff_ms = backoff.as_millis() as u64,
                    "retrying request"
                );
                tokio::time::sleep(backoff).await;
                attempt += 1;
                continue;
            }

            return result;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use serde_json::json;

    fn transport(config: Configuration) -> HttpTransport {
        HttpTransport::new(Arc::new(config), false, reqwest::Client::new())
    }

    fn config() -> Configuration {
        Configuration::builder("acme")
            .token("sk_test_123")
            .merchant_id("merchant-default")
            .build()
            .unwrap()
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://sandbox.acme.api.test/x").is_ok());
        assert!(validate_url("http://127.0.0.1:8080/x").is_ok());

        for bad in ["", "   ", "ftp://files.test/x", "not a url", "file:///etc/passwd", "mailto:a@b.c"] {
            assert_eq!(
                validate_url(bad).unwrap_err(),
                Error::BadUrl(bad.to_string()),
                "url {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_get_folds_body_into_query() {
        let request = TransportRequest::new("https://x.test/payment-options", Method::GET)
            .with_json(json!({"currency": "USD", "bin": "42424242"}));
        let built = transport(config()).build_request(&request).unwrap();

        assert_eq!(built.url().query(), Some("currency=USD&bin=42424242"));
        assert!(built.body().is_none());
        assert!(built.headers().get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_post_sends_json_body() {
        let request = TransportRequest::new("https://x.test/checkout-sessions", Method::POST)
            .with_json(json!({"amount": 1000, "currency": "EUR"}));
        let built = transport(config()).build_request(&request).unwrap();

        assert_eq!(built.url().query(), None);
        let body = built.body().and_then(|b| b.as_bytes()).unwrap();
        assert_eq!(
            serde_json::from_slice::<serde_json::Value>(body).unwrap(),
            json!({"amount": 1000, "currency": "EUR"})
        );
        assert_eq!(built.headers()[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn test_auth_and_merchant_headers() {
        let request = TransportRequest::new("https://x.test/p", Method::GET);
        let built = transport(config()).build_request(&request).unwrap();

        assert_eq!(built.headers()[AUTHORIZATION], "Bearer sk_test_123");
        assert_eq!(built.headers()[MERCHANT_ACCOUNT_HEADER], "merchant-default");
        assert_eq!(built.headers()[ACCEPT], "application/json");
    }

    #[test]
    fn test_overrides_take_precedence() {
        let request = TransportRequest::new("https://x.test/p", Method::DELETE)
            .with_merchant_id(Some("merchant-override".into()))
            .with_timeout(Some(Duration::from_secs(5)));
        let built = transport(config()).build_request(&request).unwrap();

        assert_eq!(built.headers()[MERCHANT_ACCOUNT_HEADER], "merchant-override");
        assert_eq!(built.timeout(), Some(&Duration::from_secs(5)));
    }

    #[test]
    fn test_headers_omitted_without_credentials() {
        let bare = Configuration::builder("acme").build().unwrap();
        let request = TransportRequest::new("https://x.test/p", Method::GET);
        let built = transport(bare).build_request(&request).unwrap();

        assert!(built.headers().get(AUTHORIZATION).is_none());
        assert!(built.headers().get(MERCHANT_ACCOUNT_HEADER).is_none());
        assert_eq!(built.timeout(), Some(&Duration::from_secs(30)));
    }

    #[tokio::test]
    async fn test_bad_url_fails_before_io() {
        let request = TransportRequest::new("ftp://x.test/p", Method::GET);
        let err = transport(config()).perform(request).await.unwrap_err();
        assert_eq!(err, Error::BadUrl("ftp://x.test/p".into()));
    }
}
