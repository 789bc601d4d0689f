//! Transport abstraction.
//!
//! A [`Transport`] performs one HTTP exchange and hands back the status and
//! raw body text. Building a transport is a separate concern handled by a
//! [`TransportFactory`]; the request executor either uses a transport
//! supplied directly, asks an injected factory, or falls back to the
//! process-wide default factory.
//!
//! # Architecture
//!
//! - **[`TransportRequest`]**: URL, verb, optional JSON body and per-call overrides
//! - **[`Transport`]**: executes a request (headers, query folding, I/O)
//! - **[`TransportFactory`]**: builds a transport from a configuration snapshot
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use checkout_api::transport::{HttpTransport, Transport, TransportRequest};
//! use checkout_api::Configuration;
//! use reqwest::Method;
//!
//! # async fn example() -> checkout_api::Result<()> {
//! let config = Arc::new(Configuration::builder("acme").token("sk_test").build()?);
//! let transport = HttpTransport::new(config, false, reqwest::Client::new());
//!
//! let request = TransportRequest::new(
//!     "https://sandbox.acme.api.checkout-gateway.com/payment-methods",
//!     Method::GET,
//! );
//! let response = transport.perform(request).await?;
//! println!("{}: {}", response.status, response.body);
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::{Error, Result};

pub mod config;
pub mod factory;
pub mod http;
pub mod query;

pub use config::{AttemptOutcome, RetryConfig};
pub use factory::{
    default_factory, reset_default_factory, set_default_factory, DefaultTransportFactory,
    TransportFactory,
};
pub use http::HttpTransport;

/// One request handed to a [`Transport`].
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    /// Absolute request URL, including any query the caller declared.
    pub url: String,
    /// HTTP verb.
    pub method: Method,
    /// JSON payload. Sent as the body, or folded into the query for GET.
    pub body: Option<Value>,
    /// Merchant id for this call, taking precedence over the configuration.
    pub merchant_id: Option<String>,
    /// Timeout for this call, taking precedence over the configuration.
    pub timeout: Option<Duration>,
}

impl TransportRequest {
    /// Create a request without a body.
    pub fn new(url: impl Into<String>, method: Method) -> Self {
        Self {
            url: url.into(),
            method,
            body: None,
            merchant_id: None,
            timeout: None,
        }
    }

    /// Attach a typed body, serialized to JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decoding`] if the body cannot be represented as JSON.
    pub fn with_body<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| Error::Decoding(format!("Failed to serialize request body: {}", e)))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Attach an already-serialized JSON body.
    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Set the merchant id override.
    pub fn with_merchant_id(mut self, merchant_id: Option<String>) -> Self {
        self.merchant_id = merchant_id;
        self
    }

    /// Set the timeout override.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Response from a completed HTTP exchange, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl TransportResponse {
    /// Create a response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs HTTP exchanges for the request executor.
///
/// Implementations must reject empty or non-HTTP(S) URLs with
/// [`Error::BadUrl`] before any I/O, report transport failures as
/// [`Error::Network`], and return every completed exchange as a
/// [`TransportResponse`] regardless of status. Promoting error statuses is
/// the caller's job.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Perform one request.
    async fn perform(&self, request: TransportRequest) -> Result<TransportResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Lookup<'a> {
        bin: &'a str,
        #[serde(skip)]
        #[allow(dead_code)]
        merchant_id: Option<&'a str>,
    }

    #[test]
    fn test_with_body_serializes() {
        let request = TransportRequest::new("https://x.test/cards", Method::POST)
            .with_body(&Lookup {
                bin: "424242",
                merchant_id: Some("m-1"),
            })
            .unwrap();
        assert_eq!(request.body, Some(json!({"bin": "424242"})));
    }

    #[test]
    fn test_response_success_range() {
        assert!(TransportResponse::new(200, "{}").is_success());
        assert!(TransportResponse::new(204, "").is_success());
        assert!(!TransportResponse::new(302, "").is_success());
        assert!(!TransportResponse::new(400, "").is_success());
    }
}
