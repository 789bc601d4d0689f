//! # checkout-api-rs
//!
//! The request-execution core of a Rust client for a payment-processing API.
//!
//! This crate issues authenticated HTTP requests and maps JSON responses
//! into strongly-typed values. Resource services (payment options, card
//! details, payment methods, checkout sessions) are thin callers of the
//! [`RequestExecutor`](client::RequestExecutor) provided here.
//!
//! ## Features
//!
//! - **Typed contracts**: requests implement [`ApiRequest`](client::ApiRequest),
//!   responses implement [`Response`](client::Response) and optionally
//!   [`Identifiable`](client::Identifiable)
//! - **Pluggable transport**: swap the network layer with a
//!   [`Transport`](transport::Transport) or a
//!   [`TransportFactory`](transport::TransportFactory)
//! - **Closed error taxonomy**: every failure is one of five [`Error`] variants
//! - **Credential rotation**: the [`Session`] publishes whole configurations atomically
//! - **Async-first**: built on Tokio and reqwest
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use checkout_api::{CheckoutClient, Configuration, Environment};
//! use checkout_api::client::{ApiRequest, Endpoint, Identifiable, Response};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize)]
//! struct PaymentOptionsRequest {
//!     currency: String,
//!     bin: String,
//! }
//!
//! impl ApiRequest for PaymentOptionsRequest {}
//!
//! #[derive(Debug, Deserialize)]
//! struct PaymentOptions {
//!     #[serde(rename = "type")]
//!     kind: Option<String>,
//!     id: Option<String>,
//!     methods: Vec<String>,
//! }
//!
//! impl Identifiable for PaymentOptions {
//!     fn type_tag(&self) -> Option<&str> { self.kind.as_deref() }
//!     fn id(&self) -> Option<&str> { self.id.as_deref() }
//! }
//!
//! impl Response for PaymentOptions {
//!     fn as_identifiable(&self) -> Option<&dyn Identifiable> { Some(self) }
//! }
//!
//! #[tokio::main]
//! async fn main() -> checkout_api::Result<()> {
//!     let config = Configuration::builder("acme")
//!         .token("sk_test_123")
//!         .environment(Environment::Sandbox)
//!         .build()?;
//!     let client = CheckoutClient::new(config)?;
//!
//!     // GET bodies travel as query parameters: ?currency=USD&bin=42424242
//!     let request = PaymentOptionsRequest { currency: "USD".into(), bin: "42424242".into() };
//!     let response = client
//!         .executor()
//!         .execute::<_, PaymentOptions>(&Endpoint::get("/payment-options"), &request)
//!         .await?;
//!
//!     println!("{:?}: {:?}", response.id(), response.value().methods);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use checkout_api::Error;
//!
//! fn report(err: &Error) -> String {
//!     match err {
//!         Error::Http(http) => http.detailed_error_message(),
//!         Error::Network(net) if net.is_timeout() => "timed out".to_string(),
//!         other => other.to_string(),
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod transport;

// Re-export primary types at crate root for convenience
pub use auth::Session;
pub use client::{CheckoutClient, ClientOptions, Configuration};
pub use error::{Error, ErrorDetail, HttpError, NetworkError, Result};
pub use models::Environment;
pub use transport::RetryConfig;

/// Prelude module for convenient imports.
///
/// ```rust
/// use checkout_api::prelude::*;
/// ```
pub mod prelude {
    pub use crate::auth::Session;
    pub use crate::client::{
        ApiRequest, ApiResponse, CheckoutClient, ClientOptions, Configuration, Endpoint,
        Identifiable, RequestExecutor, RequestOverrides, Response,
    };
    pub use crate::error::{Error, ErrorDetail, HttpError, NetworkError, Result};
    pub use crate::models::Environment;
    pub use crate::transport::{Transport, TransportFactory, TransportRequest, TransportResponse};
}
