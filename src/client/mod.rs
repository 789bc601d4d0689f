//! Request execution for the checkout API.
//!
//! This module provides the [`CheckoutClient`] facade, the generic
//! [`RequestExecutor`] resource services are built on, and the request and
//! response contracts typed calls go through.
//!
//! # Example
//!
//! ```no_run
//! use checkout_api::{CheckoutClient, Configuration};
//! use checkout_api::client::Endpoint;
//! use serde_json::{json, Value};
//!
//! # async fn example() -> checkout_api::Result<()> {
//! let client = CheckoutClient::new(Configuration::builder("acme").token("sk_test").build()?)?;
//!
//! let session = client
//!     .executor()
//!     .execute::<_, Value>(
//!         &Endpoint::post("/checkout-sessions"),
//!         &json!({"amount": 1250, "currency": "EUR"}),
//!     )
//!     .await?;
//! println!("created {:?}", session.id());
//! # Ok(())
//! # }
//! ```

pub(crate) mod config;
mod executor;
mod http;
mod request;
mod response;

pub use config::{ClientOptions, Configuration, ConfigurationBuilder, DEFAULT_API_DOMAIN, DEFAULT_TIMEOUT};
pub use executor::{Endpoint, RequestExecutor, TransportSource};
pub use http::{CheckoutClient, CheckoutClientBuilder};
pub use request::{ApiRequest, RequestOverrides};
pub use response::{is_valid_json, parse, try_parse, ApiResponse, Identifiable, ParseOutcome, Response};
