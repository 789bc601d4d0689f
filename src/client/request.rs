//! Request contracts.
//!
//! Any serializable type can be sent as a request body by implementing
//! [`ApiRequest`]. Types that carry per-call overrides also implement
//! [`RequestOverrides`] and expose it through [`ApiRequest::overrides`].
//! Override fields are transient: mark them `#[serde(skip)]` so they never
//! reach the wire.
//!
//! ```
//! use std::time::Duration;
//! use checkout_api::client::{ApiRequest, RequestOverrides};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct CardDetailsRequest {
//!     bin: String,
//!     #[serde(skip)]
//!     merchant_id: Option<String>,
//!     #[serde(skip)]
//!     timeout: Option<Duration>,
//! }
//!
//! impl RequestOverrides for CardDetailsRequest {
//!     fn merchant_id(&self) -> Option<&str> {
//!         self.merchant_id.as_deref()
//!     }
//!
//!     fn timeout(&self) -> Option<Duration> {
//!         self.timeout
//!     }
//! }
//!
//! impl ApiRequest for CardDetailsRequest {
//!     fn overrides(&self) -> Option<&dyn RequestOverrides> {
//!         Some(self)
//!     }
//! }
//! ```

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

/// A value that can be sent to the API as a request.
pub trait ApiRequest: Serialize + Send + Sync {
    /// Per-call overrides, for requests that carry them.
    fn overrides(&self) -> Option<&dyn RequestOverrides> {
        None
    }
}

/// Per-call settings taking precedence over the configuration defaults.
pub trait RequestOverrides {
    /// Merchant id for this call.
    fn merchant_id(&self) -> Option<&str> {
        None
    }

    /// Timeout for this call.
    fn timeout(&self) -> Option<Duration> {
        None
    }
}

impl ApiRequest for Value {}

impl<T: ApiRequest> ApiRequest for &T {
    fn overrides(&self) -> Option<&dyn RequestOverrides> {
        (**self).overrides()
    }
}

/// Settings resolved for one call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ResolvedOverrides {
    pub(crate) merchant_id: Option<String>,
    pub(crate) timeout: Option<Duration>,
}

impl ResolvedOverrides {
    pub(crate) fn from_request<R: ApiRequest + ?Sized>(request: &R) -> Self {
        match request.overrides() {
            Some(overrides) => Self {
                merchant_id: overrides.merchant_id().map(str::to_string),
                timeout: overrides.timeout(),
            },
            None => Self::default(),
        }
    }
}
