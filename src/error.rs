//! Error types for the checkout API client.
//!
//! Every failure that crosses the client boundary is one of the five
//! [`Error`] variants. Errors compare structurally so they can be asserted
//! on in tests and deduplicated by callers.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A specialized `Result` type for checkout API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Detail message used when a blank response body is parsed.
pub(crate) const BLANK_RESPONSE: &str = "Response string is empty or blank";

/// The main error type for all checkout API operations.
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum Error {
    /// The merchant account identifier is empty or not a valid host label.
    #[error("Invalid merchant account identifier")]
    InvalidIdentifier,

    /// The resolved request URL is empty or not an HTTP(S) URL.
    #[error("Invalid URL: {0}")]
    BadUrl(String),

    /// The API answered with a non-2xx status.
    #[error("{0}")]
    Http(HttpError),

    /// The request never completed an HTTP exchange.
    #[error("{0}")]
    Network(NetworkError),

    /// A response (or request payload) could not be processed as JSON.
    #[error("Failed to process response: {0}")]
    Decoding(String),
}

impl Error {
    /// Build a [`Error::Network`] from any underlying transport error.
    pub fn network<E>(cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Network(NetworkError::new(cause))
    }

    /// Returns `true` if this error is potentially transient and the
    /// operation could be retried by the caller.
    ///
    /// # Example
    ///
    /// ```
    /// use checkout_api::Error;
    ///
    /// fn handle_error(err: &Error) {
    ///     if err.is_retryable() {
    ///         println!("Retrying operation...");
    ///     }
    /// }
    /// ```
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Network(_) => true,
            Error::Http(http) => http.status_code == 429 || http.status_code >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this error indicates a client-side issue.
    pub fn is_client_error(&self) -> bool {
        match self {
            Error::Http(http) => (400..500).contains(&http.status_code),
            Error::InvalidIdentifier | Error::BadUrl(_) => true,
            _ => false,
        }
    }

    /// Returns `true` if this error indicates a server-side issue.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Http(http) if http.status_code >= 500)
    }

    /// The HTTP status code, for [`Error::Http`] errors.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Http(http) => Some(http.status_code),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(NetworkError::from_reqwest(err))
    }
}

/// A single validation problem reported by the API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Where the problem is (`body`, `query`, `header`, ...).
    #[serde(default)]
    pub location: String,
    /// JSON pointer to the offending field, e.g. `/amount`.
    #[serde(default)]
    pub pointer: String,
    /// Human-readable description.
    #[serde(default)]
    pub message: String,
    /// Machine-readable type code, e.g. `validation_error`.
    #[serde(rename = "type", default)]
    pub type_code: String,
}

impl ErrorDetail {
    /// Create a new detail entry.
    pub fn new(
        location: impl Into<String>,
        pointer: impl Into<String>,
        message: impl Into<String>,
        type_code: impl Into<String>,
    ) -> Self {
        Self {
            location: location.into(),
            pointer: pointer.into(),
            message: message.into(),
            type_code: type_code.into(),
        }
    }
}

/// A non-2xx answer from the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct HttpError {
    /// HTTP status code
    pub status_code: u16,
    /// Raw response body, when one was received
    pub response_bytes: Option<Vec<u8>>,
    /// Message from the structured error body
    pub error_message: Option<String>,
    /// Machine-readable error code from the structured error body
    pub code: Option<String>,
    /// Validation details from the structured error body
    pub details: Vec<ErrorDetail>,
}

/// Structured error body returned by the API.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

impl HttpError {
    /// Create an error carrying only a status code.
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            ..Default::default()
        }
    }

    /// Set the error message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    /// Set the error code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Set the validation details.
    pub fn with_details(mut self, details: Vec<ErrorDetail>) -> Self {
        self.details = details;
        self
    }

    /// Set the raw response bytes.
    pub fn with_response_bytes(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.response_bytes = Some(bytes.into());
        self
    }

    /// Build an error from a status code and the raw response body.
    ///
    /// The structured `{code, message, details}` body is picked up when the
    /// response carries one; anything else is kept only as raw bytes.
    pub fn from_response(status_code: u16, body: &[u8]) -> Self {
        let mut error = Self::new(status_code);
        if !body.is_empty() {
            error.response_bytes = Some(body.to_vec());
        }

        if let Ok(parsed) = serde_json::from_slice::<ErrorBody>(body) {
            error.code = parsed.code;
            error.error_message = parsed.message;
            error.details = parsed.details;
        }

        error
    }

    /// Returns `true` if the API reported validation details.
    pub fn has_details(&self) -> bool {
        !self.details.is_empty()
    }

    /// Details whose `location` equals `location`.
    pub fn details_for_location(&self, location: &str) -> Vec<&ErrorDetail> {
        self.details
            .iter()
            .filter(|detail| detail.location == location)
            .collect()
    }

    /// The raw response body as text, if it was valid UTF-8.
    pub fn response_text(&self) -> Option<&str> {
        self.response_bytes
            .as_deref()
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
    }

    /// One-line summary: `"{status} ({code}): {message}"` plus a validation
    /// error count when details are present.
    pub fn message(&self) -> String {
        let text = self.error_message.as_deref().unwrap_or("Request failed");

        let mut message = match &self.code {
            Some(code) => format!("{} ({}): {}", self.status_code, code, text),
            None => format!("{}: {}", self.status_code, text),
        };

        if self.has_details() {
            let count = self.details.len();
            let suffix = if count == 1 { "" } else { "s" };
            message.push_str(&format!(" ({} validation error{})", count, suffix));
        }

        message
    }

    /// The summary followed by one `- {location} ({pointer}): {message}`
    /// line per detail.
    pub fn detailed_error_message(&self) -> String {
        let message = self.message();
        if !self.has_details() {
            return message;
        }

        let lines: Vec<String> = self
            .details
            .iter()
            .map(|d| format!("- {} ({}): {}", d.location, d.pointer, d.message))
            .collect();

        format!("{}\n{}", message, lines.join("\n"))
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// The request failed before an HTTP exchange completed.
///
/// Equality and hashing consider the message and the timeout flag only; the
/// underlying cause is kept for [`std::error::Error::source`] chaining.
#[derive(Clone)]
pub struct NetworkError {
    message: String,
    timeout: bool,
    cause: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl NetworkError {
    /// Wrap an underlying transport error.
    pub fn new<E>(cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            message: cause.to_string(),
            timeout: false,
            cause: Some(Arc::new(cause)),
        }
    }

    /// A network error with only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timeout: false,
            cause: None,
        }
    }

    /// A timeout expiry.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timeout: true,
            cause: None,
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        let timeout = err.is_timeout();
        let mut error = Self::new(err);
        error.timeout = timeout;
        error
    }

    /// The message of the underlying cause.
    pub fn cause_message(&self) -> &str {
        &self.message
    }

    /// Returns `true` if the request timed out.
    pub fn is_timeout(&self) -> bool {
        self.timeout
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Network error: {}", self.message)
    }
}

impl fmt::Debug for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkError")
            .field("message", &self.message)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl std::error::Error for NetworkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

impl PartialEq for NetworkError {
    fn eq(&self, other: &Self) -> bool {
        self.message == other.message && self.timeout == other.timeout
    }
}

impl Eq for NetworkError {}

impl Hash for NetworkError {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.message.hash(state);
        self.timeout.hash(state);
    }
}
