//! Response contracts, the JSON parser and the response wrapper.
//!
//! A response type implements [`Response`]. Types that carry a `type` tag
//! and an `id` additionally implement [`Identifiable`] and expose it through
//! [`Response::as_identifiable`]; [`ApiResponse`] then offers the
//! [`type_tag`](ApiResponse::type_tag) and [`id`](ApiResponse::id)
//! shortcuts without knowing the concrete type.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::BLANK_RESPONSE;
use crate::{Error, Result};

/// A value the API can answer with.
pub trait Response: DeserializeOwned + Send {
    /// The identifiable view of this value, if it has one.
    fn as_identifiable(&self) -> Option<&dyn Identifiable> {
        None
    }
}

/// A response carrying a type tag and an id.
pub trait Identifiable {
    /// The `type` tag, e.g. `"checkout_session"`.
    fn type_tag(&self) -> Option<&str>;

    /// The resource id.
    fn id(&self) -> Option<&str>;
}

/// Raw JSON answers `type_tag` and `id` when it is an object carrying them
/// as strings.
impl Response for Value {
    fn as_identifiable(&self) -> Option<&dyn Identifiable> {
        Some(self)
    }
}

impl Identifiable for Value {
    fn type_tag(&self) -> Option<&str> {
        self.get("type").and_then(Value::as_str)
    }

    fn id(&self) -> Option<&str> {
        self.get("id").and_then(Value::as_str)
    }
}

impl<T: Response> Response for Vec<T> {}

/// Parse `text` into `T`.
///
/// Unknown fields are ignored.
///
/// # Errors
///
/// Returns [`Error::Decoding`] when `text` is empty or whitespace, or when
/// it is not valid JSON for `T`.
///
/// # Example
///
/// ```
/// use checkout_api::client::parse;
/// use checkout_api::Error;
///
/// let value: serde_json::Value = parse(r#"{"id": "cs_1"}"#).unwrap();
/// assert_eq!(value["id"], "cs_1");
///
/// let err = parse::<serde_json::Value>("  ").unwrap_err();
/// assert!(matches!(err, Error::Decoding(_)));
/// ```
pub fn parse<T: DeserializeOwned>(text: &str) -> Result<T> {
    if text.trim().is_empty() {
        return Err(Error::Decoding(BLANK_RESPONSE.to_string()));
    }

    serde_json::from_str(text)
        .map_err(|e| Error::Decoding(format!("Failed to parse JSON response: {}", e)))
}

/// Outcome of [`try_parse`].
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome<T> {
    /// The text decoded into a value.
    Success(T),
    /// The text could not be decoded.
    Failure(Error),
}

impl<T> ParseOutcome<T> {
    /// Returns `true` on success.
    pub fn is_success(&self) -> bool {
        matches!(self, ParseOutcome::Success(_))
    }

    /// The decoded value, if any.
    pub fn ok(self) -> Option<T> {
        match self {
            ParseOutcome::Success(value) => Some(value),
            ParseOutcome::Failure(_) => None,
        }
    }

    /// The error, if any.
    pub fn err(self) -> Option<Error> {
        match self {
            ParseOutcome::Success(_) => None,
            ParseOutcome::Failure(err) => Some(err),
        }
    }

    /// Convert into a standard `Result`.
    pub fn into_result(self) -> Result<T> {
        self.into()
    }
}

impl<T> From<Result<T>> for ParseOutcome<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => ParseOutcome::Success(value),
            Err(err) => ParseOutcome::Failure(err),
        }
    }
}

impl<T> From<ParseOutcome<T>> for Result<T> {
    fn from(outcome: ParseOutcome<T>) -> Self {
        match outcome {
            ParseOutcome::Success(value) => Ok(value),
            ParseOutcome::Failure(err) => Err(err),
        }
    }
}

/// Non-raising counterpart of [`parse`], reporting the same error.
pub fn try_parse<T: DeserializeOwned>(text: &str) -> ParseOutcome<T> {
    parse(text).into()
}

/// Returns `true` if `text` is syntactically valid JSON.
///
/// Blank input is not valid JSON.
pub fn is_valid_json(text: &str) -> bool {
    !text.trim().is_empty() && serde_json::from_str::<serde::de::IgnoredAny>(text).is_ok()
}

/// A parsed response together with the raw text it was parsed from.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    value: T,
    raw: String,
}

impl<T> ApiResponse<T> {
    /// Pair a value with its raw text.
    pub fn new(value: T, raw: impl Into<String>) -> Self {
        Self {
            value,
            raw: raw.into(),
        }
    }

    /// The parsed value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Take the parsed value.
    pub fn into_value(self) -> T {
        self.value
    }

    /// The response body exactly as received.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Split into value and raw text.
    pub fn into_parts(self) -> (T, String) {
        (self.value, self.raw)
    }
}

impl<T: Response> ApiResponse<T> {
    /// Parse `raw` into an `ApiResponse`.
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        let value = parse(&raw)?;
        Ok(Self { value, raw })
    }

    /// Returns `true` if the value is identifiable.
    pub fn is_identifiable(&self) -> bool {
        self.value.as_identifiable().is_some()
    }

    /// The type tag, when the value is identifiable and carries one.
    pub fn type_tag(&self) -> Option<&str> {
        self.value.as_identifiable().and_then(|i| i.type_tag())
    }

    /// The id, when the value is identifiable and carries one.
    pub fn id(&self) -> Option<&str> {
        self.value.as_identifiable().and_then(|i| i.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    struct CheckoutSession {
        #[serde(rename = "type")]
        kind: Option<String>,
        id: Option<String>,
        amount: i64,
    }

    impl Response for CheckoutSession {
        fn as_identifiable(&self) -> Option<&dyn Identifiable> {
            Some(self)
        }
    }

    impl Identifiable for CheckoutSession {
        fn type_tag(&self) -> Option<&str> {
            self.kind.as_deref()
        }

        fn id(&self) -> Option<&str> {
            self.id.as_deref()
        }
    }

    #[derive(Debug, Deserialize)]
    struct CardDetails {
        brand: String,
    }

    impl Response for CardDetails {}

    #[test]
    fn test_parse_blank_input() {
        for text in ["", " ", "\n\t  "] {
            assert_eq!(
                parse::<Value>(text).unwrap_err(),
                Error::Decoding(BLANK_RESPONSE.to_string())
            );
            assert_eq!(
                try_parse::<Value>(text),
                ParseOutcome::Failure(Error::Decoding(BLANK_RESPONSE.to_string()))
            );
        }
    }

    #[test]
    fn test_parse_malformed_and_mismatched() {
        let err = parse::<CardDetails>("{not json").unwrap_err();
        assert!(matches!(&err, Error::Decoding(msg) if msg.starts_with("Failed to parse JSON response: ")));

        let err = parse::<CardDetails>(r#"{"brand": 42}"#).unwrap_err();
        assert!(err.to_string().starts_with("Failed to process response: Failed to parse JSON response"));

        assert_eq!(try_parse::<CardDetails>("{not json").err(), Some(parse::<CardDetails>("{not json").unwrap_err()));
    }

    #[test]
    fn test_parse_ignores_unknown_fields() {
        let card: CardDetails = parse(r#"{"brand": "visa", "issuer": "ACME Bank"}"#).unwrap();
        assert_eq!(card.brand, "visa");
        assert!(try_parse::<CardDetails>(r#"{"brand": "visa"}"#).is_success());
    }

    #[test]
    fn test_is_valid_json() {
        assert!(is_valid_json("{}"));
        assert!(is_valid_json("[1, 2]"));
        assert!(is_valid_json("\"text\""));
        assert!(!is_valid_json(""));
        assert!(!is_valid_json("   "));
        assert!(!is_valid_json("{\"a\":"));
    }

    #[test]
    fn test_identifiable_wrapper() {
        let raw = r#"{"type": "checkout_session", "id": "cs_123", "amount": 500, "extra": true}"#;
        let response = ApiResponse::<CheckoutSession>::parse(raw).unwrap();

        assert!(response.is_identifiable());
        assert_eq!(response.type_tag(), Some("checkout_session"));
        assert_eq!(response.id(), Some("cs_123"));
        assert_eq!(response.value().amount, 500);
        assert_eq!(response.raw(), raw);
    }

    #[test]
    fn test_identifiable_with_absent_fields() {
        let response = ApiResponse::<CheckoutSession>::parse(r#"{"amount": 1}"#).unwrap();
        assert!(response.is_identifiable());
        assert_eq!(response.type_tag(), None);
        assert_eq!(response.id(), None);
    }

    #[test]
    fn test_non_identifiable_wrapper() {
        let raw = "{\"brand\":\"visa\"}  \n";
        let response = ApiResponse::<CardDetails>::parse(raw).unwrap();
        assert!(!response.is_identifiable());
        assert_eq!(response.id(), None);
        assert_eq!(response.raw(), raw);
    }

    #[test]
    fn test_raw_json_wrapper() {
        let response = ApiResponse::<Value>::parse(r#"{"type": "payment_method", "id": "pm_1"}"#).unwrap();
        assert_eq!(response.type_tag(), Some("payment_method"));
        assert_eq!(response.id(), Some("pm_1"));

        let response = ApiResponse::<Value>::parse(r#"{"type": "payment_method", "id": 7}"#).unwrap();
        assert_eq!(response.id(), None);

        let response = ApiResponse::<Value>::parse("[1,2,3]").unwrap();
        assert_eq!(response.type_tag(), None);
    }
}
