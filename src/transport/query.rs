//! Folding a JSON request body into URL query parameters.
//!
//! GET requests carry no body; their payload travels as query parameters
//! instead. The rules:
//!
//! - top-level fields keep their declaration order,
//! - strings are sent as-is, numbers and booleans via their JSON text,
//! - `null` fields are skipped,
//! - arrays repeat the key once per element (`key=a&key=b`),
//! - nested objects are flattened with brackets (`parent[child]=v`).

use serde_json::{Map, Value};
use url::Url;

use crate::{Error, Result};

/// Append the fields of `body` to the query string of `url`.
///
/// An empty object or `null` body leaves the URL untouched. Any other
/// non-object body is rejected.
pub fn fold_into_query(url: &mut Url, body: &Value) -> Result<()> {
    let fields = match body {
        Value::Null => return Ok(()),
        Value::Object(fields) => fields,
        other => {
            return Err(Error::Decoding(format!(
                "GET request body must be a JSON object, got {}",
                kind_of(other)
            )))
        }
    };

    let pairs = flatten(fields);
    if pairs.is_empty() {
        return Ok(());
    }

    let mut query = url.query_pairs_mut();
    for (key, value) in &pairs {
        query.append_pair(key, value);
    }
    Ok(())
}

/// Flatten an object into ordered `(key, value)` pairs.
pub fn flatten(fields: &Map<String, Value>) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (key, value) in fields {
        push_value(&mut pairs, key.clone(), value);
    }
    pairs
}

fn push_value(pairs: &mut Vec<(String, String)>, key: String, value: &Value) {
    match value {
        Value::Null => {}
        Value::String(s) => pairs.push((key, s.clone())),
        Value::Bool(b) => pairs.push((key, b.to_string())),
        Value::Number(n) => pairs.push((key, n.to_string())),
        Value::Array(items) => {
            for item in items {
                push_value(pairs, key.clone(), item);
            }
        }
        Value::Object(nested) => {
            for (child, value) in nested {
                push_value(pairs, format!("{}[{}]", key, child), value);
            }
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
