//! Operation-specific helpers built on the [`Dispatcher`](crate::Dispatcher).
//!
//! Each helper shapes input for one or two operations and returns
//! camel-cased records instead of the service's envelope:
//!
//! - [`orders`]: list and fetch orders and their items, following `NextToken`
//! - [`sellers`]: the marketplaces the seller participates in
//! - [`reports`]: request a report, wait for it and download it

pub mod orders;
pub mod reports;
pub mod sellers;

use serde_json::Value;

use crate::dispatch::MwsError;
use crate::marshal::{normalize_keys, KeyOptions};

/// Returns the records under `value`: an array as-is, a single object as a
/// one-element list, and nothing for a missing or empty element.
pub(crate) fn as_list(value: Option<&Value>) -> Vec<Value> {
    match value {
        Some(Value::Array(items)) => items.clone(),
        Some(Value::Object(object)) => vec![Value::Object(object.clone())],
        Some(Value::String(s)) if !s.is_empty() => vec![Value::String(s.clone())],
        _ => Vec::new(),
    }
}

/// Reads a text field of a flattened element.
pub(crate) fn text(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Object(object) => object.get("_").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
    .filter(|s| !s.is_empty())
}

/// Camel-cases every record.
pub(crate) fn camel_records(records: Vec<Value>) -> Vec<Value> {
    let options = KeyOptions::default();
    records
        .into_iter()
        .map(|record| normalize_keys(record, &options))
        .collect()
}

pub(crate) fn unexpected(operation: &str, message: impl Into<String>) -> MwsError {
    MwsError::UnexpectedResponse {
        operation: operation.to_string(),
        message: message.into(),
    }
}
