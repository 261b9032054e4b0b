//! Response normalization.
//!
//! Responses arrive as an object tree where every child element is an array
//! (`{"ListOrdersResponse": [{"ListOrdersResult": [...]}]}`), text sits under
//! `_` and attributes under `$`. The functions here turn that tree into
//! something callers can use:
//!
//! - [`flatten`] collapses single-element arrays
//! - [`unwrap_envelope`] extracts `<Operation>Response.<Operation>Result`
//!   and turns `ErrorResponse` documents into a [`ServiceError`]
//! - [`normalize_keys`] camel-cases keys and merges attributes

use serde_json::{Map, Value};
use thiserror::Error;

/// The service answered with an `ErrorResponse` document.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{operation} failed: {message}")]
pub struct ServiceError {
    /// Operation that was called.
    pub operation: String,
    /// Serialized error body.
    pub message: String,
    /// Service error code, e.g. `InvalidParameterValue`.
    pub code: Option<String>,
    /// Service request id, when present.
    pub request_id: Option<String>,
    /// The full `ErrorResponse` value.
    pub body: Value,
}

/// Recursively collapses single-element arrays into their element.
///
/// Arrays of any other length are kept and flattened element-wise; objects
/// are flattened value-wise. Applying it twice equals applying it once.
///
/// # Example
///
/// ```rust
/// use mws_api::marshal::flatten;
/// use serde_json::json;
///
/// let raw = json!({"Orders": [{"Order": [{"Id": ["1"]}, {"Id": ["2"]}]}]});
/// assert_eq!(
///     flatten(raw),
///     json!({"Orders": {"Order": [{"Id": "1"}, {"Id": "2"}]}})
/// );
/// ```
#[must_use]
pub fn flatten(value: Value) -> Value {
    match value {
        Value::Array(mut items) if items.len() == 1 => flatten(items.remove(0)),
        Value::Array(items) => Value::Array(items.into_iter().map(flatten).collect()),
        Value::Object(map) => Value::Object(map.into_iter().map(|(k, v)| (k, flatten(v))).collect()),
        scalar => scalar,
    }
}

/// Extracts the operation result from a parsed response.
///
/// Returns `data["<op>Response"]["<op>Result"]` when present (the tree must
/// already be flattened for the lookup to succeed), otherwise `data`
/// unchanged.
///
/// # Errors
///
/// Returns a [`ServiceError`] when `data` holds an `ErrorResponse`.
pub fn unwrap_envelope(operation: &str, mut data: Value) -> Result<Value, ServiceError> {
    if let Some(error) = data.get("ErrorResponse") {
        return Err(service_error(operation, error));
    }

    let response_key = format!("{operation}Response");
    let result_key = format!("{operation}Result");
    if data
        .get(&response_key)
        .and_then(|response| response.get(&result_key))
        .is_some()
    {
        return Ok(data[response_key.as_str()][result_key.as_str()].take());
    }

    Ok(data)
}

fn service_error(operation: &str, error: &Value) -> ServiceError {
    ServiceError {
        operation: operation.to_string(),
        message: error.to_string(),
        code: first_text(error, &["Error", "Code"]),
        request_id: first_text(error, &["RequestId"]),
        body: error.clone(),
    }
}

/// Follows `path` through objects, stepping into the first element of any
/// array on the way, and returns the string found there.
fn first_text(value: &Value, path: &[&str]) -> Option<String> {
    let mut current = value;
    for key in path {
        current = descend(current).get(*key)?;
    }
    match descend(current) {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map.get("_").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

fn descend(mut value: &Value) -> &Value {
    while let Value::Array(items) = value {
        match items.first() {
            Some(first) => value = first,
            None => break,
        }
    }
    value
}

/// Options for [`normalize_keys`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyOptions {
    /// Namespace prefix stripped from keys before casing, e.g. `ns2:`.
    pub strip_prefix: Option<String>,
}

impl KeyOptions {
    /// Strips `prefix` from every key.
    #[must_use]
    pub fn strip_prefix(prefix: impl Into<String>) -> Self {
        Self {
            strip_prefix: Some(prefix.into()),
        }
    }
}

/// Converts a PascalCase key to camelCase.
///
/// Keys that are entirely uppercase (`ASIN`, `SKU`, `ORDER_ID`) are treated
/// as acronyms and returned unchanged. A leading acronym is lowercased as a
/// unit: `ASINList` becomes `asinList`, `SellerSKU` becomes `sellerSKU`.
///
/// ```rust
/// use mws_api::marshal::camel_case_key;
///
/// assert_eq!(camel_case_key("AmazonOrderId"), "amazonOrderId");
/// assert_eq!(camel_case_key("ASIN"), "ASIN");
/// assert_eq!(camel_case_key("ASINList"), "asinList");
/// assert_eq!(camel_case_key("Shipping_Price"), "shippingPrice");
/// ```
#[must_use]
pub fn camel_case_key(key: &str) -> String {
    if key.to_uppercase() == key {
        return key.to_string();
    }

    let mut out = String::with_capacity(key.len());
    for (index, segment) in key
        .split(|c: char| c == '_' || c == '-')
        .filter(|s| !s.is_empty())
        .enumerate()
    {
        if index == 0 {
            out.push_str(&lower_leading(segment));
        } else {
            let mut chars = segment.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(chars.as_str());
            }
        }
    }
    out
}

/// Lowercases the leading run of uppercase characters, leaving the last one
/// alone when it starts a new word (`URLPath` -> `urlPath`).
fn lower_leading(segment: &str) -> String {
    let chars: Vec<char> = segment.chars().collect();
    let run = chars.iter().take_while(|c| c.is_uppercase()).count();
    let lower_upto = if run > 1 && run < chars.len() && chars[run].is_lowercase() {
        run - 1
    } else {
        run.max(1)
    };

    chars
        .iter()
        .enumerate()
        .flat_map(|(i, c)| {
            if i < lower_upto {
                c.to_lowercase().collect::<Vec<_>>()
            } else {
                vec![*c]
            }
        })
        .collect()
}

/// Camel-cases keys and merges attributes, recursively.
///
/// - `{"_": v, "$": attrs}` becomes `{"value": v, ...attrs}`
/// - a `$` object without `_` is merged into its parent
/// - keys are passed through [`camel_case_key`] after prefix stripping
///
/// ```rust
/// use mws_api::marshal::{normalize_keys, KeyOptions};
/// use serde_json::json;
///
/// let raw = json!({"ns2:Price": {"_": "9.99", "$": {"CurrencyCode": "USD"}}});
/// assert_eq!(
///     normalize_keys(raw, &KeyOptions::strip_prefix("ns2:")),
///     json!({"price": {"value": "9.99", "currencyCode": "USD"}})
/// );
/// ```
#[must_use]
pub fn normalize_keys(value: Value, options: &KeyOptions) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| normalize_keys(item, options))
                .collect(),
        ),
        Value::Object(map) => Value::Object(normalize_object(map, options)),
        scalar => scalar,
    }
}

fn normalize_object(mut map: Map<String, Value>, options: &KeyOptions) -> Map<String, Value> {
    let attributes = map.remove("$");
    let text = map.remove("_");

    let mut out = Map::new();
    if let Some(text) = text {
        out.insert("value".to_string(), normalize_keys(text, options));
    }
    if let Some(Value::Object(attributes)) = attributes {
        for (key, value) in attributes {
            out.insert(transform_key(&key, options), normalize_keys(value, options));
        }
    }
    for (key, value) in map {
        out.insert(transform_key(&key, options), normalize_keys(value, options));
    }
    out
}

fn transform_key(key: &str, options: &KeyOptions) -> String {
    let key = options
        .strip_prefix
        .as_deref()
        .and_then(|prefix| key.strip_prefix(prefix))
        .unwrap_or(key);
    camel_case_key(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_collapses_singletons_and_keeps_longer_arrays() {
        let raw = json!({"A": ["x"], "B": ["y", "z"], "C": [], "D": [["nested"]]});
        assert_eq!(
            flatten(raw),
            json!({"A": "x", "B": ["y", "z"], "C": [], "D": "nested"})
        );
    }

    #[test]
    fn test_flatten_is_idempotent() {
        let raw = json!({
            "R": [{"Items": [{"Item": [{"Id": ["1"]}, {"Id": ["2"], "Tags": [["a"], ["b"]]}]}]}]
        });
        let once = flatten(raw);
        assert_eq!(flatten(once.clone()), once);
    }

    #[test]
    fn test_unwrap_envelope_extracts_result() {
        let data = json!({
            "GetOrderResponse": {
                "GetOrderResult": {"Orders": {"Order": {"AmazonOrderId": "1"}}},
                "ResponseMetadata": {"RequestId": "r"}
            }
        });
        let result = unwrap_envelope("GetOrder", data).unwrap();
        assert_eq!(result, json!({"Orders": {"Order": {"AmazonOrderId": "1"}}}));
    }

    #[test]
    fn test_unwrap_envelope_returns_unrecognized_data_unchanged() {
        let data = json!({"SomethingElse": {"x": 1}});
        assert_eq!(unwrap_envelope("GetOrder", data.clone()).unwrap(), data);

        let rows = json!([{"sku": "A"}]);
        assert_eq!(unwrap_envelope("GetReport", rows.clone()).unwrap(), rows);
    }

    #[test]
    fn test_unwrap_envelope_leaves_unflattened_tree_alone() {
        let data = json!({"GetOrderResponse": [{"GetOrderResult": [{}]}]});
        assert_eq!(unwrap_envelope("GetOrder", data.clone()).unwrap(), data);
    }

    #[test]
    fn test_error_response_becomes_service_error() {
        let data = json!({
            "ErrorResponse": {
                "Error": {"Type": "Sender", "Code": "InvalidParameterValue", "Message": "bad"},
                "RequestId": "req-1"
            }
        });
        let err = unwrap_envelope("ListOrders", data).unwrap_err();
        assert_eq!(err.operation, "ListOrders");
        assert_eq!(err.code.as_deref(), Some("InvalidParameterValue"));
        assert_eq!(err.request_id.as_deref(), Some("req-1"));
        assert!(err.message.contains("bad"));
        assert!(err.to_string().starts_with("ListOrders failed: "));
    }

    #[test]
    fn test_error_response_fields_found_in_unflattened_tree() {
        let data = json!({
            "ErrorResponse": [{
                "Error": [{"Code": ["AccessDenied"], "Message": ["no"]}],
                "RequestId": ["req-2"]
            }]
        });
        let err = unwrap_envelope("ListOrders", data).unwrap_err();
        assert_eq!(err.code.as_deref(), Some("AccessDenied"));
        assert_eq!(err.request_id.as_deref(), Some("req-2"));
    }

    #[test]
    fn test_camel_case_key() {
        assert_eq!(camel_case_key("AmazonOrderId"), "amazonOrderId");
        assert_eq!(camel_case_key("amazonOrderId"), "amazonOrderId");
        assert_eq!(camel_case_key("SKU"), "SKU");
        assert_eq!(camel_case_key("ORDER_ID"), "ORDER_ID");
        assert_eq!(camel_case_key("SellerSKU"), "sellerSKU");
        assert_eq!(camel_case_key("URLPath"), "urlPath");
        assert_eq!(camel_case_key("item-name"), "itemName");
        assert_eq!(camel_case_key("A"), "A");
    }

    #[test]
    fn test_normalize_merges_attributes_without_text() {
        let raw = json!({"Item": {"$": {"Type": "x"}, "Name": "n"}});
        assert_eq!(
            normalize_keys(raw, &KeyOptions::default()),
            json!({"item": {"type": "x", "name": "n"}})
        );
    }

    #[test]
    fn test_normalize_recurses_into_arrays() {
        let raw = json!({"Orders": [{"OrderStatus": "Shipped"}, {"OrderStatus": "Pending"}]});
        assert_eq!(
            normalize_keys(raw, &KeyOptions::default()),
            json!({"orders": [{"orderStatus": "Shipped"}, {"orderStatus": "Pending"}]})
        );
    }
}
