//! Parameter validation and transformation.
//!
//! [`transform`] checks caller-supplied [`CallOptions`] against an
//! operation's parameter schema and produces the flat [`WireQuery`] the
//! service expects:
//!
//! - unknown keys and missing required parameters are rejected
//! - native dates are serialized as `YYYY-MM-DDTHH:MM:SS.sssZ`
//! - list parameters expand to `{list_key}.1`, `{list_key}.2`, ...
//!
//! # Example
//!
//! ```rust
//! use mws_api::marshal::{transform, CallOptions};
//! use mws_api::schema::{ParameterRule, ParameterSchema};
//!
//! const SCHEMA: ParameterSchema = &[
//!     ("MarketplaceId", ParameterRule::string().required().list("MarketplaceId.Id")),
//!     ("MaxResultsPerPage", ParameterRule::int().range(1, 100)),
//! ];
//!
//! let options = CallOptions::new()
//!     .set("MarketplaceId", vec!["ATVPDKIKX0DER", "A2EUQ1WTGCTBG2"])
//!     .set("MaxResultsPerPage", 50);
//!
//! let query = transform(SCHEMA, &options).unwrap();
//! assert_eq!(query["MarketplaceId.Id.1"], "ATVPDKIKX0DER");
//! assert_eq!(query["MarketplaceId.Id.2"], "A2EUQ1WTGCTBG2");
//! assert_eq!(query["MaxResultsPerPage"], "50");
//! assert!(!query.contains_key("MarketplaceId"));
//! ```

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;

use crate::schema::{ParameterRule, ParameterSchema, WireType};

/// Flat, string-keyed wire parameters.
pub type WireQuery = BTreeMap<String, String>;

/// A caller-supplied parameter value.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamValue {
    /// A string.
    Str(String),
    /// An integer.
    Int(i64),
    /// A boolean, sent as `true`/`false`.
    Bool(bool),
    /// A timestamp, serialized to ISO-8601 before validation.
    DateTime(DateTime<Utc>),
    /// A list, for parameters with a list key template.
    List(Vec<ParamValue>),
}

impl ParamValue {
    /// Serializes a scalar the way the service expects it.
    ///
    /// Lists are rendered as a comma-separated string; callers that need
    /// list expansion go through [`transform`] or [`passthrough`].
    #[must_use]
    pub fn to_wire(&self) -> String {
        match self {
            Self::Str(s) => s.clone(),
            Self::Int(i) => i.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::DateTime(dt) => format_timestamp(dt),
            Self::List(items) => items
                .iter()
                .map(Self::to_wire)
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// Replaces native dates (also inside lists) with their ISO-8601 string.
    #[must_use]
    fn coerce_dates(&self) -> Self {
        match self {
            Self::DateTime(dt) => Self::Str(format_timestamp(dt)),
            Self::List(items) => Self::List(items.iter().map(Self::coerce_dates).collect()),
            other => other.clone(),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            other => f.write_str(&other.to_wire()),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        Self::Str(value.clone())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<DateTime<Utc>> for ParamValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

impl<T: Into<Self>> From<Vec<T>> for ParamValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Self>, const N: usize> From<[T; N]> for ParamValue {
    fn from(values: [T; N]) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

/// Caller-supplied options for one call.
///
/// Every key must be a parameter the target operation declares. Feed
/// submissions additionally carry a request body.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CallOptions {
    params: BTreeMap<String, ParamValue>,
    body: Option<String>,
}

impl CallOptions {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a parameter, builder style.
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets a parameter.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.params.insert(key.into(), value.into());
    }

    /// Attaches a request body (feed content).
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Returns a parameter value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.params.get(key)
    }

    /// Returns the request body, if any.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Iterates over the parameters in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns `true` if no parameter is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// A caller-supplied parameter violated the operation's schema.
///
/// Always raised before any network call is attempted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The key is not declared by the operation.
    #[error("Unknown parameter '{name}'")]
    UnknownParameter {
        /// The unknown key.
        name: String,
    },

    /// A required parameter was not supplied.
    #[error("Missing required parameter '{name}'")]
    MissingRequired {
        /// The missing parameter.
        name: String,
    },

    /// The value does not satisfy the parameter's wire type.
    #[error("Parameter '{name}' expected {expected}, got '{value}'")]
    InvalidType {
        /// The offending parameter.
        name: String,
        /// The expected wire type.
        expected: String,
        /// The supplied value.
        value: String,
    },

    /// The value is not in the parameter's closed set.
    #[error("Parameter '{name}' value '{value}' is not one of {allowed:?}")]
    NotAllowed {
        /// The offending parameter.
        name: String,
        /// The supplied value.
        value: String,
        /// The accepted values.
        allowed: Vec<String>,
    },

    /// The integer is outside the accepted bounds.
    #[error("Parameter '{name}' value {value} is outside {min}..={max}")]
    OutOfRange {
        /// The offending parameter.
        name: String,
        /// The supplied value.
        value: i64,
        /// Smallest accepted value.
        min: i64,
        /// Largest accepted value.
        max: i64,
    },

    /// A list parameter was given a scalar.
    #[error("Parameter '{name}' must be a list")]
    NotAList {
        /// The offending parameter.
        name: String,
    },

    /// A list parameter has too many elements.
    #[error("Parameter '{name}' accepts at most {max} values, got {len}")]
    ListTooLong {
        /// The offending parameter.
        name: String,
        /// The maximum.
        max: usize,
        /// The supplied length.
        len: usize,
    },
}

/// Validates `options` against `schema` and produces wire parameters.
///
/// # Errors
///
/// Returns a [`ValidationError`] describing the first violation found:
/// unknown keys are reported before missing or malformed parameters.
pub fn transform(schema: ParameterSchema, options: &CallOptions) -> Result<WireQuery, ValidationError> {
    if let Some((name, _)) = options
        .iter()
        .find(|(key, _)| !schema.iter().any(|(declared, _)| declared == key))
    {
        return Err(ValidationError::UnknownParameter {
            name: name.to_string(),
        });
    }

    let mut query = WireQuery::new();
    for (name, rule) in schema {
        let Some(value) = options.get(name) else {
            if rule.required {
                return Err(ValidationError::MissingRequired {
                    name: (*name).to_string(),
                });
            }
            continue;
        };

        let value = value.coerce_dates();
        match rule.list_key {
            Some(list_key) => {
                let ParamValue::List(items) = &value else {
                    return Err(ValidationError::NotAList {
                        name: (*name).to_string(),
                    });
                };
                if rule.required && items.is_empty() {
                    return Err(ValidationError::MissingRequired {
                        name: (*name).to_string(),
                    });
                }
                if let Some(max) = rule.list_max {
                    if items.len() > max {
                        return Err(ValidationError::ListTooLong {
                            name: (*name).to_string(),
                            max,
                            len: items.len(),
                        });
                    }
                }
                for (index, item) in items.iter().enumerate() {
                    let wire = validate_value(name, rule, item)?;
                    query.insert(format!("{list_key}.{}", index + 1), wire);
                }
            }
            None => {
                let wire = validate_value(name, rule, &value)?;
                query.insert((*name).to_string(), wire);
            }
        }
    }

    Ok(query)
}

/// Converts options to wire parameters without a schema.
///
/// Used for operations that declare no parameter schema: nothing is
/// validated, dates are serialized, and lists expand under `{key}.{n}`.
#[must_use]
pub fn passthrough(options: &CallOptions) -> WireQuery {
    let mut query = WireQuery::new();
    for (key, value) in options.iter() {
        match value {
            ParamValue::List(items) => {
                for (index, item) in items.iter().enumerate() {
                    query.insert(format!("{key}.{}", index + 1), item.to_wire());
                }
            }
            scalar => {
                query.insert(key.to_string(), scalar.to_wire());
            }
        }
    }
    query
}

/// Formats a timestamp the way the service (and `Date.toISOString`) does.
pub(crate) fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Checks one scalar (or list element) and returns its wire string.
fn validate_value(
    name: &str,
    rule: &ParameterRule,
    value: &ParamValue,
) -> Result<String, ValidationError> {
    let invalid = || ValidationError::InvalidType {
        name: name.to_string(),
        expected: rule.wire_type.to_string(),
        value: value.to_string(),
    };

    let wire = match rule.wire_type {
        WireType::String => match value {
            ParamValue::Str(s) => s.clone(),
            _ => return Err(invalid()),
        },
        WireType::Int | WireType::NonNegativeInt | WireType::PositiveInt => {
            let number = match value {
                ParamValue::Int(i) => *i,
                ParamValue::Str(s) => s.trim().parse::<i64>().map_err(|_| invalid())?,
                _ => return Err(invalid()),
            };
            let floor = match rule.wire_type {
                WireType::NonNegativeInt => Some(0),
                WireType::PositiveInt => Some(1),
                _ => None,
            };
            if floor.is_some_and(|floor| number < floor) {
                return Err(invalid());
            }
            if let Some(range) = rule.range {
                if number < range.min || number > range.max {
                    return Err(ValidationError::OutOfRange {
                        name: name.to_string(),
                        value: number,
                        min: range.min,
                        max: range.max,
                    });
                }
            }
            number.to_string()
        }
        WireType::DateTime => match value {
            ParamValue::Str(s) => {
                let parsed = DateTime::parse_from_rfc3339(s).map_err(|_| invalid())?;
                if format_timestamp(&parsed.with_timezone(&Utc)) != *s {
                    return Err(invalid());
                }
                s.clone()
            }
            ParamValue::DateTime(dt) => format_timestamp(dt),
            _ => return Err(invalid()),
        },
        WireType::Other(type_name) => {
            tracing::warn!(
                "Accepting value for parameter {} with unrecognized type {}",
                name,
                type_name
            );
            value.to_wire()
        }
    };

    if let Some(allowed) = rule.allowed_values {
        if !allowed.contains(&wire.as_str()) {
            return Err(ValidationError::NotAllowed {
                name: name.to_string(),
                value: wire,
                allowed: allowed.iter().map(|v| (*v).to_string()).collect(),
            });
        }
    }

    Ok(wire)
}
