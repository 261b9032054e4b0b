//! HTTP response types.
//!
//! [`HttpResponse`] holds the status, headers and undecoded body of a
//! response, plus the quota state the service reports in its
//! `x-mws-quota-*` headers.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

/// Quota state parsed from the `x-mws-quota-*` response headers.
///
/// # Example
///
/// ```rust
/// use mws_api::clients::QuotaStatus;
///
/// let quota = QuotaStatus::parse("200.0", "183.0", None).unwrap();
/// assert_eq!(quota.max, 200);
/// assert_eq!(quota.remaining, 183);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuotaStatus {
    /// Requests allowed in the current hour.
    pub max: u32,
    /// Requests left in the current hour.
    pub remaining: u32,
    /// When the hourly quota resets.
    pub resets_on: Option<DateTime<Utc>>,
}

impl QuotaStatus {
    /// Parses the header values. Counts may carry a fractional part
    /// (`"200.0"`).
    ///
    /// Returns `None` if either count is not a non-negative number.
    #[must_use]
    pub fn parse(max: &str, remaining: &str, resets_on: Option<&str>) -> Option<Self> {
        let max = parse_count(max)?;
        let remaining = parse_count(remaining)?;
        let resets_on = resets_on
            .and_then(|value| DateTime::parse_from_rfc3339(value.trim()).ok())
            .map(|dt| dt.with_timezone(&Utc));

        Some(Self {
            max,
            remaining,
            resets_on,
        })
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_count(value: &str) -> Option<u32> {
    let count = value.trim().parse::<f64>().ok()?;
    if count.is_finite() && count >= 0.0 && count <= f64::from(u32::MAX) {
        Some(count as u32)
    } else {
        None
    }
}

/// An undecoded HTTP response.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub code: u16,
    /// Response headers, lowercased (headers may have multiple values).
    pub headers: HashMap<String, Vec<String>>,
    /// The response body as text.
    pub body: String,
    /// Quota state (from the `x-mws-quota-*` headers).
    pub quota: Option<QuotaStatus>,
}

impl HttpResponse {
    /// Creates a new `HttpResponse`, parsing the quota headers.
    #[must_use]
    pub fn new(code: u16, headers: HashMap<String, Vec<String>>, body: String) -> Self {
        let first = |name: &str| {
            headers
                .get(name)
                .and_then(|values| values.first())
                .map(String::as_str)
        };

        let quota = match (first("x-mws-quota-max"), first("x-mws-quota-remaining")) {
            (Some(max), Some(remaining)) => {
                QuotaStatus::parse(max, remaining, first("x-mws-quota-resetson"))
            }
            _ => None,
        };

        Self {
            code,
            headers,
            body,
            quota,
        }
    }

    /// Collects reqwest headers into a lowercase-keyed map.
    #[must_use]
    pub fn collect_headers(headers: &reqwest::header::HeaderMap) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }

    /// Returns `true` if the response status code is in the 2xx range.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code >= 200 && self.code <= 299
    }

    /// Returns the request id (`x-mws-request-id`, or `x-amz-request-id`).
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        ["x-mws-request-id", "x-amz-request-id"]
            .iter()
            .find_map(|name| self.header(name))
    }

    /// Returns the `content-type` header value, if present.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Returns the first value of a (lowercase) header.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }
}
