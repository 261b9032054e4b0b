//! Transport-level error types.
//!
//! - [`HttpResponseError`]: a non-2xx response from the service
//! - [`InvalidWireRequestError`]: a request that fails validation before sending
//! - [`TransportError`]: everything that can go wrong between handing a
//!   request to a [`Transport`](super::Transport) and getting a parsed body back
//!
//! A 503 response is the service's throttle signal; see
//! [`TransportError::is_throttled`].
//!
//! # Example
//!
//! ```rust,ignore
//! use mws_api::clients::TransportError;
//!
//! match transport.send(request).await {
//!     Ok(body) => println!("{body}"),
//!     Err(e) if e.is_throttled() => println!("throttled, try later"),
//!     Err(TransportError::Response(e)) => {
//!         println!("{} {:?}: {}", e.code, e.error_code, e.message);
//!     }
//!     Err(e) => println!("transport failure: {e}"),
//! }
//! ```

use thiserror::Error;

/// HTTP status the service uses to signal throttling.
pub const THROTTLED_STATUS: u16 = 503;

/// Error returned when the service answers with a non-2xx status.
///
/// `error_code` and `message` are taken from the `ErrorResponse` document
/// when the body contains one; otherwise `message` holds the raw body.
///
/// # Example
///
/// ```rust
/// use mws_api::clients::HttpResponseError;
///
/// let error = HttpResponseError {
///     code: 503,
///     message: "Request is throttled".to_string(),
///     error_code: Some("RequestThrottled".to_string()),
///     request_id: Some("abc-123".to_string()),
/// };
///
/// assert_eq!(error.to_string(), "HTTP 503 (RequestThrottled): Request is throttled");
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("HTTP {code}{}: {message}", code_suffix(.error_code))]
pub struct HttpResponseError {
    /// The HTTP status code of the response.
    pub code: u16,
    /// Error message from the response body.
    pub message: String,
    /// Service error code (`ErrorResponse/Error/Code`), if present.
    pub error_code: Option<String>,
    /// Request id from the `x-mws-request-id` header or the error body.
    pub request_id: Option<String>,
}

fn code_suffix(error_code: &Option<String>) -> String {
    error_code
        .as_ref()
        .map(|code| format!(" ({code})"))
        .unwrap_or_default()
}

/// Error returned when a wire request fails validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidWireRequestError {
    /// The resource path does not start with `/`.
    #[error("Invalid resource path '{path}', expected a leading '/'.")]
    InvalidPath {
        /// The offending path.
        path: String,
    },

    /// The request has no `Action` parameter.
    #[error("Cannot send a request without an Action.")]
    MissingAction,

    /// A body was attached without a content type.
    #[error("Cannot set a body without also setting body_type.")]
    MissingBodyType,

    /// The request has no `Version` parameter.
    #[error("Cannot send {action} without a Version.")]
    MissingVersion {
        /// The action being sent.
        action: String,
    },
}

/// Unified error type for the transport boundary.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The service answered with a non-2xx status.
    #[error(transparent)]
    Response(#[from] HttpResponseError),

    /// Request validation failed.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidWireRequestError),

    /// Network or connection error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body could not be decoded.
    #[error("Failed to decode response: {message}")]
    Decode {
        /// What went wrong.
        message: String,
    },

    /// The call was dropped before it produced a result.
    #[error("Request was aborted before completion")]
    Aborted,
}

impl TransportError {
    /// Returns the HTTP status associated with the error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Response(e) => Some(e.code),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            Self::InvalidRequest(_) | Self::Decode { .. } | Self::Aborted => None,
        }
    }

    /// Returns `true` for the service's throttle signal (HTTP 503).
    #[must_use]
    pub fn is_throttled(&self) -> bool {
        self.status() == Some(THROTTLED_STATUS)
    }

    pub(crate) fn decode(message: impl std::fmt::Display) -> Self {
        Self::Decode {
            message: message.to_string(),
        }
    }
}
