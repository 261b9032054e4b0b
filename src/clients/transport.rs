//! The transport boundary.

use std::fmt::Debug;

use async_trait::async_trait;
use serde_json::Value;

use crate::clients::errors::TransportError;
use crate::clients::http_request::WireRequest;

/// Sends a prepared request and returns the parsed response body.
///
/// [`HttpTransport`](super::HttpTransport) is the production
/// implementation; tests substitute their own.
///
/// Implementations report non-2xx responses as
/// [`TransportError::Response`] carrying the HTTP status. A 503 is read as
/// the throttle signal by the dispatcher; every other error propagates
/// unchanged.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    /// Sends `request`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the request cannot be sent, the service
    /// answers with a non-2xx status, or the body cannot be decoded.
    async fn send(&self, request: WireRequest) -> Result<Value, TransportError>;
}
