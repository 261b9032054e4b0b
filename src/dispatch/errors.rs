//! The caller-facing error type.

use thiserror::Error;

use crate::clients::TransportError;
use crate::marshal::{ServiceError, ValidationError};

/// Everything a dispatched call can fail with.
///
/// # Example
///
/// ```rust,ignore
/// use mws_api::MwsError;
///
/// match dispatcher.call("ListOrders", &options).await {
///     Ok(orders) => println!("{orders}"),
///     Err(MwsError::Validation(e)) => println!("fix your input: {e}"),
///     Err(MwsError::Service(e)) => println!("service said no: {:?}", e.code),
///     Err(e) if e.is_throttled() => println!("still throttled after retries"),
///     Err(e) => println!("{e}"),
/// }
/// ```
#[derive(Debug, Error)]
pub enum MwsError {
    /// The operation is not in the registry.
    #[error("Unknown operation '{operation}'")]
    InvalidUsage {
        /// The requested operation name.
        operation: String,
    },

    /// Caller input violated the operation's schema. Raised before any
    /// network call.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The service returned an `ErrorResponse` document.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// An asynchronous report request was cancelled by the service.
    #[error("Report request {request_id} was cancelled")]
    RequestCancelled {
        /// The report request id.
        request_id: String,
    },

    /// A response was missing data a helper depends on.
    #[error("Unexpected response from {operation}: {message}")]
    UnexpectedResponse {
        /// The operation that answered.
        operation: String,
        /// What was missing.
        message: String,
    },

    /// The transport failed (including throttling that outlasted the retry
    /// budget).
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl MwsError {
    /// Returns the HTTP status behind a transport failure, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(e) => e.status(),
            _ => None,
        }
    }

    /// Returns `true` when the call ultimately failed on a throttle signal.
    #[must_use]
    pub fn is_throttled(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_throttled())
    }
}
