//! Transport layer for MWS communication.
//!
//! This module provides the boundary between the dispatcher and the network.
//! It handles request signing, response decoding and MWS-specific header
//! parsing.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`Transport`]: The async boundary the dispatcher sends through
//! - [`HttpTransport`]: The reqwest-based production transport
//! - [`WireRequest`]: A validated request (path, `Action`, `Version`, parameters)
//! - [`HttpResponse`]: An undecoded response with parsed quota headers
//! - [`TransportError`]: Everything that can fail at this boundary
//! - [`signing`]: Signature Version 2 helpers
//! - [`xml`]: XML and tab-separated body decoding
//!
//! # Example
//!
//! ```rust,ignore
//! use mws_api::clients::{HttpTransport, Transport, WireRequest};
//!
//! let transport = HttpTransport::new(config)?;
//!
//! let request = WireRequest::builder("/Orders/2013-09-01", "GetServiceStatus", "2013-09-01")
//!     .build()?;
//!
//! let body = transport.send(request).await?;
//! ```
//!
//! # Throttling
//!
//! The transport never retries. A 503 response surfaces as
//! [`TransportError::Response`] with `code == 503`; the dispatcher decides
//! whether to wait and resend.

mod errors;
mod http_client;
mod http_request;
mod http_response;
pub mod signing;
mod transport;
pub mod xml;

pub use errors::{HttpResponseError, InvalidWireRequestError, TransportError, THROTTLED_STATUS};
pub use http_client::{HttpTransport, SDK_VERSION};
pub use http_request::{BodyType, WireRequest, WireRequestBuilder};
pub use http_response::{HttpResponse, QuotaStatus};
pub use transport::Transport;
