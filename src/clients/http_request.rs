//! Wire request type.
//!
//! A [`WireRequest`] is what the dispatcher hands to a
//! [`Transport`](super::Transport): the resource path, the already-validated
//! parameters (including `Action` and `Version`) and, for feed submissions,
//! a raw body. Credentials and the signature are added by the transport.

use std::fmt;

use crate::clients::errors::InvalidWireRequestError;
use crate::marshal::WireQuery;

/// Content type of a raw request body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyType {
    /// XML feed content (`text/xml`).
    Xml,
    /// Flat-file feed content (`text/tab-separated-values`).
    TabSeparated,
}

impl BodyType {
    /// Returns the MIME type string for this body type.
    #[must_use]
    pub const fn as_content_type(&self) -> &'static str {
        match self {
            Self::Xml => "text/xml",
            Self::TabSeparated => "text/tab-separated-values; charset=iso-8859-1",
        }
    }

    /// Guesses the body type from its content.
    #[must_use]
    pub fn detect(body: &str) -> Self {
        if body.trim_start().starts_with('<') {
            Self::Xml
        } else {
            Self::TabSeparated
        }
    }
}

impl fmt::Display for BodyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_content_type())
    }
}

/// A request ready to be signed and sent.
///
/// Use [`WireRequest::builder`] to construct requests.
///
/// # Example
///
/// ```rust
/// use mws_api::clients::WireRequest;
///
/// let request = WireRequest::builder("/Orders/2013-09-01", "GetOrder", "2013-09-01")
///     .param("AmazonOrderId.Id.1", "902-3159896-1390916")
///     .build()
///     .unwrap();
///
/// assert_eq!(request.action(), "GetOrder");
/// assert_eq!(request.params["Version"], "2013-09-01");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WireRequest {
    /// Resource path, e.g. `/Orders/2013-09-01`.
    pub path: String,
    /// Wire parameters, `Action` and `Version` included.
    pub params: WireQuery,
    /// Raw request body (feed content), if any.
    pub body: Option<String>,
    /// Content type of the body.
    pub body_type: Option<BodyType>,
}

impl WireRequest {
    /// Creates a new builder for the given path, action and version.
    #[must_use]
    pub fn builder(
        path: impl Into<String>,
        action: impl Into<String>,
        version: impl Into<String>,
    ) -> WireRequestBuilder {
        WireRequestBuilder::new(path, action, version)
    }

    /// Returns the `Action` parameter.
    #[must_use]
    pub fn action(&self) -> &str {
        self.params.get("Action").map_or("", String::as_str)
    }

    /// Returns `true` when the request posts to the root path, where the
    /// seller is identified as `Merchant` rather than `SellerId`.
    #[must_use]
    pub fn is_root_path(&self) -> bool {
        self.path == "/"
    }

    /// Validates the request.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidWireRequestError`] if:
    /// - `path` does not start with `/`
    /// - `Action` or `Version` is missing or empty
    /// - `body` is `Some` but `body_type` is `None`
    pub fn verify(&self) -> Result<(), InvalidWireRequestError> {
        if !self.path.starts_with('/') {
            return Err(InvalidWireRequestError::InvalidPath {
                path: self.path.clone(),
            });
        }

        let action = self.action();
        if action.is_empty() {
            return Err(InvalidWireRequestError::MissingAction);
        }
        if self.params.get("Version").map_or(true, String::is_empty) {
            return Err(InvalidWireRequestError::MissingVersion {
                action: action.to_string(),
            });
        }

        if self.body.is_some() && self.body_type.is_none() {
            return Err(InvalidWireRequestError::MissingBodyType);
        }

        Ok(())
    }
}

/// Builder for constructing [`WireRequest`] instances.
#[derive(Debug)]
pub struct WireRequestBuilder {
    path: String,
    params: WireQuery,
    body: Option<String>,
    body_type: Option<BodyType>,
}

impl WireRequestBuilder {
    fn new(path: impl Into<String>, action: impl Into<String>, version: impl Into<String>) -> Self {
        let mut params = WireQuery::new();
        params.insert("Action".to_string(), action.into());
        params.insert("Version".to_string(), version.into());
        Self {
            path: path.into(),
            params,
            body: None,
            body_type: None,
        }
    }

    /// Adds validated parameters. `Action` and `Version` are never overwritten.
    #[must_use]
    pub fn params(mut self, params: WireQuery) -> Self {
        for (key, value) in params {
            if key != "Action" && key != "Version" {
                self.params.insert(key, value);
            }
        }
        self
    }

    /// Adds a single parameter.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Sets the raw request body.
    ///
    /// When setting a body, you must also set the body type via [`body_type`](Self::body_type).
    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the content type of the request body.
    #[must_use]
    pub const fn body_type(mut self, body_type: BodyType) -> Self {
        self.body_type = Some(body_type);
        self
    }

    /// Builds the [`WireRequest`], validating it in the process.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidWireRequestError`] if the request fails validation.
    pub fn build(self) -> Result<WireRequest, InvalidWireRequestError> {
        let request = WireRequest {
            path: self.path,
            params: self.params,
            body: self.body,
            body_type: self.body_type,
        };
        request.verify()?;
        Ok(request)
    }
}
