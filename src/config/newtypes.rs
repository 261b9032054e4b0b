//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear error messages.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A validated MWS access key id.
///
/// This newtype ensures the key is non-empty and provides type safety
/// to prevent accidental misuse of raw strings.
///
/// # Example
///
/// ```rust
/// use mws_api::AccessKeyId;
///
/// let key = AccessKeyId::new("AKIAEXAMPLE").unwrap();
/// assert_eq!(key.as_ref(), "AKIAEXAMPLE");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessKeyId(String);

impl AccessKeyId {
    /// Creates a new validated access key id.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyAccessKeyId`] if the key is empty.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(ConfigError::EmptyAccessKeyId);
        }
        Ok(Self(key))
    }
}

impl AsRef<str> for AccessKeyId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A validated MWS secret access key.
///
/// The `Debug` implementation masks the secret value, displaying only
/// `SecretKey(*****)` instead of the actual key.
///
/// # Example
///
/// ```rust
/// use mws_api::SecretKey;
///
/// let secret = SecretKey::new("my-secret").unwrap();
/// assert_eq!(format!("{:?}", secret), "SecretKey(*****)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(String);

impl SecretKey {
    /// Creates a new validated secret key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptySecretKey`] if the key is empty.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.is_empty() {
            return Err(ConfigError::EmptySecretKey);
        }
        Ok(Self(key))
    }
}

impl AsRef<str> for SecretKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(*****)")
    }
}

/// A delegated-access token issued to a developer by a seller.
///
/// Masked in debug output like [`SecretKey`].
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    /// Creates a new auth token.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyAuthToken`] if the token is empty.
    pub fn new(token: impl Into<String>) -> Result<Self, ConfigError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ConfigError::EmptyAuthToken);
        }
        Ok(Self(token))
    }
}

impl AsRef<str> for AuthToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(*****)")
    }
}

/// A validated seller (merchant) identifier.
///
/// Seller ids are uppercase alphanumeric strings such as `A1B2C3D4E5F6G7`.
/// Input is trimmed and uppercased.
///
/// # Serialization
///
/// ```rust
/// use mws_api::SellerId;
///
/// let seller = SellerId::new("a1b2c3").unwrap();
/// let json = serde_json::to_string(&seller).unwrap();
/// assert_eq!(json, r#""A1B2C3""#);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SellerId(String);

impl SellerId {
    /// Creates a new validated seller id.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSellerId`] if the id is empty or
    /// contains non-alphanumeric characters.
    pub fn new(seller_id: impl Into<String>) -> Result<Self, ConfigError> {
        let seller_id = seller_id.into().trim().to_uppercase();
        if seller_id.is_empty() || !seller_id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ConfigError::InvalidSellerId { seller_id });
        }
        Ok(Self(seller_id))
    }
}

impl AsRef<str> for SellerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SellerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for SellerId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SellerId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}

/// A validated service endpoint URL.
///
/// Used to override the regional endpoint, e.g. to point the client at a
/// local mock server. The URL must have a scheme and a host; an optional
/// port is kept because it is part of the signed host value.
///
/// # Example
///
/// ```rust
/// use mws_api::EndpointUrl;
///
/// let url = EndpointUrl::new("http://localhost:8080/").unwrap();
/// assert_eq!(url.scheme(), "http");
/// assert_eq!(url.authority(), "localhost:8080");
/// assert_eq!(url.base(), "http://localhost:8080");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndpointUrl {
    scheme: String,
    authority: String,
}

impl EndpointUrl {
    /// Creates a new validated endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEndpointUrl`] if the URL is invalid.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        let url = url.trim();
        let invalid = || ConfigError::InvalidEndpointUrl {
            url: url.to_string(),
        };

        let (scheme, rest) = url.split_once("://").ok_or_else(invalid)?;
        if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(invalid());
        }

        // Authority ends at path, query, or fragment
        let authority = rest
            .find(['/', '?', '#'])
            .map_or(rest, |i| &rest[..i]);
        let host = authority.split(':').next().unwrap_or_default();
        if host.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            scheme: scheme.to_lowercase(),
            authority: authority.to_lowercase(),
        })
    }

    /// Builds the endpoint URL for a bare host name over HTTPS.
    #[must_use]
    pub fn https(host: &str) -> Self {
        Self {
            scheme: "https".to_string(),
            authority: host.to_lowercase(),
        }
    }

    /// Returns the URL scheme (e.g., "https").
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Returns `host[:port]`, the value that is signed.
    #[must_use]
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Returns `scheme://authority` without a trailing slash.
    #[must_use]
    pub fn base(&self) -> String {
        format!("{}://{}", self.scheme, self.authority)
    }
}

impl fmt::Display for EndpointUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.authority)
    }
}
