//! Error types for the MWS API SDK.
//!
//! This module contains error types used throughout the SDK for configuration
//! and validation errors.
//!
//! # Error Handling
//!
//! All configuration constructors return `Result<T, ConfigError>` to enable
//! fail-fast validation. Error messages are designed to be clear and actionable.
//!
//! # Example
//!
//! ```rust
//! use mws_api::{AccessKeyId, ConfigError};
//!
//! let result = AccessKeyId::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyAccessKeyId)));
//! ```

use thiserror::Error;

/// Errors that can occur during SDK configuration.
///
/// This enum represents all possible errors that can occur when creating
/// or validating configuration types. Each variant provides a clear,
/// actionable error message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Access key id cannot be empty.
    #[error("Access key id cannot be empty. Please provide a valid MWS access key id.")]
    EmptyAccessKeyId,

    /// Secret key cannot be empty.
    #[error("Secret key cannot be empty. Please provide a valid MWS secret access key.")]
    EmptySecretKey,

    /// Seller id is invalid.
    #[error("Invalid seller id '{seller_id}'. Expected a non-empty alphanumeric merchant identifier.")]
    InvalidSellerId {
        /// The invalid seller id that was provided.
        seller_id: String,
    },

    /// Auth token cannot be empty when provided.
    #[error("MWS auth token cannot be empty when provided.")]
    EmptyAuthToken,

    /// Region is not recognized.
    #[error("Invalid region '{region}'. Expected one of: na, br, eu, in, fe, jp, au, cn.")]
    InvalidRegion {
        /// The invalid region string that was provided.
        region: String,
    },

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },

    /// A required environment variable is missing.
    #[error("Missing environment variable '{name}'.")]
    MissingEnvironmentVariable {
        /// The name of the variable.
        name: &'static str,
    },

    /// Endpoint URL is invalid.
    #[error("Invalid endpoint URL '{url}'. Please provide a URL with scheme and host (e.g., 'https://mws.amazonservices.com').")]
    InvalidEndpointUrl {
        /// The invalid URL that was provided.
        url: String,
    },

    /// Throttle settings are out of range.
    #[error("Invalid throttle setting '{field}': {reason}")]
    InvalidThrottleSetting {
        /// The offending setting.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}
