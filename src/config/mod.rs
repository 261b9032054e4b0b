//! Configuration types for the MWS API SDK.
//!
//! This module provides the core configuration types used to initialize
//! and configure the SDK for API communication with Marketplace Web Service.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`MwsConfig`]: The main configuration struct holding all SDK settings
//! - [`MwsConfigBuilder`]: A builder for constructing [`MwsConfig`] instances
//! - [`ThrottleConfig`]: Retry ceiling and backoff tuning for throttled calls
//! - [`AccessKeyId`], [`SecretKey`], [`SellerId`], [`AuthToken`]: credentials
//! - [`EndpointUrl`]: An endpoint override (e.g. a local mock server)
//! - [`Region`]: The marketplace region whose endpoint is used
//!
//! # Example
//!
//! ```rust
//! use mws_api::{MwsConfig, AccessKeyId, SecretKey, SellerId, Region};
//!
//! let config = MwsConfig::builder()
//!     .access_key_id(AccessKeyId::new("AKIAEXAMPLE").unwrap())
//!     .secret_key(SecretKey::new("my-secret").unwrap())
//!     .seller_id(SellerId::new("A1B2C3D4").unwrap())
//!     .region(Region::Europe)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.endpoint().authority(), "mws-eu.amazonservices.com");
//! ```

mod newtypes;
mod region;

pub use newtypes::{AccessKeyId, AuthToken, EndpointUrl, SecretKey, SellerId};
pub use region::Region;

use std::time::Duration;

use crate::error::ConfigError;

/// Default number of retries after a throttled (503) response.
pub const DEFAULT_MAX_THROTTLE_RETRIES: u32 = 2;

/// Default multiplier applied to the quota restore interval.
pub const DEFAULT_SAFETY_MARGIN: f64 = 1.5;

/// Default wait used when an operation declares no quota.
pub const DEFAULT_FALLBACK_WAIT: Duration = Duration::from_secs(2);

/// Tuning for the dispatcher's throttle retry loop.
///
/// These are configuration data only; the dispatcher derives the actual
/// wait from each operation's quota.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThrottleConfig {
    /// Retries allowed after the initial attempt when a call is throttled.
    pub max_retries: u32,
    /// Multiplier applied to the time needed to regenerate one quota unit.
    pub safety_margin: f64,
    /// Wait used when an operation has no quota metadata.
    pub fallback_wait: Duration,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_THROTTLE_RETRIES,
            safety_margin: DEFAULT_SAFETY_MARGIN,
            fallback_wait: DEFAULT_FALLBACK_WAIT,
        }
    }
}

impl ThrottleConfig {
    /// Checks that the margin is a positive finite number.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidThrottleSetting`] when it is not.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.safety_margin.is_finite() || self.safety_margin <= 0.0 {
            return Err(ConfigError::InvalidThrottleSetting {
                field: "safety_margin",
                reason: format!("expected a positive number, got {}", self.safety_margin),
            });
        }
        Ok(())
    }
}

/// Configuration for the MWS API SDK.
///
/// Holds the seller's credentials, the endpoint requests are sent to and
/// the throttle tuning used by the dispatcher. Instances are passed
/// explicitly to the transport and dispatcher; there is no global client.
///
/// # Thread Safety
///
/// `MwsConfig` is `Clone`, `Send`, and `Sync`.
#[derive(Clone, Debug)]
pub struct MwsConfig {
    access_key_id: AccessKeyId,
    secret_key: SecretKey,
    seller_id: SellerId,
    auth_token: Option<AuthToken>,
    region: Region,
    endpoint: EndpointUrl,
    user_agent_prefix: Option<String>,
    throttle: ThrottleConfig,
}

impl MwsConfig {
    /// Creates a new builder for constructing a `MwsConfig`.
    #[must_use]
    pub fn builder() -> MwsConfigBuilder {
        MwsConfigBuilder::new()
    }

    /// Builds a configuration from the process environment.
    ///
    /// Reads `MWS_ACCESS_KEY`, `MWS_SECRET_ACCESS_KEY` and `MWS_MERCHANT_ID`
    /// (required) plus `MWS_AUTH_TOKEN` and `MWS_REGION` (optional).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvironmentVariable`] for a missing
    /// required variable, or the validation error of the offending value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`MwsConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name).ok_or(ConfigError::MissingEnvironmentVariable { name })
        };

        let mut builder = Self::builder()
            .access_key_id(AccessKeyId::new(required("MWS_ACCESS_KEY")?)?)
            .secret_key(SecretKey::new(required("MWS_SECRET_ACCESS_KEY")?)?)
            .seller_id(SellerId::new(required("MWS_MERCHANT_ID")?)?);

        if let Some(token) = lookup("MWS_AUTH_TOKEN") {
            builder = builder.auth_token(AuthToken::new(token)?);
        }
        if let Some(region) = lookup("MWS_REGION") {
            builder = builder.region(region.parse()?);
        }

        builder.build()
    }

    /// Returns the access key id.
    #[must_use]
    pub const fn access_key_id(&self) -> &AccessKeyId {
        &self.access_key_id
    }

    /// Returns the secret key.
    #[must_use]
    pub const fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }

    /// Returns the seller id.
    #[must_use]
    pub const fn seller_id(&self) -> &SellerId {
        &self.seller_id
    }

    /// Returns the delegated-access auth token, if configured.
    #[must_use]
    pub const fn auth_token(&self) -> Option<&AuthToken> {
        self.auth_token.as_ref()
    }

    /// Returns the region.
    #[must_use]
    pub const fn region(&self) -> Region {
        self.region
    }

    /// Returns the endpoint requests are sent to.
    #[must_use]
    pub const fn endpoint(&self) -> &EndpointUrl {
        &self.endpoint
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }

    /// Returns the throttle tuning.
    #[must_use]
    pub const fn throttle(&self) -> &ThrottleConfig {
        &self.throttle
    }
}

// Verify MwsConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<MwsConfig>();
};

/// Builder for constructing [`MwsConfig`] instances.
///
/// Required fields are `access_key_id`, `secret_key` and `seller_id`.
///
/// # Defaults
///
/// - `region`: [`Region::NorthAmerica`]
/// - `endpoint`: the region's endpoint over HTTPS
/// - `throttle`: [`ThrottleConfig::default`] (2 retries, 1.5x margin, 2s fallback)
/// - `auth_token`, `user_agent_prefix`: `None`
#[derive(Debug, Default)]
pub struct MwsConfigBuilder {
    access_key_id: Option<AccessKeyId>,
    secret_key: Option<SecretKey>,
    seller_id: Option<SellerId>,
    auth_token: Option<AuthToken>,
    region: Option<Region>,
    endpoint: Option<EndpointUrl>,
    user_agent_prefix: Option<String>,
    throttle: Option<ThrottleConfig>,
}

impl MwsConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the access key id (required).
    #[must_use]
    pub fn access_key_id(mut self, key: AccessKeyId) -> Self {
        self.access_key_id = Some(key);
        self
    }

    /// Sets the secret key (required).
    #[must_use]
    pub fn secret_key(mut self, key: SecretKey) -> Self {
        self.secret_key = Some(key);
        self
    }

    /// Sets the seller id (required).
    #[must_use]
    pub fn seller_id(mut self, seller_id: SellerId) -> Self {
        self.seller_id = Some(seller_id);
        self
    }

    /// Sets the auth token used when calling on behalf of another seller.
    #[must_use]
    pub fn auth_token(mut self, token: AuthToken) -> Self {
        self.auth_token = Some(token);
        self
    }

    /// Sets the region.
    #[must_use]
    pub const fn region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    /// Overrides the endpoint derived from the region.
    #[must_use]
    pub fn endpoint(mut self, endpoint: EndpointUrl) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Sets the throttle tuning.
    #[must_use]
    pub const fn throttle(mut self, throttle: ThrottleConfig) -> Self {
        self.throttle = Some(throttle);
        self
    }

    /// Builds the [`MwsConfig`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if a credential is not
    /// set, or [`ConfigError::InvalidThrottleSetting`] for bad tuning.
    pub fn build(self) -> Result<MwsConfig, ConfigError> {
        let access_key_id = self.access_key_id.ok_or(ConfigError::MissingRequiredField {
            field: "access_key_id",
        })?;
        let secret_key = self
            .secret_key
            .ok_or(ConfigError::MissingRequiredField {
                field: "secret_key",
            })?;
        let seller_id = self
            .seller_id
            .ok_or(ConfigError::MissingRequiredField { field: "seller_id" })?;

        let throttle = self.throttle.unwrap_or_default();
        throttle.validate()?;

        let region = self.region.unwrap_or_default();
        let endpoint = self
            .endpoint
            .unwrap_or_else(|| EndpointUrl::https(region.endpoint_host()));

        Ok(MwsConfig {
            access_key_id,
            secret_key,
            seller_id,
            auth_token: self.auth_token,
            region,
            endpoint,
            user_agent_prefix: self.user_agent_prefix,
            throttle,
        })
    }
}
