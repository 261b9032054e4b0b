//! # MWS API Rust SDK
//!
//! A Rust client for the Amazon Marketplace Web Service (MWS) API:
//! schema-validated requests, Signature Version 2 signing and
//! throttle-aware dispatch.
//!
//! ## Overview
//!
//! This SDK provides:
//! - Type-safe configuration via [`MwsConfig`] and [`MwsConfigBuilder`]
//! - Validated newtypes for credentials and endpoints
//! - A catalog of operation descriptors ([`SchemaRegistry`]) with parameter
//!   rules and quota metadata
//! - Option validation and wire encoding ([`marshal::transform`])
//! - Response flattening and key normalization ([`marshal::normalize`])
//! - A [`Dispatcher`] that retries throttled calls and can admit calls
//!   through per-operation queues ([`QueueScheduler`])
//! - Helpers for orders, sellers and reports in [`domain`]
//!
//! ## Quick Start
//!
//! ```rust
//! use mws_api::{AccessKeyId, MwsConfig, Region, SecretKey, SellerId};
//!
//! let config = MwsConfig::builder()
//!     .access_key_id(AccessKeyId::new("AKIAEXAMPLE").unwrap())
//!     .secret_key(SecretKey::new("my-secret").unwrap())
//!     .seller_id(SellerId::new("A1B2C3D4").unwrap())
//!     .region(Region::NorthAmerica)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.endpoint().authority(), "mws.amazonservices.com");
//! ```
//!
//! ## Calling Operations
//!
//! ```rust,ignore
//! use mws_api::{CallOptions, Dispatcher, MwsConfig};
//!
//! let dispatcher = Dispatcher::from_config(MwsConfig::from_env()?)?;
//!
//! let options = CallOptions::new()
//!     .set("MarketplaceId", vec!["ATVPDKIKX0DER"])
//!     .set("CreatedAfter", "2024-01-01T00:00:00.000Z");
//!
//! let result = dispatcher.call("ListOrders", &options).await?;
//! ```
//!
//! ## Validation
//!
//! Options are checked against the operation's schema before anything is
//! sent:
//!
//! ```rust
//! use mws_api::{CallOptions, SchemaRegistry};
//! use mws_api::marshal::{transform, ValidationError};
//!
//! let registry = SchemaRegistry::builtin();
//! let list_orders = registry.get("ListOrders").unwrap();
//!
//! let schema = list_orders.parameters.unwrap();
//! let result = transform(schema, &CallOptions::new());
//! assert!(matches!(result, Err(ValidationError::MissingRequired { .. })));
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: configuration, registry and dispatcher are
//!   instances passed explicitly
//! - **Fail-fast validation**: newtypes and options validate before any
//!   network call
//! - **Thread-safe**: the dispatcher and transport are `Send + Sync`
//! - **Async-first**: built on the Tokio runtime

pub mod clients;
pub mod config;
pub mod dispatch;
pub mod domain;
pub mod error;
pub mod marshal;
pub mod schema;

// Re-export public types at crate root for convenience
pub use config::{
    AccessKeyId, AuthToken, EndpointUrl, MwsConfig, MwsConfigBuilder, Region, SecretKey,
    SellerId, ThrottleConfig,
};
pub use error::ConfigError;

pub use clients::{HttpTransport, Transport, TransportError, WireRequest};
pub use dispatch::{Dispatcher, ExecConfig, MwsError, QueueScheduler};
pub use marshal::{CallOptions, ParamValue, ServiceError, ValidationError};
pub use schema::{OperationDescriptor, Quota, SchemaRegistry};
