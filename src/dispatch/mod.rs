//! Throttle-aware dispatch.
//!
//! The [`Dispatcher`] is the single entry point for calling an operation by
//! name. Each attempt runs the same pipeline:
//!
//! ```text
//! PREPARING -> SENT -> SUCCESS
//!                   -> THROTTLED -> WAITING -> PREPARING
//!                   -> FAILED
//! ```
//!
//! 1. Look up the operation's descriptor ([`MwsError::InvalidUsage`] if unknown)
//! 2. Validate and transform the options ([`MwsError::Validation`])
//! 3. Send through the transport, or through the [`QueueScheduler`] when
//!    admission control is enabled and the operation has a quota
//! 4. On a 503, wait `safety_margin * 60 / restore_rate_per_hour` seconds and
//!    start again from step 1, up to the retry ceiling
//! 5. On success, flatten and unwrap the response envelope
//!
//! # Example
//!
//! ```rust,ignore
//! use mws_api::{CallOptions, Dispatcher, ExecConfig, MwsConfig};
//!
//! let dispatcher = Dispatcher::from_config(MwsConfig::from_env()?)?;
//!
//! let status = dispatcher
//!     .call("GetServiceStatus", &CallOptions::new())
//!     .await?;
//!
//! let raw = dispatcher
//!     .call_operation(
//!         "ListMarketplaceParticipations",
//!         &CallOptions::new(),
//!         &ExecConfig::new().return_raw(true),
//!     )
//!     .await?;
//! ```

mod errors;
pub mod queue;

pub use errors::MwsError;
pub use queue::{QueueConfig, QueueKey, QueueScheduler, QueueState, RequestQueue};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::clients::{BodyType, HttpTransport, Transport, TransportError, WireRequest};
use crate::config::{MwsConfig, ThrottleConfig};
use crate::marshal::{flatten, passthrough, transform, unwrap_envelope, CallOptions};
use crate::schema::{OperationDescriptor, SchemaRegistry};

/// Per-call execution options.
///
/// # Example
///
/// ```rust
/// use mws_api::ExecConfig;
///
/// let exec = ExecConfig::new()
///     .no_flatten(true)
///     .max_throttle_retries(5)
///     .save_raw("/tmp/raw.json");
///
/// assert!(exec.no_flatten);
/// assert_eq!(exec.max_throttle_retries, Some(5));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExecConfig {
    /// Skip singleton-array flattening (the envelope is then left in place).
    pub no_flatten: bool,
    /// Return the parsed body untouched.
    pub return_raw: bool,
    /// Retry ceiling for throttled calls; `None` uses the dispatcher default.
    pub max_throttle_retries: Option<u32>,
    /// Write the parsed body, before normalization, to this file.
    pub save_raw: Option<PathBuf>,
    /// Write the normalized result to this file.
    pub save_parsed: Option<PathBuf>,
}

impl ExecConfig {
    /// Creates default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets [`no_flatten`](Self::no_flatten).
    #[must_use]
    pub const fn no_flatten(mut self, no_flatten: bool) -> Self {
        self.no_flatten = no_flatten;
        self
    }

    /// Sets [`return_raw`](Self::return_raw).
    #[must_use]
    pub const fn return_raw(mut self, return_raw: bool) -> Self {
        self.return_raw = return_raw;
        self
    }

    /// Sets the retry ceiling for throttled calls.
    #[must_use]
    pub const fn max_throttle_retries(mut self, retries: u32) -> Self {
        self.max_throttle_retries = Some(retries);
        self
    }

    /// Dumps the raw parsed body to `path`.
    #[must_use]
    pub fn save_raw(mut self, path: impl Into<PathBuf>) -> Self {
        self.save_raw = Some(path.into());
        self
    }

    /// Dumps the normalized result to `path`.
    #[must_use]
    pub fn save_parsed(mut self, path: impl Into<PathBuf>) -> Self {
        self.save_parsed = Some(path.into());
        self
    }
}

/// Calls operations by name, retrying throttled calls.
///
/// Construct it with a registry and a transport; there is no global
/// client. Every call carries its own retry counter, starting at zero.
///
/// # Thread Safety
///
/// `Dispatcher` is `Send + Sync`; share it behind an `Arc` or by reference.
#[derive(Debug)]
pub struct Dispatcher {
    registry: Arc<SchemaRegistry>,
    transport: Arc<dyn Transport>,
    scheduler: Option<Arc<QueueScheduler>>,
    consumer: String,
    throttle: ThrottleConfig,
}

// Verify Dispatcher is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Dispatcher>();
};

impl Dispatcher {
    /// Creates a dispatcher with default throttle tuning and no admission
    /// control.
    #[must_use]
    pub fn new(registry: Arc<SchemaRegistry>, transport: Arc<dyn Transport>) -> Self {
        Self {
            registry,
            transport,
            scheduler: None,
            consumer: String::new(),
            throttle: ThrottleConfig::default(),
        }
    }

    /// Creates a dispatcher over [`HttpTransport`] and the built-in catalog.
    ///
    /// The seller id becomes the queue consumer and the configured throttle
    /// tuning is applied.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Network`] if the HTTP client cannot be built.
    pub fn from_config(config: MwsConfig) -> Result<Self, TransportError> {
        let consumer = config.seller_id().to_string();
        let throttle = *config.throttle();
        let transport = HttpTransport::new(config)?;

        Ok(Self::new(Arc::new(SchemaRegistry::builtin()), Arc::new(transport))
            .with_consumer(consumer)
            .with_throttle(throttle))
    }

    /// Replaces the throttle tuning.
    #[must_use]
    pub const fn with_throttle(mut self, throttle: ThrottleConfig) -> Self {
        self.throttle = throttle;
        self
    }

    /// Sets the consumer identity used in queue keys.
    #[must_use]
    pub fn with_consumer(mut self, consumer: impl Into<String>) -> Self {
        self.consumer = consumer.into();
        self
    }

    /// Routes operations that declare a quota through `scheduler`.
    #[must_use]
    pub fn with_scheduler(mut self, scheduler: Arc<QueueScheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Enables admission control with a scheduler over this dispatcher's
    /// transport.
    #[must_use]
    pub fn with_admission_control(self) -> Self {
        let scheduler = QueueScheduler::new(Arc::clone(&self.transport));
        self.with_scheduler(scheduler)
    }

    /// Returns the operation registry.
    #[must_use]
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Returns the queue scheduler, when admission control is enabled.
    #[must_use]
    pub const fn scheduler(&self) -> Option<&Arc<QueueScheduler>> {
        self.scheduler.as_ref()
    }

    /// Returns the throttle tuning.
    #[must_use]
    pub const fn throttle(&self) -> &ThrottleConfig {
        &self.throttle
    }

    /// Returns the consumer identity used in queue keys.
    #[must_use]
    pub fn consumer(&self) -> &str {
        &self.consumer
    }

    /// Returns how long to wait after `descriptor` was throttled.
    ///
    /// With a usable quota this is `safety_margin * 60 / restore_rate_per_hour`
    /// seconds. The fixed fallback wait applies when there is no usable quota
    /// or the scaled wait is not a valid duration (for instance a negative
    /// or non-finite safety margin).
    #[must_use]
    pub fn backoff(&self, descriptor: &OperationDescriptor) -> Duration {
        let fallback_wait = self.throttle.fallback_wait;
        let Some(quota) = descriptor.usable_quota() else {
            tracing::warn!(
                "No usable quota for {}, falling back to {:?}",
                descriptor.name,
                fallback_wait
            );
            return fallback_wait;
        };

        let scaled = quota.throttle_wait().as_secs_f64() * self.throttle.safety_margin;
        Duration::try_from_secs_f64(scaled).unwrap_or_else(|_| {
            tracing::warn!(
                "Invalid throttle wait for {} (safety margin {}), falling back to {:?}",
                descriptor.name,
                self.throttle.safety_margin,
                fallback_wait
            );
            fallback_wait
        })
    }

    /// Looks up `name` and turns `options` into a wire request.
    ///
    /// # Errors
    ///
    /// Returns [`MwsError::InvalidUsage`] for an unknown operation or
    /// [`MwsError::Validation`] when the options violate its schema.
    pub fn prepare(
        &self,
        name: &str,
        options: &CallOptions,
    ) -> Result<(OperationDescriptor, WireRequest), MwsError> {
        let descriptor = *self
            .registry
            .get(name)
            .ok_or_else(|| MwsError::InvalidUsage {
                operation: name.to_string(),
            })?;

        let params = match descriptor.parameters {
            Some(schema) => transform(schema, options)?,
            None => passthrough(options),
        };

        let mut builder = WireRequest::builder(
            descriptor.resource_path(),
            descriptor.name,
            descriptor.protocol_version(),
        )
        .params(params);
        if let Some(body) = options.body() {
            builder = builder.body(body).body_type(BodyType::detect(body));
        }
        let request = builder.build().map_err(TransportError::from)?;

        tracing::debug!(
            "Prepared {} with {} parameters",
            descriptor.name,
            request.params.len()
        );
        Ok((descriptor, request))
    }

    /// Calls `name` with default execution options.
    ///
    /// # Errors
    ///
    /// See [`call_operation`](Self::call_operation).
    pub async fn call(&self, name: &str, options: &CallOptions) -> Result<Value, MwsError> {
        self.call_operation(name, options, &ExecConfig::default()).await
    }

    /// Calls `name`, retrying on throttling.
    ///
    /// # Errors
    ///
    /// - [`MwsError::InvalidUsage`] for an unknown operation
    /// - [`MwsError::Validation`] for bad options, before any network call
    /// - [`MwsError::Service`] when the body is an `ErrorResponse`
    /// - [`MwsError::Transport`] for transport failures, including a 503
    ///   that outlasted the retry ceiling
    pub async fn call_operation(
        &self,
        name: &str,
        options: &CallOptions,
        exec: &ExecConfig,
    ) -> Result<Value, MwsError> {
        let max_retries = exec
            .max_throttle_retries
            .unwrap_or(self.throttle.max_retries);
        let mut retries = 0;

        loop {
            let (descriptor, request) = self.prepare(name, options)?;

            match self.send(&descriptor, request).await {
                Ok(body) => return Self::finish(name, body, exec).await,
                Err(error) if error.is_throttled() && retries < max_retries => {
                    let wait = self.backoff(&descriptor);
                    retries += 1;
                    tracing::warn!(
                        "{} throttled, retry {} of {} in {:?}",
                        name,
                        retries,
                        max_retries,
                        wait
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(error) => return Err(error.into()),
            }
        }
    }

    async fn send(
        &self,
        descriptor: &OperationDescriptor,
        request: WireRequest,
    ) -> Result<Value, TransportError> {
        match (&self.scheduler, descriptor.usable_quota()) {
            (Some(scheduler), Some(quota)) => {
                let key = QueueKey::new(
                    self.consumer.as_str(),
                    descriptor.category.name,
                    descriptor.name,
                );
                scheduler
                    .enqueue(key, QueueConfig::from_quota(&quota), request)
                    .await
            }
            _ => self.transport.send(request).await,
        }
    }

    async fn finish(name: &str, body: Value, exec: &ExecConfig) -> Result<Value, MwsError> {
        if let Some(path) = &exec.save_raw {
            dump(path, &body).await;
        }
        if exec.return_raw {
            return Ok(body);
        }

        let data = if exec.no_flatten { body } else { flatten(body) };
        let result = unwrap_envelope(name, data)?;

        if let Some(path) = &exec.save_parsed {
            dump(path, &result).await;
        }
        Ok(result)
    }
}

/// Writes `value` as pretty JSON. Failures are logged, never returned.
async fn dump(path: &Path, value: &Value) {
    let bytes = match serde_json::to_vec_pretty(value) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("Could not serialize debug dump for {}: {}", path.display(), e);
            return;
        }
    };
    if let Err(e) = tokio::fs::write(path, bytes).await {
        tracing::warn!("Could not write debug dump to {}: {}", path.display(), e);
    }
}
