//! Per-operation admission control.
//!
//! A [`RequestQueue`] holds pending calls for one (consumer, category,
//! action) triple and releases them in arrival order while fewer than
//! `max_in_flight` are running. When calls are still waiting after a drain,
//! a replenishment timer is armed for one restore interval; nothing is
//! released until it fires.
//!
//! ```text
//! IDLE -> ADMITTING -> AT_CAPACITY -> RECOVERING -> ADMITTING | IDLE
//! ```
//!
//! The [`QueueScheduler`] owns the queues, creates them on demand and
//! removes each one once it is empty, idle and has no timer armed.
//!
//! Failures reject only the call that failed; capacity is released either
//! way and nothing is retried here.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use mws_api::dispatch::{QueueConfig, QueueKey, QueueScheduler};
//!
//! let scheduler = QueueScheduler::new(transport);
//! let key = QueueKey::new("A1SELLER", "Orders", "ListOrders");
//! let config = QueueConfig::new(6, Duration::from_secs(60));
//!
//! let body = scheduler.enqueue(key, config, request).await?;
//! ```

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::oneshot;

use crate::clients::{Transport, TransportError, WireRequest};
use crate::schema::Quota;

type CallResult = Result<Value, TransportError>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Identifies one queue.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QueueKey {
    /// Whose quota this is (usually the seller id).
    pub consumer: String,
    /// API category, e.g. `Orders`.
    pub category: String,
    /// Operation name, e.g. `ListOrders`.
    pub action: String,
}

impl QueueKey {
    /// Creates a key.
    #[must_use]
    pub fn new(
        consumer: impl Into<String>,
        category: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            consumer: consumer.into(),
            category: category.into(),
            action: action.into(),
        }
    }
}

impl fmt::Display for QueueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.consumer, self.category, self.action)
    }
}

/// Admission settings for one queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueueConfig {
    /// Ceiling on concurrently running calls. Zero is treated as one.
    pub max_in_flight: u32,
    /// How long a replenishment timer waits before releasing again.
    pub restore_interval: Duration,
}

impl QueueConfig {
    /// Creates a config.
    #[must_use]
    pub const fn new(max_in_flight: u32, restore_interval: Duration) -> Self {
        Self {
            max_in_flight,
            restore_interval,
        }
    }

    /// Derives the config from an operation quota: the burst size and the
    /// time needed to restore one unit.
    #[must_use]
    pub fn from_quota(quota: &Quota) -> Self {
        Self::new(quota.max_in_flight, quota.restore_interval())
    }

    fn ceiling(&self) -> u32 {
        self.max_in_flight.max(1)
    }
}

/// Observable state of a queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueueState {
    /// Nothing pending, nothing running, no timer.
    Idle,
    /// Calls are running or waiting below the ceiling.
    Admitting,
    /// The ceiling is reached; new arrivals wait.
    AtCapacity,
    /// A replenishment timer is armed; no releases until it fires.
    Recovering,
}

struct PendingCall {
    request: WireRequest,
    reply: oneshot::Sender<CallResult>,
}

#[derive(Default)]
struct QueueInner {
    in_flight: u32,
    pending: VecDeque<PendingCall>,
    replenish_armed: bool,
}

impl QueueInner {
    fn is_idle(&self) -> bool {
        self.in_flight == 0 && self.pending.is_empty() && !self.replenish_armed
    }
}

/// Pending calls for one operation.
pub struct RequestQueue {
    key: QueueKey,
    config: QueueConfig,
    transport: Arc<dyn Transport>,
    scheduler: Weak<QueueScheduler>,
    inner: Mutex<QueueInner>,
}

impl fmt::Debug for RequestQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = lock(&self.inner);
        f.debug_struct("RequestQueue")
            .field("key", &self.key)
            .field("config", &self.config)
            .field("in_flight", &inner.in_flight)
            .field("pending", &inner.pending.len())
            .field("replenish_armed", &inner.replenish_armed)
            .finish()
    }
}

impl RequestQueue {
    /// Returns the queue's key.
    #[must_use]
    pub const fn key(&self) -> &QueueKey {
        &self.key
    }

    /// Returns the queue's admission settings.
    #[must_use]
    pub const fn config(&self) -> QueueConfig {
        self.config
    }

    /// Returns the number of running calls.
    #[must_use]
    pub fn in_flight(&self) -> u32 {
        lock(&self.inner).in_flight
    }

    /// Returns the number of calls waiting for release.
    #[must_use]
    pub fn pending(&self) -> usize {
        lock(&self.inner).pending.len()
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> QueueState {
        let inner = lock(&self.inner);
        if inner.replenish_armed {
            QueueState::Recovering
        } else if inner.in_flight >= self.config.ceiling() {
            QueueState::AtCapacity
        } else if inner.in_flight > 0 || !inner.pending.is_empty() {
            QueueState::Admitting
        } else {
            QueueState::Idle
        }
    }

    fn is_idle(&self) -> bool {
        lock(&self.inner).is_idle()
    }

    fn push(&self, call: PendingCall) {
        lock(&self.inner).pending.push_back(call);
    }

    /// Releases pending calls while under the ceiling, arming the
    /// replenishment timer if any remain.
    fn drain(self: &Arc<Self>) {
        let mut released = Vec::new();
        let arm_timer;
        let idle;
        {
            let mut inner = lock(&self.inner);
            if inner.replenish_armed {
                return;
            }
            while inner.in_flight < self.config.ceiling() {
                let Some(call) = inner.pending.pop_front() else {
                    break;
                };
                inner.in_flight += 1;
                released.push(call);
            }
            arm_timer = !inner.pending.is_empty();
            if arm_timer {
                inner.replenish_armed = true;
            }
            idle = inner.is_idle();
        }

        for call in released {
            tracing::debug!("Admitting call on {}", self.key);
            self.execute(call);
        }

        if arm_timer {
            tracing::debug!(
                "Queue {} at capacity, replenishing in {:?}",
                self.key,
                self.config.restore_interval
            );
            let queue = Arc::clone(self);
            tokio::spawn(async move {
                tokio::time::sleep(queue.config.restore_interval).await;
                lock(&queue.inner).replenish_armed = false;
                tracing::debug!("Replenishment timer fired for {}", queue.key);
                queue.drain();
            });
        }

        if idle {
            if let Some(scheduler) = self.scheduler.upgrade() {
                scheduler.remove_if_idle(&self.key);
            }
        }
    }

    fn execute(self: &Arc<Self>, call: PendingCall) {
        let queue = Arc::clone(self);
        tokio::spawn(async move {
            let PendingCall { request, reply } = call;
            let result = queue.transport.send(request).await;
            queue.on_complete();
            // The caller may have stopped waiting
            let _ = reply.send(result);
        });
    }

    /// Releases one unit of capacity and drains again.
    fn on_complete(self: &Arc<Self>) {
        {
            let mut inner = lock(&self.inner);
            inner.in_flight = inner.in_flight.saturating_sub(1);
        }
        self.drain();
    }
}

/// Registry of per-operation queues.
pub struct QueueScheduler {
    transport: Arc<dyn Transport>,
    queues: Mutex<HashMap<QueueKey, Arc<RequestQueue>>>,
}

impl fmt::Debug for QueueScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueScheduler")
            .field("transport", &self.transport)
            .field("queues", &lock(&self.queues).len())
            .finish()
    }
}

// Verify QueueScheduler is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<QueueScheduler>();
};

impl QueueScheduler {
    /// Creates a scheduler sending through `transport`.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Arc<Self> {
        Arc::new(Self {
            transport,
            queues: Mutex::new(HashMap::new()),
        })
    }

    /// Looks up a live queue.
    #[must_use]
    pub fn get(&self, key: &QueueKey) -> Option<Arc<RequestQueue>> {
        lock(&self.queues).get(key).cloned()
    }

    /// Returns the number of live queues.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.queues).len()
    }

    /// Returns `true` if no queue is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        lock(&self.queues).is_empty()
    }

    /// Queues `request` under `key` and waits for its result.
    ///
    /// The queue is created with `config` if it does not exist; an existing
    /// queue keeps the settings it was created with.
    ///
    /// # Errors
    ///
    /// Returns the transport's error for this call, or
    /// [`TransportError::Aborted`] if the call was dropped without a result.
    pub async fn enqueue(
        self: &Arc<Self>,
        key: QueueKey,
        config: QueueConfig,
        request: WireRequest,
    ) -> Result<Value, TransportError> {
        let (reply, receiver) = oneshot::channel();

        let queue = {
            let mut queues = lock(&self.queues);
            let queue = queues
                .entry(key)
                .or_insert_with_key(|key| {
                    tracing::debug!("Creating queue {}", key);
                    Arc::new(RequestQueue {
                        key: key.clone(),
                        config,
                        transport: Arc::clone(&self.transport),
                        scheduler: Arc::downgrade(self),
                        inner: Mutex::new(QueueInner::default()),
                    })
                })
                .clone();
            queue.push(PendingCall { request, reply });
            queue
        };
        queue.drain();

        receiver.await.unwrap_or(Err(TransportError::Aborted))
    }

    fn remove_if_idle(&self, key: &QueueKey) {
        let mut queues = lock(&self.queues);
        if queues.get(key).is_some_and(|queue| queue.is_idle()) {
            queues.remove(key);
            tracing::debug!("Removed drained queue {}", key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::HttpResponseError;
    use async_trait::async_trait;
    use serde_json::json;

    #[derive(Debug)]
    struct EchoTransport {
        delay: Duration,
    }

    #[async_trait]
    impl Transport for EchoTransport {
        async fn send(&self, request: WireRequest) -> Result<Value, TransportError> {
            tokio::time::sleep(self.delay).await;
            if request.params.contains_key("Fail") {
                return Err(HttpResponseError {
                    code: 400,
                    message: "bad".to_string(),
                    error_code: None,
                    request_id: None,
                }
                .into());
            }
            Ok(json!({ "action": request.action() }))
        }
    }

    fn request(action: &str) -> WireRequest {
        WireRequest::builder("/Test/2020-01-01", action, "2020-01-01")
            .build()
            .unwrap()
    }

    fn scheduler(delay: Duration) -> Arc<QueueScheduler> {
        QueueScheduler::new(Arc::new(EchoTransport { delay }))
    }

    #[test]
    fn test_queue_config_from_quota() {
        let config = QueueConfig::from_quota(&Quota::new(6, 60.0));
        assert_eq!(config.max_in_flight, 6);
        assert_eq!(config.restore_interval, Duration::from_secs(60));
        assert_eq!(QueueConfig::new(0, Duration::ZERO).ceiling(), 1);
    }

    #[test]
    fn test_queue_key_display() {
        assert_eq!(QueueKey::new("S", "Orders", "ListOrders").to_string(), "S/Orders/ListOrders");
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_call_resolves_and_queue_is_removed() {
        let scheduler = scheduler(Duration::from_millis(10));
        let key = QueueKey::new("S", "Test", "Op");

        let body = scheduler
            .enqueue(key.clone(), QueueConfig::new(1, Duration::from_secs(5)), request("Op"))
            .await
            .unwrap();

        assert_eq!(body, json!({"action": "Op"}));
        assert!(scheduler.get(&key).is_none());
        assert!(scheduler.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_rejects_only_its_own_call() {
        let scheduler = scheduler(Duration::from_millis(10));
        let key = QueueKey::new("S", "Test", "Op");
        let config = QueueConfig::new(2, Duration::from_secs(1));

        let failing = WireRequest::builder("/Test/2020-01-01", "Op", "2020-01-01")
            .param("Fail", "1")
            .build()
            .unwrap();

        let (bad, good) = tokio::join!(
            scheduler.enqueue(key.clone(), config, failing),
            scheduler.enqueue(key.clone(), config, request("Op")),
        );

        assert_eq!(bad.unwrap_err().status(), Some(400));
        assert!(good.is_ok());
        assert!(scheduler.get(&key).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_state_transitions_under_load() {
        let scheduler = scheduler(Duration::from_secs(1));
        let key = QueueKey::new("S", "Test", "Op");
        let config = QueueConfig::new(1, Duration::from_secs(10));

        let first = tokio::spawn({
            let scheduler = Arc::clone(&scheduler);
            let key = key.clone();
            async move { scheduler.enqueue(key, config, request("Op")).await }
        });
        tokio::task::yield_now().await;

        let queue = scheduler.get(&key).unwrap();
        assert_eq!(queue.state(), QueueState::AtCapacity);
        assert_eq!(queue.in_flight(), 1);

        let second = tokio::spawn({
            let scheduler = Arc::clone(&scheduler);
            let key = key.clone();
            async move { scheduler.enqueue(key, config, request("Op")).await }
        });
        tokio::task::yield_now().await;

        assert_eq!(queue.state(), QueueState::Recovering);
        assert_eq!(queue.pending(), 1);

        assert!(first.await.unwrap().is_ok());
        assert!(second.await.unwrap().is_ok());
        assert_eq!(queue.state(), QueueState::Idle);
        assert!(scheduler.get(&key).is_none());
    }
}
