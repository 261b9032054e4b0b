//! Integration tests for per-operation admission control.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use mws_api::clients::{Transport, TransportError, WireRequest};
use mws_api::dispatch::{QueueConfig, QueueKey, QueueScheduler, QueueState};
use serde_json::{json, Value};
use tokio::time::Instant;

/// Records when each call starts and ends; every call takes `delay`.
#[derive(Debug)]
struct TimedTransport {
    delay: Duration,
    origin: Instant,
    log: Mutex<Vec<(String, Duration, Duration)>>,
}

impl TimedTransport {
    fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            origin: Instant::now(),
            log: Mutex::new(Vec::new()),
        })
    }

    fn span(&self, tag: &str) -> (Duration, Duration) {
        let log = self.log.lock().unwrap();
        let (_, start, end) = log
            .iter()
            .find(|(t, _, _)| t == tag)
            .unwrap_or_else(|| panic!("no call tagged {tag}"));
        (*start, *end)
    }
}

#[async_trait]
impl Transport for TimedTransport {
    async fn send(&self, request: WireRequest) -> Result<Value, TransportError> {
        let tag = request.params.get("Tag").cloned().unwrap_or_default();
        let start = self.origin.elapsed();
        tokio::time::sleep(self.delay).await;
        let end = self.origin.elapsed();
        self.log.lock().unwrap().push((tag.clone(), start, end));
        Ok(json!({ "tag": tag }))
    }
}

fn request(tag: &str) -> WireRequest {
    WireRequest::builder("/Orders/2013-09-01", "ListOrders", "2013-09-01")
        .param("Tag", tag)
        .build()
        .unwrap()
}

fn key() -> QueueKey {
    QueueKey::new("A1SELLER", "Orders", "ListOrders")
}

#[tokio::test(start_paused = true)]
async fn test_single_slot_runs_calls_in_order() {
    let transport = TimedTransport::new(Duration::from_millis(100));
    let scheduler = QueueScheduler::new(transport.clone());
    let config = QueueConfig::new(1, Duration::from_secs(1));

    let (first, second) = tokio::join!(
        scheduler.enqueue(key(), config, request("first")),
        scheduler.enqueue(key(), config, request("second")),
    );

    assert_eq!(first.unwrap(), json!({"tag": "first"}));
    assert_eq!(second.unwrap(), json!({"tag": "second"}));

    let (start1, end1) = transport.span("first");
    let (start2, _) = transport.span("second");
    assert!(start1 < end1);
    assert!(end1 <= start2, "second started at {start2:?} before first ended at {end1:?}");
    // The waiting call is released by the replenishment timer
    assert!(start2 >= Duration::from_secs(1), "{start2:?}");
    assert!(scheduler.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_calls_below_ceiling_run_concurrently() {
    let transport = TimedTransport::new(Duration::from_millis(100));
    let scheduler = QueueScheduler::new(transport.clone());
    let config = QueueConfig::new(3, Duration::from_secs(60));

    let started = Instant::now();
    let (a, b, c) = tokio::join!(
        scheduler.enqueue(key(), config, request("a")),
        scheduler.enqueue(key(), config, request("b")),
        scheduler.enqueue(key(), config, request("c")),
    );

    assert!(a.is_ok() && b.is_ok() && c.is_ok());
    assert!(started.elapsed() < Duration::from_millis(200));
    assert!(scheduler.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_queues_are_independent_per_key() {
    let transport = TimedTransport::new(Duration::from_millis(100));
    let scheduler = QueueScheduler::new(transport.clone());
    let config = QueueConfig::new(1, Duration::from_secs(60));
    let other = QueueKey::new("A1SELLER", "Orders", "GetOrder");

    let started = Instant::now();
    let (a, b) = tokio::join!(
        scheduler.enqueue(key(), config, request("a")),
        scheduler.enqueue(other, config, request("b")),
    );

    assert!(a.is_ok() && b.is_ok());
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_queue_reports_recovering_while_timer_is_armed() {
    let transport = TimedTransport::new(Duration::from_millis(100));
    let scheduler = QueueScheduler::new(transport.clone());
    let config = QueueConfig::new(1, Duration::from_secs(5));

    let first = tokio::spawn({
        let scheduler = Arc::clone(&scheduler);
        async move { scheduler.enqueue(key(), config, request("first")).await }
    });
    let second = tokio::spawn({
        let scheduler = Arc::clone(&scheduler);
        async move { scheduler.enqueue(key(), config, request("second")).await }
    });

    tokio::time::sleep(Duration::from_millis(500)).await;
    let queue = scheduler.get(&key()).unwrap();
    assert_eq!(queue.state(), QueueState::Recovering);
    assert_eq!(queue.pending(), 1);
    assert_eq!(queue.in_flight(), 0);

    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();
    assert!(scheduler.get(&key()).is_none());
}
