use async_trait::async_trait;
use serde_json::json;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

use super::*;
use crate::constants::SYNC_QUEUE_KEY;
use crate::errors::{Error, Result};
use crate::store::{Collection, KeyValueStoreTrait, MemoryKeyValueStore};

const TIMEOUT: Duration = Duration::from_secs(5);

/// Records transmitted items; fails those whose payload `id` is listed.
#[derive(Default)]
struct MockTransmitter {
    sent: Arc<Mutex<Vec<(Collection, SyncOperation, serde_json::Value)>>>,
    failing_ids: Mutex<HashSet<i64>>,
}

impl MockTransmitter {
    fn failing(ids: &[i64]) -> Self {
        let t = Self::default();
        t.failing_ids.lock().unwrap().extend(ids.iter().copied());
        t
    }

    fn sent_ops(&self) -> Vec<(SyncOperation, i64)> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, op, p)| (*op, p["id"].as_i64().unwrap_or(-1)))
            .collect()
    }
}

#[async_trait]
impl SyncTransmitter for MockTransmitter {
    async fn transmit(&self, item: &SyncQueueItem) -> Result<()> {
        let id = item.payload["id"].as_i64().unwrap_or(-1);
        if self.failing_ids.lock().unwrap().contains(&id) {
            return Err(Error::transmit("backend rejected item"));
        }
        self.sent
            .lock()
            .unwrap()
            .push((item.collection, item.operation, item.payload.clone()));
        Ok(())
    }
}

/// Blocks each transmit until released, signalling when one starts.
struct GatedTransmitter {
    started: Notify,
    release: Notify,
}

#[async_trait]
impl SyncTransmitter for GatedTransmitter {
    async fn transmit(&self, _item: &SyncQueueItem) -> Result<()> {
        self.started.notify_one();
        self.release.notified().await;
        Ok(())
    }
}

struct SlowTransmitter;

#[async_trait]
impl SyncTransmitter for SlowTransmitter {
    async fn transmit(&self, _item: &SyncQueueItem) -> Result<()> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(())
    }
}

/// Key-value store whose writes can be switched to failing.
#[derive(Default)]
struct FlakyKv {
    inner: MemoryKeyValueStore,
    failing: AtomicBool,
}

impl FlakyKv {
    fn fail_writes(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::StorageUnavailable("disk full".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStoreTrait for FlakyKv {
    async fn get_value(&self, key: &str) -> Result<Option<String>> {
        self.inner.get_value(key).await
    }

    async fn set_value(&self, key: &str, value: &str) -> Result<()> {
        self.check()?;
        self.inner.set_value(key, value).await
    }

    async fn remove_value(&self, key: &str) -> Result<()> {
        self.check()?;
        self.inner.remove_value(key).await
    }
}

fn queue() -> (SyncQueue, Arc<MemoryKeyValueStore>) {
    let kv = Arc::new(MemoryKeyValueStore::new());
    (SyncQueue::new(kv.clone()), kv)
}

#[tokio::test]
async fn enqueue_persists_before_returning() {
    let (queue, kv) = queue();
    let item = queue
        .enqueue(Collection::Expenses, SyncOperation::Create, json!({"id": 1}))
        .await
        .unwrap();

    assert!(!item.synced);
    let raw = kv.get_value(SYNC_QUEUE_KEY).await.unwrap().unwrap();
    let persisted: Vec<SyncQueueItem> = serde_json::from_str(&raw).unwrap();
    assert_eq!(persisted, vec![item]);
}

#[tokio::test]
async fn load_restores_a_previous_session() {
    let kv = Arc::new(MemoryKeyValueStore::new());
    {
        let first = SyncQueue::new(kv.clone());
        first
            .enqueue(Collection::Expenses, SyncOperation::Create, json!({"id": 1}))
            .await
            .unwrap();
        first
            .enqueue(Collection::Revenues, SyncOperation::Create, json!({"id": 2}))
            .await
            .unwrap();
    }

    let second = SyncQueue::new(kv);
    assert_eq!(second.load().await.unwrap(), 2);
    assert_eq!(second.pending_count().await, 2);
    assert_eq!(second.items().await[1].collection, Collection::Revenues);
}

#[tokio::test]
async fn full_flush_replays_in_order_and_empties_pending() {
    let (queue, _kv) = queue();
    queue
        .enqueue(Collection::Expenses, SyncOperation::Create, json!({"id": 1}))
        .await
        .unwrap();
    queue
        .enqueue(Collection::Expenses, SyncOperation::Update, json!({"id": 1}))
        .await
        .unwrap();
    queue
        .enqueue(Collection::Expenses, SyncOperation::Delete, json!({"id": 1}))
        .await
        .unwrap();

    let transmitter = MockTransmitter::default();
    let report = queue.flush(&transmitter, TIMEOUT).await.unwrap();

    assert!(report.is_clean());
    assert_eq!(report.synced, 3);
    assert_eq!(queue.pending_count().await, 0);
    assert_eq!(
        transmitter.sent_ops(),
        vec![
            (SyncOperation::Create, 1),
            (SyncOperation::Update, 1),
            (SyncOperation::Delete, 1)
        ]
    );

    // Synced items stay until cleared.
    assert_eq!(queue.items().await.len(), 3);
}

#[tokio::test]
async fn failure_continues_and_defers_same_entity() {
    let (queue, _kv) = queue();
    queue
        .enqueue(Collection::Goals, SyncOperation::Create, json!({"id": 5}))
        .await
        .unwrap();
    queue
        .enqueue(Collection::Expenses, SyncOperation::Create, json!({"id": 6}))
        .await
        .unwrap();
    queue
        .enqueue(Collection::Goals, SyncOperation::Update, json!({"id": 5}))
        .await
        .unwrap();

    let transmitter = MockTransmitter::failing(&[5]);
    let report = queue.flush(&transmitter, TIMEOUT).await.unwrap();

    assert_eq!(report.attempted, 2);
    assert_eq!(report.synced, 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.deferred, 1);
    assert_eq!(queue.pending_count().await, 2);
    assert_eq!(transmitter.sent_ops(), vec![(SyncOperation::Create, 6)]);

    // Once the backend accepts the goal, its create and update follow in order.
    let healthy = MockTransmitter::default();
    let report = queue.flush(&healthy, TIMEOUT).await.unwrap();
    assert_eq!(report.synced, 2);
    assert_eq!(
        healthy.sent_ops(),
        vec![(SyncOperation::Create, 5), (SyncOperation::Update, 5)]
    );
    assert_eq!(queue.pending_count().await, 0);
}

#[tokio::test(start_paused = true)]
async fn transmit_timeout_counts_as_failure() {
    let (queue, _kv) = queue();
    queue
        .enqueue(Collection::Expenses, SyncOperation::Create, json!({"id": 1}))
        .await
        .unwrap();

    let report = queue
        .flush(&SlowTransmitter, Duration::from_secs(1))
        .await
        .unwrap();

    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].message.contains("timed out"));
    assert_eq!(queue.pending_count().await, 1);
}

#[tokio::test]
async fn concurrent_flush_reports_already_running() {
    let queue = Arc::new(queue().0);
    queue
        .enqueue(Collection::Expenses, SyncOperation::Create, json!({"id": 1}))
        .await
        .unwrap();

    let gated = Arc::new(GatedTransmitter {
        started: Notify::new(),
        release: Notify::new(),
    });

    let first = {
        let queue = queue.clone();
        let gated = gated.clone();
        tokio::spawn(async move { queue.flush(gated.as_ref(), TIMEOUT).await })
    };
    gated.started.notified().await;

    let second = queue.flush(&MockTransmitter::default(), TIMEOUT).await.unwrap();
    assert!(second.already_running);
    assert_eq!(second.attempted, 0);

    gated.release.notify_one();
    let first = first.await.unwrap().unwrap();
    assert_eq!(first.synced, 1);
    assert!(!queue.is_flushing());
}

#[tokio::test]
async fn dropping_a_flush_keeps_remaining_items_pending() {
    let queue = Arc::new(queue().0);
    for id in 1..=2 {
        queue
            .enqueue(Collection::Expenses, SyncOperation::Create, json!({"id": id}))
            .await
            .unwrap();
    }

    let gated = Arc::new(GatedTransmitter {
        started: Notify::new(),
        release: Notify::new(),
    });
    let handle = {
        let queue = queue.clone();
        let gated = gated.clone();
        tokio::spawn(async move { queue.flush(gated.as_ref(), TIMEOUT).await })
    };
    gated.started.notified().await;
    handle.abort();
    let _ = handle.await;

    assert_eq!(queue.pending_count().await, 2);
    assert!(!queue.is_flushing());

    let report = queue.flush(&MockTransmitter::default(), TIMEOUT).await.unwrap();
    assert_eq!(report.synced, 2);
}

#[tokio::test]
async fn clear_removes_items_and_persisted_key() {
    let (queue, kv) = queue();
    queue
        .enqueue(Collection::Loans, SyncOperation::Create, json!({"id": 3}))
        .await
        .unwrap();

    queue.clear().await.unwrap();

    assert_eq!(queue.pending_count().await, 0);
    assert!(queue.items().await.is_empty());
    assert_eq!(kv.get_value(SYNC_QUEUE_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn empty_queue_flush_is_a_clean_noop() {
    let (queue, _kv) = queue();
    let report = queue.flush(&MockTransmitter::default(), TIMEOUT).await.unwrap();
    assert_eq!(report, FlushReport::default());
}

#[tokio::test]
async fn unpersisted_sync_mark_keeps_item_pending_and_flush_continues() {
    let kv = Arc::new(FlakyKv::default());
    let queue = SyncQueue::new(kv.clone());
    queue
        .enqueue(Collection::Expenses, SyncOperation::Create, json!({"id": 1}))
        .await
        .unwrap();
    queue
        .enqueue(Collection::Goals, SyncOperation::Create, json!({"id": 2}))
        .await
        .unwrap();

    kv.fail_writes(true);
    let transmitter = MockTransmitter::default();
    let report = queue.flush(&transmitter, TIMEOUT).await.unwrap();

    assert_eq!(report.attempted, 2);
    assert_eq!(report.synced, 0);
    assert_eq!(report.failed.len(), 2);
    assert_eq!(transmitter.sent_ops().len(), 2);
    assert_eq!(queue.pending_count().await, 2);
    assert!(queue.items().await.iter().all(|i| !i.synced));

    kv.fail_writes(false);
    let report = queue.flush(&transmitter, TIMEOUT).await.unwrap();
    assert_eq!(report.synced, 2);
    assert_eq!(queue.pending_count().await, 0);
}

#[tokio::test]
async fn failed_clear_keeps_items() {
    let kv = Arc::new(FlakyKv::default());
    let queue = SyncQueue::new(kv.clone());
    queue
        .enqueue(Collection::Loans, SyncOperation::Create, json!({"id": 3}))
        .await
        .unwrap();

    kv.fail_writes(true);
    assert!(queue.clear().await.is_err());

    assert_eq!(queue.pending_count().await, 1);
    let restored = SyncQueue::new(kv);
    assert_eq!(restored.load().await.unwrap(), 1);
}
