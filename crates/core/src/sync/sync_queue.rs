//! Persisted FIFO of pending mutations and its flush loop.

use log::{debug, error, info, warn};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use super::sync_model::{FlushFailure, FlushReport, SyncOperation, SyncQueueItem};
use super::sync_traits::SyncTransmitter;
use crate::constants::SYNC_QUEUE_KEY;
use crate::errors::{Error, Result};
use crate::store::{Collection, KeyValueStoreTrait};

/// Releases the in-flight flag when a flush ends or its future is dropped.
struct FlushGuard<'a>(&'a AtomicBool);

impl Drop for FlushGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct SyncQueue {
    kv: Arc<dyn KeyValueStoreTrait>,
    items: Mutex<Vec<SyncQueueItem>>,
    is_flushing: AtomicBool,
}

impl SyncQueue {
    pub fn new(kv: Arc<dyn KeyValueStoreTrait>) -> Self {
        Self {
            kv,
            items: Mutex::new(Vec::new()),
            is_flushing: AtomicBool::new(false),
        }
    }

    /// Replaces the in-memory queue with the persisted one.
    pub async fn load(&self) -> Result<usize> {
        let mut items = self.items.lock().await;
        *items = match self.kv.get_value(SYNC_QUEUE_KEY).await? {
            Some(raw) => serde_json::from_str(&raw)?,
            None => Vec::new(),
        };
        let pending = items.iter().filter(|i| !i.synced).count();
        debug!("Loaded sync queue: {} items, {} pending", items.len(), pending);
        Ok(pending)
    }

    /// Appends a mutation and persists the queue before returning.
    pub async fn enqueue(
        &self,
        collection: Collection,
        operation: SyncOperation,
        payload: Value,
    ) -> Result<SyncQueueItem> {
        let item = SyncQueueItem::new(collection, operation, payload);
        let mut items = self.items.lock().await;
        items.push(item.clone());
        if let Err(e) = self.persist(&items).await {
            items.pop();
            return Err(e);
        }
        debug!("Queued {} on {} ({})", operation, collection, item.id);
        Ok(item)
    }

    pub async fn pending_count(&self) -> usize {
        self.items.lock().await.iter().filter(|i| !i.synced).count()
    }

    pub async fn items(&self) -> Vec<SyncQueueItem> {
        self.items.lock().await.clone()
    }

    pub fn is_flushing(&self) -> bool {
        self.is_flushing.load(Ordering::SeqCst)
    }

    /// Transmits pending items in FIFO order.
    ///
    /// A failed item does not stop the pass, but later items for the same
    /// entity are deferred to the next flush. Items are marked synced only
    /// after their transmit succeeds.
    pub async fn flush(
        &self,
        transmitter: &dyn SyncTransmitter,
        timeout: Duration,
    ) -> Result<FlushReport> {
        if self
            .is_flushing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Sync flush already running, skipping");
            return Ok(FlushReport::skipped());
        }
        let _guard = FlushGuard(&self.is_flushing);

        let pending: Vec<SyncQueueItem> = {
            let items = self.items.lock().await;
            items.iter().filter(|i| !i.synced).cloned().collect()
        };
        if pending.is_empty() {
            debug!("Sync queue is empty");
            return Ok(FlushReport::default());
        }
        info!("Processing {} items in sync queue", pending.len());

        let mut report = FlushReport::default();
        let mut blocked: HashSet<(Collection, String)> = HashSet::new();

        for item in pending {
            let key = item.entity_key();
            if key.as_ref().is_some_and(|k| blocked.contains(k)) {
                report.deferred += 1;
                continue;
            }

            report.attempted += 1;
            let outcome = match tokio::time::timeout(timeout, transmitter.transmit(&item)).await {
                Ok(result) => result,
                Err(_) => Err(Error::transmit(format!(
                    "timed out after {}s",
                    timeout.as_secs_f64()
                ))),
            };

            let outcome = match outcome {
                Ok(()) => self.mark_synced(&item.id).await,
                Err(e) => Err(e),
            };

            match outcome {
                Ok(()) => {
                    report.synced += 1;
                    debug!("Synced {} in {}", item.operation, item.collection);
                }
                Err(e) => {
                    warn!(
                        "Failed to sync {} in {} ({}): {}",
                        item.operation, item.collection, item.id, e
                    );
                    if let Some(k) = key {
                        blocked.insert(k);
                    }
                    report.failed.push(FlushFailure {
                        item_id: item.id.clone(),
                        collection: item.collection,
                        operation: item.operation,
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Sync flush done: {} synced, {} failed, {} deferred",
            report.synced,
            report.failed.len(),
            report.deferred
        );
        Ok(report)
    }

    /// Drops every item, synced or not, and the persisted copy.
    pub async fn clear(&self) -> Result<()> {
        let mut items = self.items.lock().await;
        self.kv.remove_value(SYNC_QUEUE_KEY).await?;
        items.clear();
        info!("Sync queue cleared");
        Ok(())
    }

    /// Marks an item synced. If the queue cannot be persisted the item stays
    /// pending in memory too, so it is retransmitted on the next flush.
    async fn mark_synced(&self, item_id: &str) -> Result<()> {
        let mut items = self.items.lock().await;
        let Some(index) = items.iter().position(|i| i.id == item_id) else {
            return Ok(());
        };
        items[index].synced = true;
        if let Err(e) = self.persist(&items).await {
            error!("Failed to persist sync queue after transmit: {}", e);
            items[index].synced = false;
            return Err(e);
        }
        Ok(())
    }

    async fn persist(&self, items: &[SyncQueueItem]) -> Result<()> {
        let raw = serde_json::to_string(items)?;
        self.kv.set_value(SYNC_QUEUE_KEY, &raw).await
    }
}
