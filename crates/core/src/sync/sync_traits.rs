use async_trait::async_trait;

use super::sync_model::SyncQueueItem;
use crate::errors::Result;

/// Delivers one queued mutation to the remote backend.
#[async_trait]
pub trait SyncTransmitter: Send + Sync {
    async fn transmit(&self, item: &SyncQueueItem) -> Result<()>;
}
