use async_trait::async_trait;

use crate::errors::Result;
use crate::offline::{OfflineDataService, OfflineDataServiceTrait};
use crate::sync::FlushReport;

/// Answers whether the remote backend can currently be reached.
#[async_trait]
pub trait ReachabilityProbe: Send + Sync {
    async fn is_reachable(&self) -> bool;
}

/// Work to run when connectivity is regained.
#[async_trait]
pub trait ReconnectHandler: Send + Sync {
    async fn on_reconnect(&self) -> Result<FlushReport>;
}

#[async_trait]
impl ReconnectHandler for OfflineDataService {
    async fn on_reconnect(&self) -> Result<FlushReport> {
        self.process_sync_queue().await
    }
}
