//! Sync queue models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

use crate::store::Collection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncOperation {
    Create,
    Update,
    Delete,
}

impl SyncOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncOperation::Create => "create",
            SyncOperation::Update => "update",
            SyncOperation::Delete => "delete",
        }
    }
}

impl fmt::Display for SyncOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One pending mutation, persisted as part of the queue's JSON array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncQueueItem {
    /// UUIDv7: time-ordered prefix, random suffix.
    pub id: String,
    pub collection: Collection,
    pub operation: SyncOperation,
    pub payload: Value,
    pub timestamp: DateTime<Utc>,
    pub synced: bool,
}

impl SyncQueueItem {
    pub fn new(collection: Collection, operation: SyncOperation, payload: Value) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            collection,
            operation,
            payload,
            timestamp: Utc::now(),
            synced: false,
        }
    }

    /// Id of the entity this mutation targets, if the payload carries one.
    pub fn entity_id(&self) -> Option<String> {
        match self.payload.get("id")? {
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    /// Key grouping mutations of the same entity.
    pub fn entity_key(&self) -> Option<(Collection, String)> {
        self.entity_id().map(|id| (self.collection, id))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlushFailure {
    pub item_id: String,
    pub collection: Collection,
    pub operation: SyncOperation,
    pub message: String,
}

/// Outcome of one flush pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlushReport {
    pub attempted: usize,
    pub synced: usize,
    pub failed: Vec<FlushFailure>,
    /// Items skipped because an earlier mutation of the same entity failed.
    pub deferred: usize,
    /// Set when another flush was already running; nothing was attempted.
    pub already_running: bool,
}

impl FlushReport {
    pub fn skipped() -> Self {
        Self {
            already_running: true,
            ..Self::default()
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.deferred == 0 && !self.already_running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entity_key_reads_numeric_and_string_ids() {
        let item = SyncQueueItem::new(
            Collection::Expenses,
            SyncOperation::Delete,
            json!({"id": 7}),
        );
        assert_eq!(item.entity_key(), Some((Collection::Expenses, "7".to_string())));

        let item = SyncQueueItem::new(
            Collection::Goals,
            SyncOperation::Update,
            json!({"id": "g-1"}),
        );
        assert_eq!(item.entity_id().as_deref(), Some("g-1"));

        let item = SyncQueueItem::new(
            Collection::Goals,
            SyncOperation::Create,
            json!({"name": "x"}),
        );
        assert_eq!(item.entity_key(), None);
    }

    #[test]
    fn persisted_shape_uses_lowercase_operation_and_collection_name() {
        let item = SyncQueueItem::new(Collection::ActionHistory, SyncOperation::Create, json!({}));
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["operation"], "create");
        assert_eq!(value["collection"], "action_history");
        assert_eq!(value["synced"], false);
    }
}
