use async_trait::async_trait;

use super::record::{Collection, IndexFilter, IndexValue, Record, StoredRecord};
use crate::errors::Result;

/// Contract of the embedded database mirroring server-side entities.
///
/// Implementations stamp `created_at`/`updated_at` on every write and return
/// records in ascending id order.
#[async_trait]
pub trait LocalStoreTrait: Send + Sync {
    /// Opens the engine and creates the schema if absent. Idempotent.
    async fn initialize(&self) -> Result<()>;

    /// Persists a new record, assigning an id when absent.
    async fn add(&self, record: Record) -> Result<Record>;

    /// Blind upsert of a record that already carries an id.
    async fn update(&self, record: Record) -> Result<Record>;

    async fn get(&self, collection: Collection, id: i64) -> Result<Option<Record>>;

    async fn get_all(&self, collection: Collection) -> Result<Vec<Record>>;

    async fn get_by_index(
        &self,
        collection: Collection,
        index: &str,
        value: IndexValue,
    ) -> Result<Vec<Record>>;

    /// `limit == 0` yields an empty page.
    async fn get_paginated(
        &self,
        collection: Collection,
        filter: Option<IndexFilter>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Record>>;

    async fn count(&self, collection: Collection, filter: Option<IndexFilter>) -> Result<usize>;

    /// Deleting an unknown id succeeds.
    async fn delete_record(&self, collection: Collection, id: i64) -> Result<()>;
}

/// String key-value storage used for the sync queue and session data.
#[async_trait]
pub trait KeyValueStoreTrait: Send + Sync {
    async fn get_value(&self, key: &str) -> Result<Option<String>>;
    async fn set_value(&self, key: &str, value: &str) -> Result<()>;
    async fn remove_value(&self, key: &str) -> Result<()>;
}

/// Typed helpers over [`LocalStoreTrait`].
#[async_trait]
pub trait LocalStoreExt: LocalStoreTrait {
    async fn insert_typed<R: StoredRecord>(&self, record: R) -> Result<R> {
        R::from_record(self.add(record.into_record()).await?)
    }

    async fn save_typed<R: StoredRecord>(&self, record: R) -> Result<R> {
        R::from_record(self.update(record.into_record()).await?)
    }

    async fn fetch_typed<R: StoredRecord>(&self, id: i64) -> Result<Option<R>> {
        match self.get(R::COLLECTION, id).await? {
            Some(record) => Ok(Some(R::from_record(record)?)),
            None => Ok(None),
        }
    }

    async fn all_typed<R: StoredRecord>(&self) -> Result<Vec<R>> {
        self.get_all(R::COLLECTION)
            .await?
            .into_iter()
            .map(R::from_record)
            .collect()
    }

    async fn find_typed<R: StoredRecord>(&self, index: &str, value: IndexValue) -> Result<Vec<R>> {
        self.get_by_index(R::COLLECTION, index, value)
            .await?
            .into_iter()
            .map(R::from_record)
            .collect()
    }
}

impl<S: LocalStoreTrait + ?Sized> LocalStoreExt for S {}
