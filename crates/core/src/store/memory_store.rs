//! In-process store used when the embedded database cannot be opened.
//!
//! Data lives only for the lifetime of the process. Uniqueness rules match the
//! SQLite schema so callers observe the same constraint errors.

use async_trait::async_trait;
use log::debug;
use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::record::{Collection, IndexFilter, IndexValue, Record};
use super::store_traits::{KeyValueStoreTrait, LocalStoreTrait};
use crate::errors::{Error, Result, ValidationError};
use crate::utils::time_utils::now_naive;

#[derive(Default)]
struct MemoryTables {
    rows: HashMap<Collection, BTreeMap<i64, Record>>,
    last_ids: HashMap<Collection, i64>,
}

impl MemoryTables {
    fn table(&self, collection: Collection) -> impl Iterator<Item = &Record> {
        self.rows.get(&collection).into_iter().flat_map(|t| t.values())
    }

    fn next_id(&mut self, collection: Collection) -> i64 {
        let last = self.last_ids.entry(collection).or_insert(0);
        *last += 1;
        *last
    }

    fn bump_last_id(&mut self, collection: Collection, id: i64) {
        let last = self.last_ids.entry(collection).or_insert(0);
        if id > *last {
            *last = id;
        }
    }

    fn check_unique(&self, record: &Record) -> Result<()> {
        let id = record.id();
        let clash = match record {
            Record::User(user) => self.table(Collection::Users).any(|existing| {
                matches!(existing, Record::User(u) if u.email == user.email && u.id != id)
            }),
            Record::Category(category) => self.table(Collection::Categories).any(|existing| {
                matches!(existing, Record::Category(c)
                    if c.name == category.name && c.kind == category.kind && c.id != id)
            }),
            _ => false,
        };
        if clash {
            return Err(Error::ConstraintViolation(format!(
                "UNIQUE constraint failed on {}",
                record.collection()
            )));
        }
        Ok(())
    }
}

fn filter_matches(record: &Record, filter: &IndexFilter) -> Result<bool> {
    Ok(record
        .index_value(&filter.index)?
        .map(|v| v.matches(&filter.value))
        .unwrap_or(false))
}

/// Non-durable [`LocalStoreTrait`] implementation.
#[derive(Default)]
pub struct MemoryLocalStore {
    tables: RwLock<MemoryTables>,
}

impl MemoryLocalStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryTables>> {
        self.tables
            .read()
            .map_err(|_| Error::Unexpected("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryTables>> {
        self.tables
            .write()
            .map_err(|_| Error::Unexpected("memory store lock poisoned".to_string()))
    }

    fn filtered(
        &self,
        collection: Collection,
        filter: Option<&IndexFilter>,
    ) -> Result<Vec<Record>> {
        if let Some(f) = filter {
            collection.column(&f.index)?;
        }
        let tables = self.read()?;
        let mut out = Vec::new();
        for record in tables.table(collection) {
            let keep = match filter {
                Some(f) => filter_matches(record, f)?,
                None => true,
            };
            if keep {
                out.push(record.clone());
            }
        }
        Ok(out)
    }
}

#[async_trait]
impl LocalStoreTrait for MemoryLocalStore {
    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    async fn add(&self, mut record: Record) -> Result<Record> {
        let collection = record.collection();
        let mut tables = self.write()?;
        if let Some(id) = record.id() {
            if tables.rows.get(&collection).is_some_and(|t| t.contains_key(&id)) {
                return Err(Error::ConstraintViolation(format!(
                    "UNIQUE constraint failed: {}.id",
                    collection
                )));
            }
        }
        tables.check_unique(&record)?;

        let id = match record.id() {
            Some(id) => {
                tables.bump_last_id(collection, id);
                id
            }
            None => tables.next_id(collection),
        };
        let now = now_naive();
        record.set_id(id);
        record.stamp(now, now);
        tables
            .rows
            .entry(collection)
            .or_default()
            .insert(id, record.clone());
        debug!("memory store: added {} #{}", collection, id);
        Ok(record)
    }

    async fn update(&self, mut record: Record) -> Result<Record> {
        let collection = record.collection();
        let id = record
            .id()
            .ok_or_else(|| ValidationError::MissingField("id".to_string()))?;
        let mut tables = self.write()?;
        tables.check_unique(&record)?;

        let now = now_naive();
        let created_at = record.created_at().unwrap_or(now);
        record.stamp(created_at, now);
        tables.bump_last_id(collection, id);
        tables
            .rows
            .entry(collection)
            .or_default()
            .insert(id, record.clone());
        Ok(record)
    }

    async fn get(&self, collection: Collection, id: i64) -> Result<Option<Record>> {
        let tables = self.read()?;
        Ok(tables.rows.get(&collection).and_then(|t| t.get(&id)).cloned())
    }

    async fn get_all(&self, collection: Collection) -> Result<Vec<Record>> {
        self.filtered(collection, None)
    }

    async fn get_by_index(
        &self,
        collection: Collection,
        index: &str,
        value: IndexValue,
    ) -> Result<Vec<Record>> {
        self.filtered(collection, Some(&IndexFilter::new(index, value)))
    }

    async fn get_paginated(
        &self,
        collection: Collection,
        filter: Option<IndexFilter>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Record>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        Ok(self
            .filtered(collection, filter.as_ref())?
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect())
    }

    async fn count(&self, collection: Collection, filter: Option<IndexFilter>) -> Result<usize> {
        Ok(self.filtered(collection, filter.as_ref())?.len())
    }

    async fn delete_record(&self, collection: Collection, id: i64) -> Result<()> {
        let mut tables = self.write()?;
        if let Some(table) = tables.rows.get_mut(&collection) {
            table.remove(&id);
        }
        Ok(())
    }
}

/// Non-durable [`KeyValueStoreTrait`] implementation.
#[derive(Default)]
pub struct MemoryKeyValueStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStoreTrait for MemoryKeyValueStore {
    async fn get_value(&self, key: &str) -> Result<Option<String>> {
        let values = self
            .values
            .read()
            .map_err(|_| Error::Unexpected("key-value lock poisoned".to_string()))?;
        Ok(values.get(key).cloned())
    }

    async fn set_value(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .write()
            .map_err(|_| Error::Unexpected("key-value lock poisoned".to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_value(&self, key: &str) -> Result<()> {
        let mut values = self
            .values
            .write()
            .map_err(|_| Error::Unexpected("key-value lock poisoned".to_string()))?;
        values.remove(key);
        Ok(())
    }
}
