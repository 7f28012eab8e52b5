use async_trait::async_trait;
use diesel::prelude::*;

use mesfactures_core::store::KeyValueStoreTrait;
use mesfactures_core::utils::time_utils::now_naive;
use mesfactures_core::Result;

use super::model::KvEntryDB;
use crate::db::get_connection;
use crate::errors::IntoCore;
use crate::schema::kv_store;
use crate::store::SqliteLocalStore;

#[async_trait]
impl KeyValueStoreTrait for SqliteLocalStore {
    async fn get_value(&self, key: &str) -> Result<Option<String>> {
        let handles = self.handles().await?;
        let mut conn = get_connection(&handles.pool)?;
        let value = kv_store::table
            .filter(kv_store::key.eq(key))
            .select(kv_store::value)
            .first::<String>(&mut conn)
            .optional()
            .into_core()?;
        Ok(value)
    }

    async fn set_value(&self, key: &str, value: &str) -> Result<()> {
        let handles = self.handles().await?;
        let entry = KvEntryDB {
            key: key.to_string(),
            value: value.to_string(),
            updated_at: now_naive(),
        };
        handles
            .writer
            .exec(move |conn| {
                diesel::replace_into(kv_store::table)
                    .values(&entry)
                    .execute(conn)
                    .into_core()?;
                Ok(())
            })
            .await
    }

    async fn remove_value(&self, key: &str) -> Result<()> {
        let handles = self.handles().await?;
        let key = key.to_string();
        handles
            .writer
            .exec(move |conn| {
                diesel::delete(kv_store::table.filter(kv_store::key.eq(key)))
                    .execute(conn)
                    .into_core()?;
                Ok(())
            })
            .await
    }
}
