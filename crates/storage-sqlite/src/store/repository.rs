use async_trait::async_trait;
use diesel::prelude::*;
use diesel::query_builder::BoxedSqlQuery;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Double, Text};
use diesel::sqlite::Sqlite;
use diesel::SqliteConnection;
use log::{debug, error, info};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;

use mesfactures_core::errors::{Error, Result, ValidationError};
use mesfactures_core::store::{Collection, IndexFilter, IndexValue, LocalStoreTrait, Record};
use mesfactures_core::utils::time_utils::now_naive;

use super::model::{
    ActionHistoryDB, CategoryDB, CountRow, ExpenseDB, GoalDB, InvoiceDB, LoanDB, NotificationDB,
    RevenueDB, UserDB,
};
use crate::db::{self, get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::{
    action_history, categories, expenses, goals, invoices, loans, notifications, revenues, users,
};

type RawQuery = BoxedSqlQuery<'static, Sqlite, diesel::query_builder::SqlQuery>;

pub(crate) struct DbHandles {
    pub(crate) pool: Arc<DbPool>,
    pub(crate) writer: WriteHandle,
}

/// [`LocalStoreTrait`] backed by an embedded SQLite file.
///
/// The database is opened lazily: the first call to any method creates the
/// file, applies migrations and starts the writer actor. Concurrent first
/// calls share one initialization pass.
pub struct SqliteLocalStore {
    db_path: String,
    handles: OnceCell<DbHandles>,
    schema_passes: AtomicUsize,
}

impl SqliteLocalStore {
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            handles: OnceCell::new(),
            schema_passes: AtomicUsize::new(0),
        }
    }

    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// Number of times the schema setup ran for this instance.
    pub fn schema_passes(&self) -> usize {
        self.schema_passes.load(Ordering::SeqCst)
    }

    pub(crate) async fn handles(&self) -> Result<&DbHandles> {
        self.handles
            .get_or_try_init(|| async {
                info!("Opening local database at {}", self.db_path);
                let pool = open_database(&self.db_path).map_err(|e| {
                    error!("Local database unavailable: {}", e);
                    match e {
                        Error::StorageUnavailable(_) => e,
                        other => Error::StorageUnavailable(other.to_string()),
                    }
                })?;
                self.schema_passes.fetch_add(1, Ordering::SeqCst);
                let writer = db::spawn_writer((*pool).clone());
                Ok::<DbHandles, Error>(DbHandles { pool, writer })
            })
            .await
    }
}

fn open_database(db_path: &str) -> Result<Arc<DbPool>> {
    db::init(db_path)?;
    let pool = db::create_pool(db_path)?;
    db::run_migrations(&pool)?;
    Ok(pool)
}

macro_rules! insert_row {
    ($conn:expr, $table:ident, $row_ty:ty, $inner:expr) => {{
        let row = <$row_ty>::from($inner);
        diesel::insert_into($table::table)
            .values(&row)
            .returning(<$row_ty>::as_returning())
            .get_result::<$row_ty>($conn)
            .into_core()?
            .try_into()?
    }};
}

macro_rules! upsert_row {
    ($conn:expr, $table:ident, $row_ty:ty, $inner:expr, $id:expr) => {{
        let row = <$row_ty>::from($inner);
        diesel::insert_into($table::table)
            .values(&row)
            .on_conflict($table::id)
            .do_update()
            .set(&row)
            .execute($conn)
            .into_core()?;
        $table::table
            .filter($table::id.eq($id))
            .select(<$row_ty>::as_select())
            .first::<$row_ty>($conn)
            .into_core()?
            .try_into()?
    }};
}

macro_rules! stored_created_at {
    ($conn:expr, $table:ident, $id:expr) => {
        $table::table
            .filter($table::id.eq($id))
            .select($table::created_at)
            .first::<chrono::NaiveDateTime>($conn)
            .optional()
            .into_core()?
    };
}

macro_rules! load_rows {
    ($conn:expr, $query:expr, $row_ty:ty, $variant:ident) => {
        $query
            .load::<$row_ty>($conn)
            .into_core()?
            .into_iter()
            .map(|row| row.try_into().map(Record::$variant))
            .collect::<Result<Vec<Record>>>()
    };
}

fn insert_record(conn: &mut SqliteConnection, record: Record) -> Result<Record> {
    let saved = match record {
        Record::User(r) => Record::User(insert_row!(conn, users, UserDB, r)),
        Record::Category(r) => Record::Category(insert_row!(conn, categories, CategoryDB, r)),
        Record::Expense(r) => Record::Expense(insert_row!(conn, expenses, ExpenseDB, r)),
        Record::Revenue(r) => Record::Revenue(insert_row!(conn, revenues, RevenueDB, r)),
        Record::Goal(r) => Record::Goal(insert_row!(conn, goals, GoalDB, r)),
        Record::Loan(r) => Record::Loan(insert_row!(conn, loans, LoanDB, r)),
        Record::Notification(r) => {
            Record::Notification(insert_row!(conn, notifications, NotificationDB, r))
        }
        Record::ActionHistory(r) => {
            Record::ActionHistory(insert_row!(conn, action_history, ActionHistoryDB, r))
        }
        Record::Invoice(r) => Record::Invoice(insert_row!(conn, invoices, InvoiceDB, r)),
    };
    Ok(saved)
}

fn upsert_record(conn: &mut SqliteConnection, record: Record, id: i64) -> Result<Record> {
    let saved = match record {
        Record::User(r) => Record::User(upsert_row!(conn, users, UserDB, r, id)),
        Record::Category(r) => Record::Category(upsert_row!(conn, categories, CategoryDB, r, id)),
        Record::Expense(r) => Record::Expense(upsert_row!(conn, expenses, ExpenseDB, r, id)),
        Record::Revenue(r) => Record::Revenue(upsert_row!(conn, revenues, RevenueDB, r, id)),
        Record::Goal(r) => Record::Goal(upsert_row!(conn, goals, GoalDB, r, id)),
        Record::Loan(r) => Record::Loan(upsert_row!(conn, loans, LoanDB, r, id)),
        Record::Notification(r) => {
            Record::Notification(upsert_row!(conn, notifications, NotificationDB, r, id))
        }
        Record::ActionHistory(r) => {
            Record::ActionHistory(upsert_row!(conn, action_history, ActionHistoryDB, r, id))
        }
        Record::Invoice(r) => Record::Invoice(upsert_row!(conn, invoices, InvoiceDB, r, id)),
    };
    Ok(saved)
}

fn created_at_of(
    conn: &mut SqliteConnection,
    collection: Collection,
    id: i64,
) -> Result<Option<chrono::NaiveDateTime>> {
    let created = match collection {
        Collection::Users => stored_created_at!(conn, users, id),
        Collection::Categories => stored_created_at!(conn, categories, id),
        Collection::Expenses => stored_created_at!(conn, expenses, id),
        Collection::Revenues => stored_created_at!(conn, revenues, id),
        Collection::Goals => stored_created_at!(conn, goals, id),
        Collection::Loans => stored_created_at!(conn, loans, id),
        Collection::Notifications => stored_created_at!(conn, notifications, id),
        Collection::ActionHistory => stored_created_at!(conn, action_history, id),
        Collection::Invoices => stored_created_at!(conn, invoices, id),
    };
    Ok(created)
}

fn load_records(
    conn: &mut SqliteConnection,
    collection: Collection,
    query: RawQuery,
) -> Result<Vec<Record>> {
    match collection {
        Collection::Users => load_rows!(conn, query, UserDB, User),
        Collection::Categories => load_rows!(conn, query, CategoryDB, Category),
        Collection::Expenses => load_rows!(conn, query, ExpenseDB, Expense),
        Collection::Revenues => load_rows!(conn, query, RevenueDB, Revenue),
        Collection::Goals => load_rows!(conn, query, GoalDB, Goal),
        Collection::Loans => load_rows!(conn, query, LoanDB, Loan),
        Collection::Notifications => load_rows!(conn, query, NotificationDB, Notification),
        Collection::ActionHistory => load_rows!(conn, query, ActionHistoryDB, ActionHistory),
        Collection::Invoices => load_rows!(conn, query, InvoiceDB, Invoice),
    }
}

fn bind_value(query: RawQuery, value: &IndexValue) -> RawQuery {
    match value {
        IndexValue::Int(v) => query.bind::<BigInt, _>(*v),
        IndexValue::Real(v) => query.bind::<Double, _>(*v),
        IndexValue::Text(v) => query.bind::<Text, _>(v.clone()),
    }
}

/// Builds `WHERE <column> = ?` for an index filter, validating the index name.
fn where_clause(collection: Collection, filter: Option<&IndexFilter>) -> Result<String> {
    match filter {
        Some(f) => Ok(format!(" WHERE {} = ?", collection.column(&f.index)?)),
        None => Ok(String::new()),
    }
}

fn to_sql_int(value: usize) -> Result<i64> {
    i64::try_from(value).map_err(|_| {
        ValidationError::InvalidInput(format!("{} does not fit in a query bound", value)).into()
    })
}

#[async_trait]
impl LocalStoreTrait for SqliteLocalStore {
    async fn initialize(&self) -> Result<()> {
        self.handles().await.map(|_| ())
    }

    async fn add(&self, mut record: Record) -> Result<Record> {
        let handles = self.handles().await?;
        let now = now_naive();
        record.stamp(now, now);
        let collection = record.collection();
        let saved = handles
            .writer
            .exec(move |conn| insert_record(conn, record))
            .await?;
        debug!("Stored {} #{:?}", collection, saved.id());
        Ok(saved)
    }

    async fn update(&self, mut record: Record) -> Result<Record> {
        let id = record
            .id()
            .ok_or_else(|| ValidationError::MissingField("id".to_string()))?;
        let handles = self.handles().await?;
        handles
            .writer
            .exec(move |conn| {
                let now = now_naive();
                let created_at = match record.created_at() {
                    Some(ts) => ts,
                    None => created_at_of(conn, record.collection(), id)?.unwrap_or(now),
                };
                record.stamp(created_at, now);
                upsert_record(conn, record, id)
            })
            .await
    }

    async fn get(&self, collection: Collection, id: i64) -> Result<Option<Record>> {
        let handles = self.handles().await?;
        let mut conn = get_connection(&handles.pool)?;
        let sql = format!("SELECT * FROM {} WHERE id = ?", collection.as_str());
        let query = sql_query(sql).into_boxed::<Sqlite>().bind::<BigInt, _>(id);
        Ok(load_records(&mut conn, collection, query)?.into_iter().next())
    }

    async fn get_all(&self, collection: Collection) -> Result<Vec<Record>> {
        let handles = self.handles().await?;
        let mut conn = get_connection(&handles.pool)?;
        let sql = format!("SELECT * FROM {} ORDER BY id ASC", collection.as_str());
        load_records(&mut conn, collection, sql_query(sql).into_boxed::<Sqlite>())
    }

    async fn get_by_index(
        &self,
        collection: Collection,
        index: &str,
        value: IndexValue,
    ) -> Result<Vec<Record>> {
        let filter = IndexFilter::new(index, value);
        let clause = where_clause(collection, Some(&filter))?;
        let handles = self.handles().await?;
        let mut conn = get_connection(&handles.pool)?;
        let sql = format!("SELECT * FROM {}{} ORDER BY id ASC", collection.as_str(), clause);
        let query = bind_value(sql_query(sql).into_boxed::<Sqlite>(), &filter.value);
        load_records(&mut conn, collection, query)
    }

    async fn get_paginated(
        &self,
        collection: Collection,
        filter: Option<IndexFilter>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Record>> {
        let clause = where_clause(collection, filter.as_ref())?;
        if limit == 0 {
            return Ok(Vec::new());
        }
        let handles = self.handles().await?;
        let mut conn = get_connection(&handles.pool)?;
        let sql = format!(
            "SELECT * FROM {}{} ORDER BY id ASC LIMIT ? OFFSET ?",
            collection.as_str(),
            clause
        );
        let mut query = sql_query(sql).into_boxed::<Sqlite>();
        if let Some(f) = &filter {
            query = bind_value(query, &f.value);
        }
        let query = query
            .bind::<BigInt, _>(to_sql_int(limit)?)
            .bind::<BigInt, _>(to_sql_int(offset)?);
        load_records(&mut conn, collection, query)
    }

    async fn count(&self, collection: Collection, filter: Option<IndexFilter>) -> Result<usize> {
        let clause = where_clause(collection, filter.as_ref())?;
        let handles = self.handles().await?;
        let mut conn = get_connection(&handles.pool)?;
        let sql = format!("SELECT COUNT(*) AS count FROM {}{}", collection.as_str(), clause);
        let mut query = sql_query(sql).into_boxed::<Sqlite>();
        if let Some(f) = &filter {
            query = bind_value(query, &f.value);
        }
        let row = query
            .get_result::<CountRow>(&mut conn)
            .into_core()?;
        Ok(usize::try_from(row.count).unwrap_or(0))
    }

    async fn delete_record(&self, collection: Collection, id: i64) -> Result<()> {
        let handles = self.handles().await?;
        let sql = format!("DELETE FROM {} WHERE id = ?", collection.as_str());
        let removed = handles
            .writer
            .exec(move |conn| {
                sql_query(sql)
                    .bind::<BigInt, _>(id)
                    .execute(conn)
                    .into_core()
            })
            .await?;
        debug!("Deleted {} row(s) from {} for id {}", removed, collection, id);
        Ok(())
    }
}
