//! Tagged record type and per-collection index metadata.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::categories::Category;
use crate::errors::{Error, Result, ValidationError};
use crate::goals::Goal;
use crate::history::ActionHistoryEntry;
use crate::invoices::Invoice;
use crate::loans::Loan;
use crate::notifications::Notification;
use crate::transactions::{Expense, Revenue};
use crate::users::User;

/// Text form used for timestamps in index comparisons.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Named, schema-defined set of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Users,
    Categories,
    Expenses,
    Revenues,
    Goals,
    Loans,
    Notifications,
    ActionHistory,
    Invoices,
}

impl Collection {
    pub const ALL: [Collection; 9] = [
        Collection::Users,
        Collection::Categories,
        Collection::Expenses,
        Collection::Revenues,
        Collection::Goals,
        Collection::Loans,
        Collection::Notifications,
        Collection::ActionHistory,
        Collection::Invoices,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Categories => "categories",
            Collection::Expenses => "expenses",
            Collection::Revenues => "revenues",
            Collection::Goals => "goals",
            Collection::Loans => "loans",
            Collection::Notifications => "notifications",
            Collection::ActionHistory => "action_history",
            Collection::Invoices => "invoices",
        }
    }

    /// Secondary indexes declared for this collection.
    pub fn indexes(&self) -> &'static [&'static str] {
        match self {
            Collection::Users => &["email", "status"],
            Collection::Categories => &["kind", "name"],
            Collection::Expenses => &["user_id", "category_id", "date", "amount"],
            Collection::Revenues => &["user_id", "date", "amount", "source"],
            Collection::Goals => &["user_id", "status", "deadline", "target_amount"],
            Collection::Loans => &["user_id", "status", "start_date", "amount"],
            Collection::Notifications => &["user_id", "status", "created_at", "type"],
            Collection::ActionHistory => &["user_id", "date", "action_type"],
            Collection::Invoices => &["user_id", "status", "issue_date", "amount"],
        }
    }

    pub fn supports(&self, index: &str) -> bool {
        self.indexes().contains(&index)
    }

    /// Table column backing an index.
    pub fn column(&self, index: &str) -> Result<&'static str> {
        let column = match (self, index) {
            (Collection::Loans, "amount") => Some("principal"),
            (Collection::Notifications, "type") => Some("notification_type"),
            _ => self.indexes().iter().find(|i| **i == index).copied(),
        };
        column.ok_or_else(|| {
            ValidationError::UnknownIndex {
                collection: self.as_str().to_string(),
                index: index.to_string(),
            }
            .into()
        })
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Collection::ALL
            .iter()
            .find(|c| c.as_str() == s)
            .copied()
            .ok_or_else(|| {
                ValidationError::InvalidInput(format!("Unknown collection '{}'", s)).into()
            })
    }
}

/// Value compared against an indexed field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexValue {
    Int(i64),
    Real(f64),
    Text(String),
}

impl IndexValue {
    /// Equality with numeric coercion between `Int` and `Real`.
    pub fn matches(&self, other: &IndexValue) -> bool {
        match (self, other) {
            (IndexValue::Int(a), IndexValue::Int(b)) => a == b,
            (IndexValue::Real(a), IndexValue::Real(b)) => a == b,
            (IndexValue::Int(a), IndexValue::Real(b))
            | (IndexValue::Real(b), IndexValue::Int(a)) => {
                (*a as f64) == *b
            }
            (IndexValue::Text(a), IndexValue::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl From<i64> for IndexValue {
    fn from(v: i64) -> Self {
        IndexValue::Int(v)
    }
}

impl From<f64> for IndexValue {
    fn from(v: f64) -> Self {
        IndexValue::Real(v)
    }
}

impl From<&str> for IndexValue {
    fn from(v: &str) -> Self {
        IndexValue::Text(v.to_string())
    }
}

impl From<String> for IndexValue {
    fn from(v: String) -> Self {
        IndexValue::Text(v)
    }
}

impl From<NaiveDate> for IndexValue {
    fn from(v: NaiveDate) -> Self {
        IndexValue::Text(v.format("%Y-%m-%d").to_string())
    }
}

impl From<NaiveDateTime> for IndexValue {
    fn from(v: NaiveDateTime) -> Self {
        IndexValue::Text(v.format(TIMESTAMP_FORMAT).to_string())
    }
}

/// Equality filter on one index, used by pagination and counting.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexFilter {
    pub index: String,
    pub value: IndexValue,
}

impl IndexFilter {
    pub fn new(index: impl Into<String>, value: impl Into<IndexValue>) -> Self {
        Self {
            index: index.into(),
            value: value.into(),
        }
    }

    pub fn user(user_id: i64) -> Self {
        Self::new("user_id", user_id)
    }
}

/// A record of any collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    User(User),
    Category(Category),
    Expense(Expense),
    Revenue(Revenue),
    Goal(Goal),
    Loan(Loan),
    Notification(Notification),
    ActionHistory(ActionHistoryEntry),
    Invoice(Invoice),
}

macro_rules! for_each_record {
    ($record:expr, $inner:ident => $body:expr) => {
        match $record {
            Record::User($inner) => $body,
            Record::Category($inner) => $body,
            Record::Expense($inner) => $body,
            Record::Revenue($inner) => $body,
            Record::Goal($inner) => $body,
            Record::Loan($inner) => $body,
            Record::Notification($inner) => $body,
            Record::ActionHistory($inner) => $body,
            Record::Invoice($inner) => $body,
        }
    };
}

impl Record {
    pub fn collection(&self) -> Collection {
        match self {
            Record::User(_) => Collection::Users,
            Record::Category(_) => Collection::Categories,
            Record::Expense(_) => Collection::Expenses,
            Record::Revenue(_) => Collection::Revenues,
            Record::Goal(_) => Collection::Goals,
            Record::Loan(_) => Collection::Loans,
            Record::Notification(_) => Collection::Notifications,
            Record::ActionHistory(_) => Collection::ActionHistory,
            Record::Invoice(_) => Collection::Invoices,
        }
    }

    pub fn id(&self) -> Option<i64> {
        for_each_record!(self, r => r.id)
    }

    pub fn set_id(&mut self, id: i64) {
        for_each_record!(self, r => r.id = Some(id))
    }

    pub fn created_at(&self) -> Option<NaiveDateTime> {
        for_each_record!(self, r => r.created_at)
    }

    pub fn stamp(&mut self, created_at: NaiveDateTime, updated_at: NaiveDateTime) {
        for_each_record!(self, r => {
            r.created_at = Some(created_at);
            r.updated_at = Some(updated_at);
        })
    }

    /// Owning user, for collections that carry one.
    pub fn user_id(&self) -> Option<i64> {
        match self {
            Record::User(u) => u.id,
            Record::Category(_) => None,
            Record::Expense(r) => Some(r.user_id),
            Record::Revenue(r) => Some(r.user_id),
            Record::Goal(r) => Some(r.user_id),
            Record::Loan(r) => Some(r.user_id),
            Record::Notification(r) => Some(r.user_id),
            Record::ActionHistory(r) => Some(r.user_id),
            Record::Invoice(r) => Some(r.user_id),
        }
    }

    /// Value of an indexed field, or `None` when the field is null.
    pub fn index_value(&self, index: &str) -> Result<Option<IndexValue>> {
        let collection = self.collection();
        collection.column(index)?;
        let value: Option<IndexValue> = match (self, index) {
            (Record::User(u), "email") => Some(u.email.clone().into()),
            (Record::User(u), "status") => Some(u.status.as_str().into()),
            (Record::Category(c), "kind") => Some(c.kind.as_str().into()),
            (Record::Category(c), "name") => Some(c.name.clone().into()),
            (Record::Expense(e), "user_id") => Some(e.user_id.into()),
            (Record::Expense(e), "category_id") => e.category_id.map(IndexValue::from),
            (Record::Expense(e), "date") => Some(e.date.into()),
            (Record::Expense(e), "amount") => Some(e.amount.into()),
            (Record::Revenue(r), "user_id") => Some(r.user_id.into()),
            (Record::Revenue(r), "date") => Some(r.date.into()),
            (Record::Revenue(r), "amount") => Some(r.amount.into()),
            (Record::Revenue(r), "source") => Some(r.source.clone().into()),
            (Record::Goal(g), "user_id") => Some(g.user_id.into()),
            (Record::Goal(g), "status") => Some(g.status.as_str().into()),
            (Record::Goal(g), "deadline") => Some(g.deadline.into()),
            (Record::Goal(g), "target_amount") => Some(g.target_amount.into()),
            (Record::Loan(l), "user_id") => Some(l.user_id.into()),
            (Record::Loan(l), "status") => Some(l.status.as_str().into()),
            (Record::Loan(l), "start_date") => Some(l.start_date.into()),
            (Record::Loan(l), "amount") => Some(l.principal.into()),
            (Record::Notification(n), "user_id") => Some(n.user_id.into()),
            (Record::Notification(n), "status") => Some(n.status.as_str().into()),
            (Record::Notification(n), "created_at") => n.created_at.map(IndexValue::from),
            (Record::Notification(n), "type") => Some(n.notification_type.clone().into()),
            (Record::ActionHistory(a), "user_id") => Some(a.user_id.into()),
            (Record::ActionHistory(a), "date") => Some(a.date.into()),
            (Record::ActionHistory(a), "action_type") => Some(a.action_type.clone().into()),
            (Record::Invoice(i), "user_id") => Some(i.user_id.into()),
            (Record::Invoice(i), "status") => Some(i.status.clone().into()),
            (Record::Invoice(i), "issue_date") => Some(i.issue_date.into()),
            (Record::Invoice(i), "amount") => Some(i.amount.into()),
            _ => None,
        };
        Ok(value)
    }

    /// JSON form of the inner entity, used as a sync payload.
    pub fn to_payload(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Typed access to one variant of [`Record`].
pub trait StoredRecord: Sized + Send + Sync + 'static {
    const COLLECTION: Collection;

    fn into_record(self) -> Record;

    fn from_record(record: Record) -> Result<Self>;
}

macro_rules! impl_stored_record {
    ($ty:ty, $variant:ident, $collection:expr) => {
        impl StoredRecord for $ty {
            const COLLECTION: Collection = $collection;

            fn into_record(self) -> Record {
                Record::$variant(self)
            }

            fn from_record(record: Record) -> Result<Self> {
                match record {
                    Record::$variant(inner) => Ok(inner),
                    other => Err(Error::Unexpected(format!(
                        "expected a {} record, got {}",
                        $collection,
                        other.collection()
                    ))),
                }
            }
        }
    };
}

impl_stored_record!(User, User, Collection::Users);
impl_stored_record!(Category, Category, Collection::Categories);
impl_stored_record!(Expense, Expense, Collection::Expenses);
impl_stored_record!(Revenue, Revenue, Collection::Revenues);
impl_stored_record!(Goal, Goal, Collection::Goals);
impl_stored_record!(Loan, Loan, Collection::Loans);
impl_stored_record!(Notification, Notification, Collection::Notifications);
impl_stored_record!(ActionHistoryEntry, ActionHistory, Collection::ActionHistory);
impl_stored_record!(Invoice, Invoice, Collection::Invoices);
