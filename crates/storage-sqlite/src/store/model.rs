//! Database models for the mirrored collections.
//!
//! Each row type derives `QueryableByName` so the generic index queries in the
//! repository can load it from raw SQL, and `AsChangeset` with
//! `treat_none_as_null` so an upsert clears nullable columns.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use std::str::FromStr;

use mesfactures_core::categories::{Category, CategoryKind};
use mesfactures_core::goals::{Goal, GoalStatus};
use mesfactures_core::history::ActionHistoryEntry;
use mesfactures_core::invoices::Invoice;
use mesfactures_core::loans::{Loan, LoanStatus};
use mesfactures_core::notifications::{Notification, NotificationStatus};
use mesfactures_core::transactions::{Expense, Revenue};
use mesfactures_core::users::{User, UserStatus};
use mesfactures_core::utils::time_utils::now_naive;
use mesfactures_core::{Error, Result};

fn stamp_or_now(ts: Option<NaiveDateTime>) -> NaiveDateTime {
    ts.unwrap_or_else(now_naive)
}

#[derive(Queryable, QueryableByName, Selectable, Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct UserDB {
    pub id: Option<i64>,
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub locale: String,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<User> for UserDB {
    fn from(domain: User) -> Self {
        Self {
            id: domain.id,
            email: domain.email,
            password_hash: domain.password_hash,
            first_name: domain.first_name,
            last_name: domain.last_name,
            phone: domain.phone,
            locale: domain.locale,
            status: domain.status.as_str().to_string(),
            created_at: stamp_or_now(domain.created_at),
            updated_at: stamp_or_now(domain.updated_at),
        }
    }
}

impl TryFrom<UserDB> for User {
    type Error = Error;

    fn try_from(db: UserDB) -> Result<Self> {
        Ok(Self {
            id: db.id,
            email: db.email,
            password_hash: db.password_hash,
            first_name: db.first_name,
            last_name: db.last_name,
            phone: db.phone,
            locale: db.locale,
            status: UserStatus::from_str(&db.status)?,
            created_at: Some(db.created_at),
            updated_at: Some(db.updated_at),
        })
    }
}

#[derive(Queryable, QueryableByName, Selectable, Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::categories)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct CategoryDB {
    pub id: Option<i64>,
    pub name: String,
    pub kind: String,
    pub color: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<Category> for CategoryDB {
    fn from(domain: Category) -> Self {
        Self {
            id: domain.id,
            name: domain.name,
            kind: domain.kind.as_str().to_string(),
            color: domain.color,
            created_at: stamp_or_now(domain.created_at),
            updated_at: stamp_or_now(domain.updated_at),
        }
    }
}

impl TryFrom<CategoryDB> for Category {
    type Error = Error;

    fn try_from(db: CategoryDB) -> Result<Self> {
        Ok(Self {
            id: db.id,
            name: db.name,
            kind: CategoryKind::from_str(&db.kind)?,
            color: db.color,
            created_at: Some(db.created_at),
            updated_at: Some(db.updated_at),
        })
    }
}

#[derive(Queryable, QueryableByName, Selectable, Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::expenses)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct ExpenseDB {
    pub id: Option<i64>,
    pub user_id: i64,
    pub category_id: Option<i64>,
    pub amount: f64,
    pub label: String,
    pub date: NaiveDate,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<Expense> for ExpenseDB {
    fn from(domain: Expense) -> Self {
        Self {
            id: domain.id,
            user_id: domain.user_id,
            category_id: domain.category_id,
            amount: domain.amount,
            label: domain.label,
            date: domain.date,
            status: domain.status,
            created_at: stamp_or_now(domain.created_at),
            updated_at: stamp_or_now(domain.updated_at),
        }
    }
}

impl TryFrom<ExpenseDB> for Expense {
    type Error = Error;

    fn try_from(db: ExpenseDB) -> Result<Self> {
        Ok(Self {
            id: db.id,
            user_id: db.user_id,
            category_id: db.category_id,
            amount: db.amount,
            label: db.label,
            date: db.date,
            status: db.status,
            created_at: Some(db.created_at),
            updated_at: Some(db.updated_at),
        })
    }
}

#[derive(Queryable, QueryableByName, Selectable, Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::revenues)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct RevenueDB {
    pub id: Option<i64>,
    pub user_id: i64,
    pub category_id: Option<i64>,
    pub amount: f64,
    pub source: String,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<Revenue> for RevenueDB {
    fn from(domain: Revenue) -> Self {
        Self {
            id: domain.id,
            user_id: domain.user_id,
            category_id: domain.category_id,
            amount: domain.amount,
            source: domain.source,
            date: domain.date,
            description: domain.description,
            created_at: stamp_or_now(domain.created_at),
            updated_at: stamp_or_now(domain.updated_at),
        }
    }
}

impl TryFrom<RevenueDB> for Revenue {
    type Error = Error;

    fn try_from(db: RevenueDB) -> Result<Self> {
        Ok(Self {
            id: db.id,
            user_id: db.user_id,
            category_id: db.category_id,
            amount: db.amount,
            source: db.source,
            date: db.date,
            description: db.description,
            created_at: Some(db.created_at),
            updated_at: Some(db.updated_at),
        })
    }
}

#[derive(Queryable, QueryableByName, Selectable, Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::goals)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct GoalDB {
    pub id: Option<i64>,
    pub user_id: i64,
    pub name: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub deadline: NaiveDate,
    pub category: Option<String>,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<Goal> for GoalDB {
    fn from(domain: Goal) -> Self {
        Self {
            id: domain.id,
            user_id: domain.user_id,
            name: domain.name,
            target_amount: domain.target_amount,
            current_amount: domain.current_amount,
            deadline: domain.deadline,
            category: domain.category,
            status: domain.status.as_str().to_string(),
            created_at: stamp_or_now(domain.created_at),
            updated_at: stamp_or_now(domain.updated_at),
        }
    }
}

impl TryFrom<GoalDB> for Goal {
    type Error = Error;

    fn try_from(db: GoalDB) -> Result<Self> {
        Ok(Self {
            id: db.id,
            user_id: db.user_id,
            name: db.name,
            target_amount: db.target_amount,
            current_amount: db.current_amount,
            deadline: db.deadline,
            category: db.category,
            status: GoalStatus::from_str(&db.status)?,
            created_at: Some(db.created_at),
            updated_at: Some(db.updated_at),
        })
    }
}

#[derive(Queryable, QueryableByName, Selectable, Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::loans)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct LoanDB {
    pub id: Option<i64>,
    pub user_id: i64,
    pub label: String,
    pub principal: f64,
    pub annual_rate: f64,
    pub term_months: i32,
    pub start_date: NaiveDate,
    pub monthly_payment: f64,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<Loan> for LoanDB {
    fn from(domain: Loan) -> Self {
        Self {
            id: domain.id,
            user_id: domain.user_id,
            label: domain.label,
            principal: domain.principal,
            annual_rate: domain.annual_rate,
            term_months: domain.term_months,
            start_date: domain.start_date,
            monthly_payment: domain.monthly_payment,
            status: domain.status.as_str().to_string(),
            created_at: stamp_or_now(domain.created_at),
            updated_at: stamp_or_now(domain.updated_at),
        }
    }
}

impl TryFrom<LoanDB> for Loan {
    type Error = Error;

    fn try_from(db: LoanDB) -> Result<Self> {
        Ok(Self {
            id: db.id,
            user_id: db.user_id,
            label: db.label,
            principal: db.principal,
            annual_rate: db.annual_rate,
            term_months: db.term_months,
            start_date: db.start_date,
            monthly_payment: db.monthly_payment,
            status: LoanStatus::from_str(&db.status)?,
            created_at: Some(db.created_at),
            updated_at: Some(db.updated_at),
        })
    }
}

#[derive(Queryable, QueryableByName, Selectable, Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::notifications)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct NotificationDB {
    pub id: Option<i64>,
    pub user_id: i64,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<Notification> for NotificationDB {
    fn from(domain: Notification) -> Self {
        Self {
            id: domain.id,
            user_id: domain.user_id,
            notification_type: domain.notification_type,
            title: domain.title,
            message: domain.message,
            status: domain.status.as_str().to_string(),
            created_at: stamp_or_now(domain.created_at),
            updated_at: stamp_or_now(domain.updated_at),
        }
    }
}

impl TryFrom<NotificationDB> for Notification {
    type Error = Error;

    fn try_from(db: NotificationDB) -> Result<Self> {
        Ok(Self {
            id: db.id,
            user_id: db.user_id,
            notification_type: db.notification_type,
            title: db.title,
            message: db.message,
            status: NotificationStatus::from_str(&db.status)?,
            created_at: Some(db.created_at),
            updated_at: Some(db.updated_at),
        })
    }
}

#[derive(Queryable, QueryableByName, Selectable, Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::action_history)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct ActionHistoryDB {
    pub id: Option<i64>,
    pub user_id: i64,
    pub action_type: String,
    pub description: String,
    pub date: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<ActionHistoryEntry> for ActionHistoryDB {
    fn from(domain: ActionHistoryEntry) -> Self {
        Self {
            id: domain.id,
            user_id: domain.user_id,
            action_type: domain.action_type,
            description: domain.description,
            date: domain.date,
            created_at: stamp_or_now(domain.created_at),
            updated_at: stamp_or_now(domain.updated_at),
        }
    }
}

impl TryFrom<ActionHistoryDB> for ActionHistoryEntry {
    type Error = Error;

    fn try_from(db: ActionHistoryDB) -> Result<Self> {
        Ok(Self {
            id: db.id,
            user_id: db.user_id,
            action_type: db.action_type,
            description: db.description,
            date: db.date,
            created_at: Some(db.created_at),
            updated_at: Some(db.updated_at),
        })
    }
}

#[derive(Queryable, QueryableByName, Selectable, Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::invoices)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct InvoiceDB {
    pub id: Option<i64>,
    pub user_id: i64,
    pub supplier: String,
    pub invoice_type: String,
    pub amount: f64,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<Invoice> for InvoiceDB {
    fn from(domain: Invoice) -> Self {
        Self {
            id: domain.id,
            user_id: domain.user_id,
            supplier: domain.supplier,
            invoice_type: domain.invoice_type,
            amount: domain.amount,
            issue_date: domain.issue_date,
            due_date: domain.due_date,
            status: domain.status,
            created_at: stamp_or_now(domain.created_at),
            updated_at: stamp_or_now(domain.updated_at),
        }
    }
}

impl TryFrom<InvoiceDB> for Invoice {
    type Error = Error;

    fn try_from(db: InvoiceDB) -> Result<Self> {
        Ok(Self {
            id: db.id,
            user_id: db.user_id,
            supplier: db.supplier,
            invoice_type: db.invoice_type,
            amount: db.amount,
            issue_date: db.issue_date,
            due_date: db.due_date,
            status: db.status,
            created_at: Some(db.created_at),
            updated_at: Some(db.updated_at),
        })
    }
}

/// Result row of a `COUNT(*)` query.
#[derive(QueryableByName, Debug)]
pub struct CountRow {
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesfactures_core::categories::CategoryKind;

    #[test]
    fn unknown_status_text_is_rejected() {
        let row = GoalDB {
            id: Some(1),
            user_id: 1,
            name: "Vacances".to_string(),
            target_amount: 1000.0,
            current_amount: 0.0,
            deadline: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            category: None,
            status: "archived".to_string(),
            created_at: now_naive(),
            updated_at: now_naive(),
        };
        assert!(Goal::try_from(row).is_err());
    }

    #[test]
    fn category_kind_is_stored_as_text() {
        let row = CategoryDB::from(Category::new("Salaire", CategoryKind::Revenue, "#22c55e"));
        assert_eq!(row.kind, "revenue");
        assert!(row.id.is_none());
    }
}
