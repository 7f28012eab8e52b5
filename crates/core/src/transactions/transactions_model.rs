//! Transaction domain models.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::categories::CategoryKind;
use crate::errors::{Error, ValidationError};

pub const EXPENSE_STATUS_VALID: &str = "valid";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Expense,
    Revenue,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Expense => "expense",
            TransactionKind::Revenue => "revenue",
        }
    }

    /// Category kind used to resolve a category name for this transaction.
    pub fn category_kind(&self) -> CategoryKind {
        match self {
            TransactionKind::Expense => CategoryKind::Expense,
            TransactionKind::Revenue => CategoryKind::Revenue,
        }
    }

    /// Applies the sign convention: revenues positive, expenses negative.
    pub fn signed(&self, magnitude: f64) -> f64 {
        match self {
            TransactionKind::Expense => -magnitude.abs(),
            TransactionKind::Revenue => magnitude.abs(),
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "expense" => Ok(TransactionKind::Expense),
            "revenue" | "income" => Ok(TransactionKind::Revenue),
            other => Err(ValidationError::InvalidInput(format!(
                "Unknown transaction kind '{}'",
                other
            ))
            .into()),
        }
    }
}

/// A stored expense. `amount` is always a non-negative magnitude.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: Option<i64>,
    pub user_id: i64,
    pub category_id: Option<i64>,
    pub amount: f64,
    pub label: String,
    pub date: NaiveDate,
    pub status: String,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

/// A stored revenue. `amount` is always a non-negative magnitude.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Revenue {
    pub id: Option<i64>,
    pub user_id: i64,
    pub category_id: Option<i64>,
    pub amount: f64,
    pub source: String,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

/// Input for `add_transaction`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub title: String,
    pub amount: f64,
    pub category: String,
    pub kind: TransactionKind,
    pub date: Option<NaiveDate>,
}

/// Partial update for an existing expense or revenue.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionUpdate {
    pub title: Option<String>,
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub date: Option<NaiveDate>,
}

impl TransactionUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.amount.is_none()
            && self.category.is_none()
            && self.date.is_none()
    }
}

/// Unified, sign-normalized view over expenses and revenues.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub kind: TransactionKind,
    pub title: String,
    pub amount: f64,
    pub category_id: Option<i64>,
    pub category: String,
    pub date: NaiveDate,
}

impl Transaction {
    pub fn from_expense(expense: &Expense, category: impl Into<String>) -> Self {
        Self {
            id: expense.id.unwrap_or_default(),
            user_id: expense.user_id,
            kind: TransactionKind::Expense,
            title: expense.label.clone(),
            amount: TransactionKind::Expense.signed(expense.amount),
            category_id: expense.category_id,
            category: category.into(),
            date: expense.date,
        }
    }

    pub fn from_revenue(revenue: &Revenue, category: impl Into<String>) -> Self {
        Self {
            id: revenue.id.unwrap_or_default(),
            user_id: revenue.user_id,
            kind: TransactionKind::Revenue,
            title: revenue.source.clone(),
            amount: TransactionKind::Revenue.signed(revenue.amount),
            category_id: revenue.category_id,
            category: category.into(),
            date: revenue.date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_amounts_follow_kind() {
        assert_eq!(TransactionKind::Expense.signed(50.0), -50.0);
        assert_eq!(TransactionKind::Expense.signed(-50.0), -50.0);
        assert_eq!(TransactionKind::Revenue.signed(-1200.0), 1200.0);
    }

    #[test]
    fn income_is_accepted_as_revenue_alias() {
        assert_eq!("income".parse::<TransactionKind>().unwrap(), TransactionKind::Revenue);
        assert!("transfer".parse::<TransactionKind>().is_err());
    }

    #[test]
    fn expense_view_is_negative() {
        let expense = Expense {
            id: Some(3),
            user_id: 1,
            category_id: Some(1),
            amount: 50.0,
            label: "Courses".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            status: EXPENSE_STATUS_VALID.to_string(),
            created_at: None,
            updated_at: None,
        };
        let view = Transaction::from_expense(&expense, "Alimentation");
        assert_eq!(view.amount, -50.0);
        assert_eq!(view.title, "Courses");
        assert_eq!(view.category, "Alimentation");
        assert_eq!(view.id, 3);
    }
}
