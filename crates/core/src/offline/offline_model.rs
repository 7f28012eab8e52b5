//! Offline service configuration and aggregate views.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::categories::Category;
use crate::constants::{DEFAULT_PAGE_SIZE, DEFAULT_TRANSMIT_TIMEOUT_SECS};
use crate::goals::Goal;
use crate::history::ActionHistoryEntry;
use crate::invoices::Invoice;
use crate::loans::Loan;
use crate::notifications::Notification;
use crate::transactions::{Expense, Revenue};
use crate::users::User;

#[derive(Debug, Clone)]
pub struct OfflineConfig {
    /// Upper bound on a single remote transmit during a flush.
    pub transmit_timeout: Duration,
    pub default_page_size: usize,
}

impl Default for OfflineConfig {
    fn default() -> Self {
        Self {
            transmit_timeout: Duration::from_secs(DEFAULT_TRANSMIT_TIMEOUT_SECS),
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Result of resolving a free-text category name.
#[derive(Debug, Clone, PartialEq)]
pub enum CategoryResolution {
    Matched(Category),
    Unassigned,
}

impl CategoryResolution {
    pub fn id(&self) -> Option<i64> {
        match self {
            CategoryResolution::Matched(c) => c.id,
            CategoryResolution::Unassigned => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub transaction_count: usize,
    pub expense_count: usize,
    pub revenue_count: usize,
    pub goal_count: usize,
    pub loan_count: usize,
    pub total_expenses: f64,
    pub total_revenues: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStats {
    pub year: i32,
    pub month: u32,
    pub total_expenses: f64,
    pub total_revenues: f64,
    pub balance: f64,
    pub transaction_count: usize,
    /// Expense totals keyed by category name.
    pub expenses_by_category: BTreeMap<String, f64>,
}

/// Everything stored locally for one user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDataExport {
    pub user: Option<User>,
    pub expenses: Vec<Expense>,
    pub revenues: Vec<Revenue>,
    pub goals: Vec<Goal>,
    pub loans: Vec<Loan>,
    pub notifications: Vec<Notification>,
    pub invoices: Vec<Invoice>,
    pub action_history: Vec<ActionHistoryEntry>,
    pub exported_at: NaiveDateTime,
}
