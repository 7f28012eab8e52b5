use async_trait::async_trait;

use super::offline_model::{MonthlyStats, UserDataExport, UserStats};
use crate::categories::{Category, CategoryKind};
use crate::errors::Result;
use crate::goals::{Goal, NewGoal};
use crate::invoices::{Invoice, ParsedInvoice};
use crate::loans::{Loan, NewLoan};
use crate::notifications::Notification;
use crate::sync::FlushReport;
use crate::transactions::{NewTransaction, Transaction, TransactionKind, TransactionUpdate};

/// Operations exposed to application screens. All of them initialize lazily.
#[async_trait]
pub trait OfflineDataServiceTrait: Send + Sync {
    async fn initialize(&self) -> Result<()>;

    async fn add_transaction(
        &self,
        user_id: i64,
        transaction: NewTransaction,
    ) -> Result<Transaction>;
    async fn get_transactions(
        &self,
        user_id: i64,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Transaction>>;
    async fn update_transaction(
        &self,
        user_id: i64,
        kind: TransactionKind,
        transaction_id: i64,
        changes: TransactionUpdate,
    ) -> Result<Transaction>;
    async fn delete_transaction(
        &self,
        user_id: i64,
        kind: TransactionKind,
        transaction_id: i64,
    ) -> Result<()>;

    async fn add_goal(&self, user_id: i64, goal: NewGoal) -> Result<Goal>;
    async fn get_goals(&self, user_id: i64) -> Result<Vec<Goal>>;
    async fn update_goal_progress(&self, user_id: i64, goal_id: i64, delta: f64) -> Result<Goal>;

    async fn add_loan(&self, user_id: i64, loan: NewLoan) -> Result<Loan>;
    async fn get_loans(&self, user_id: i64) -> Result<Vec<Loan>>;

    async fn get_categories(&self, kind: Option<CategoryKind>) -> Result<Vec<Category>>;

    async fn get_user_stats(&self, user_id: i64) -> Result<UserStats>;
    async fn get_monthly_stats(&self, user_id: i64, year: i32, month: u32) -> Result<MonthlyStats>;

    async fn get_notifications(&self, user_id: i64, unread_only: bool) -> Result<Vec<Notification>>;
    async fn mark_notification_read(
        &self,
        user_id: i64,
        notification_id: i64,
    ) -> Result<Notification>;

    async fn save_invoice(&self, user_id: i64, parsed: ParsedInvoice) -> Result<Invoice>;

    async fn export_user_data(&self, user_id: i64) -> Result<UserDataExport>;

    async fn process_sync_queue(&self) -> Result<FlushReport>;
    async fn get_sync_queue_size(&self) -> Result<usize>;
    async fn clear_sync_queue(&self) -> Result<()>;
}
