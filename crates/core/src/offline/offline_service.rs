use async_trait::async_trait;
use log::{debug, info, warn};
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::OnceCell;

use super::offline_model::{
    CategoryResolution, MonthlyStats, OfflineConfig, UserDataExport, UserStats,
};
use super::offline_traits::OfflineDataServiceTrait;
use crate::categories::{default_categories, Category, CategoryKind};
use crate::constants::{GOAL_COMPLETED_NOTIFICATION, UNASSIGNED_CATEGORY};
use crate::errors::{Error, Result, ValidationError};
use crate::goals::{Goal, NewGoal};
use crate::history::ActionHistoryEntry;
use crate::invoices::{Invoice, ParsedInvoice};
use crate::loans::{Loan, NewLoan};
use crate::notifications::{Notification, NotificationStatus};
use crate::store::{
    Collection, IndexFilter, IndexValue, LocalStoreExt, LocalStoreTrait, Record, StoredRecord,
};
use crate::sync::{FlushReport, SyncOperation, SyncQueue, SyncTransmitter};
use crate::transactions::{
    Expense, NewTransaction, Revenue, Transaction, TransactionKind, TransactionUpdate,
    EXPENSE_STATUS_VALID,
};
use crate::users::User;
use crate::utils::time_utils::{is_in_month, month_bounds, now_naive, today_local};

/// Writes locally first, records every mutation in the sync queue, and
/// replays the queue when asked to.
pub struct OfflineDataService {
    store: Arc<dyn LocalStoreTrait>,
    queue: Arc<SyncQueue>,
    transmitter: Arc<dyn SyncTransmitter>,
    config: OfflineConfig,
    initialized: OnceCell<()>,
}

impl OfflineDataService {
    pub fn new(
        store: Arc<dyn LocalStoreTrait>,
        queue: Arc<SyncQueue>,
        transmitter: Arc<dyn SyncTransmitter>,
        config: OfflineConfig,
    ) -> Self {
        Self {
            store,
            queue,
            transmitter,
            config,
            initialized: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &OfflineConfig {
        &self.config
    }

    pub fn sync_queue(&self) -> Arc<SyncQueue> {
        self.queue.clone()
    }

    async fn ensure_initialized(&self) -> Result<()> {
        self.initialized
            .get_or_try_init(|| async {
                self.store.initialize().await?;
                self.seed_default_categories().await?;
                let pending = self.queue.load().await?;
                info!("Offline data service initialized ({} pending sync items)", pending);
                Ok::<(), Error>(())
            })
            .await
            .map(|_| ())
    }

    async fn seed_default_categories(&self) -> Result<()> {
        if self.store.count(Collection::Categories, None).await? > 0 {
            return Ok(());
        }
        for category in default_categories() {
            self.store.insert_typed(category).await?;
        }
        debug!("Seeded default categories");
        Ok(())
    }

    async fn categories_by_kind(&self, kind: CategoryKind) -> Result<Vec<Category>> {
        self.store
            .find_typed("kind", IndexValue::from(kind.as_str()))
            .await
    }

    /// Exact, case-insensitive, trimmed match within `kind`.
    async fn resolve_category(&self, name: &str, kind: CategoryKind) -> Result<CategoryResolution> {
        let found = self
            .categories_by_kind(kind)
            .await?
            .into_iter()
            .find(|c| c.matches(name, kind));
        Ok(match found {
            Some(category) => CategoryResolution::Matched(category),
            None => {
                warn!("Category '{}' not found for {} transactions", name.trim(), kind);
                CategoryResolution::Unassigned
            }
        })
    }

    async fn category_names(&self) -> Result<HashMap<i64, String>> {
        let categories: Vec<Category> = self.store.all_typed().await?;
        Ok(categories
            .into_iter()
            .filter_map(|c| c.id.map(|id| (id, c.name)))
            .collect())
    }

    async fn user_records<R: StoredRecord>(&self, user_id: i64) -> Result<Vec<R>> {
        self.store.find_typed("user_id", IndexValue::Int(user_id)).await
    }

    /// Fails with `NotFound` unless `user_id` names a stored user.
    async fn ensure_user(&self, user_id: i64) -> Result<User> {
        self.store
            .fetch_typed::<User>(user_id)
            .await?
            .ok_or_else(|| Error::not_found(User::COLLECTION.as_str(), user_id))
    }

    /// Fetches a record and checks it belongs to `user_id`.
    async fn owned<R: StoredRecord>(&self, user_id: i64, id: i64) -> Result<R> {
        self.ensure_user(user_id).await?;
        let record = self
            .store
            .get(R::COLLECTION, id)
            .await?
            .ok_or_else(|| Error::not_found(R::COLLECTION.as_str(), id))?;
        if record.user_id() != Some(user_id) {
            return Err(Error::access_denied(format!(
                "{} #{} does not belong to user {}",
                R::COLLECTION,
                id,
                user_id
            )));
        }
        R::from_record(record)
    }

    async fn enqueue_record(&self, operation: SyncOperation, record: &Record) -> Result<()> {
        self.queue
            .enqueue(record.collection(), operation, record.to_payload()?)
            .await
            .map(|_| ())
    }

    /// Writes `record`, then queues it for sync. Nothing is queued if the
    /// local write fails.
    async fn write_and_enqueue<R: StoredRecord>(
        &self,
        record: R,
        operation: SyncOperation,
    ) -> Result<R> {
        let stored = match operation {
            SyncOperation::Create => self.store.add(record.into_record()).await?,
            _ => self.store.update(record.into_record()).await?,
        };
        self.enqueue_record(operation, &stored).await?;
        R::from_record(stored)
    }

    /// Best-effort audit entry. Failures are logged, never returned.
    async fn log_action(&self, user_id: i64, action_type: &str, description: String) {
        let entry = ActionHistoryEntry::new(user_id, action_type, description, now_naive());
        if let Err(e) = self.store.insert_typed(entry).await {
            warn!("Failed to record action '{}' for user {}: {}", action_type, user_id, e);
        }
    }

    async fn create_notification(
        &self,
        user_id: i64,
        notification_type: &str,
        message: String,
    ) -> Result<Notification> {
        let notification = Notification::new(user_id, notification_type, message);
        self.write_and_enqueue(notification, SyncOperation::Create).await
    }

    fn category_label(names: &HashMap<i64, String>, category_id: Option<i64>) -> String {
        category_id
            .and_then(|id| names.get(&id).cloned())
            .unwrap_or_else(|| UNASSIGNED_CATEGORY.to_string())
    }

    fn resolved_label(resolution: &CategoryResolution) -> String {
        match resolution {
            CategoryResolution::Matched(c) => c.name.clone(),
            CategoryResolution::Unassigned => UNASSIGNED_CATEGORY.to_string(),
        }
    }
}

fn ensure_finite(amount: f64) -> Result<()> {
    if amount.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::InvalidInput(format!(
            "Amount must be a finite number, got {}",
            amount
        ))
        .into())
    }
}

#[async_trait]
impl OfflineDataServiceTrait for OfflineDataService {
    async fn initialize(&self) -> Result<()> {
        self.ensure_initialized().await
    }

    async fn add_transaction(
        &self,
        user_id: i64,
        transaction: NewTransaction,
    ) -> Result<Transaction> {
        self.ensure_initialized().await?;
        ensure_finite(transaction.amount)?;
        self.ensure_user(user_id).await?;

        let date = transaction.date.unwrap_or_else(today_local);
        let kind = transaction.kind;
        let resolution = self
            .resolve_category(&transaction.category, kind.category_kind())
            .await?;
        let category = Self::resolved_label(&resolution);

        let view = match kind {
            TransactionKind::Expense => {
                let expense = Expense {
                    id: None,
                    user_id,
                    category_id: resolution.id(),
                    amount: transaction.amount.abs(),
                    label: transaction.title.clone(),
                    date,
                    status: EXPENSE_STATUS_VALID.to_string(),
                    created_at: None,
                    updated_at: None,
                };
                let stored = self.write_and_enqueue(expense, SyncOperation::Create).await?;
                Transaction::from_expense(&stored, category)
            }
            TransactionKind::Revenue => {
                let revenue = Revenue {
                    id: None,
                    user_id,
                    category_id: resolution.id(),
                    amount: transaction.amount.abs(),
                    source: transaction.title.clone(),
                    date,
                    description: None,
                    created_at: None,
                    updated_at: None,
                };
                let stored = self.write_and_enqueue(revenue, SyncOperation::Create).await?;
                Transaction::from_revenue(&stored, category)
            }
        };

        self.log_action(
            user_id,
            "create_transaction",
            format!("Added {}: {}", kind, transaction.title),
        )
        .await;
        Ok(view)
    }

    async fn get_transactions(
        &self,
        user_id: i64,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Transaction>> {
        self.ensure_initialized().await?;
        if limit == 0 {
            return Ok(Vec::new());
        }

        let names = self.category_names().await?;
        let expenses: Vec<Expense> = self.user_records(user_id).await?;
        let revenues: Vec<Revenue> = self.user_records(user_id).await?;

        let mut all: Vec<Transaction> = expenses
            .iter()
            .map(|e| Transaction::from_expense(e, Self::category_label(&names, e.category_id)))
            .chain(revenues.iter().map(|r| {
                Transaction::from_revenue(r, Self::category_label(&names, r.category_id))
            }))
            .collect();
        all.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));

        Ok(all.into_iter().skip(offset).take(limit).collect())
    }

    async fn update_transaction(
        &self,
        user_id: i64,
        kind: TransactionKind,
        transaction_id: i64,
        changes: TransactionUpdate,
    ) -> Result<Transaction> {
        self.ensure_initialized().await?;
        if let Some(amount) = changes.amount {
            ensure_finite(amount)?;
        }
        let resolution = match &changes.category {
            Some(name) => Some(self.resolve_category(name, kind.category_kind()).await?),
            None => None,
        };
        let names = self.category_names().await?;

        let view = match kind {
            TransactionKind::Expense => {
                let mut expense: Expense = self.owned(user_id, transaction_id).await?;
                if let Some(title) = changes.title {
                    expense.label = title;
                }
                if let Some(amount) = changes.amount {
                    expense.amount = amount.abs();
                }
                if let Some(date) = changes.date {
                    expense.date = date;
                }
                if let Some(r) = &resolution {
                    expense.category_id = r.id();
                }
                let stored = self.write_and_enqueue(expense, SyncOperation::Update).await?;
                Transaction::from_expense(&stored, Self::category_label(&names, stored.category_id))
            }
            TransactionKind::Revenue => {
                let mut revenue: Revenue = self.owned(user_id, transaction_id).await?;
                if let Some(title) = changes.title {
                    revenue.source = title;
                }
                if let Some(amount) = changes.amount {
                    revenue.amount = amount.abs();
                }
                if let Some(date) = changes.date {
                    revenue.date = date;
                }
                if let Some(r) = &resolution {
                    revenue.category_id = r.id();
                }
                let stored = self.write_and_enqueue(revenue, SyncOperation::Update).await?;
                Transaction::from_revenue(&stored, Self::category_label(&names, stored.category_id))
            }
        };

        self.log_action(
            user_id,
            "update_transaction",
            format!("Updated {}: {}", kind, transaction_id),
        )
        .await;
        Ok(view)
    }

    async fn delete_transaction(
        &self,
        user_id: i64,
        kind: TransactionKind,
        transaction_id: i64,
    ) -> Result<()> {
        self.ensure_initialized().await?;
        let collection = match kind {
            TransactionKind::Expense => {
                self.owned::<Expense>(user_id, transaction_id).await?;
                Collection::Expenses
            }
            TransactionKind::Revenue => {
                self.owned::<Revenue>(user_id, transaction_id).await?;
                Collection::Revenues
            }
        };

        self.store.delete_record(collection, transaction_id).await?;
        self.queue
            .enqueue(collection, SyncOperation::Delete, json!({ "id": transaction_id }))
            .await?;

        self.log_action(
            user_id,
            "delete_transaction",
            format!("Deleted {}: {}", kind, transaction_id),
        )
        .await;
        Ok(())
    }

    async fn add_goal(&self, user_id: i64, goal: NewGoal) -> Result<Goal> {
        self.ensure_initialized().await?;
        ensure_finite(goal.target_amount)?;
        self.ensure_user(user_id).await?;
        let stored = self
            .write_and_enqueue(goal.into_goal(user_id), SyncOperation::Create)
            .await?;
        self.log_action(user_id, "create_goal", format!("Created goal: {}", stored.name))
            .await;
        Ok(stored)
    }

    async fn get_goals(&self, user_id: i64) -> Result<Vec<Goal>> {
        self.ensure_initialized().await?;
        self.user_records(user_id).await
    }

    async fn update_goal_progress(&self, user_id: i64, goal_id: i64, delta: f64) -> Result<Goal> {
        self.ensure_initialized().await?;
        ensure_finite(delta)?;

        let mut goal: Goal = self.owned(user_id, goal_id).await?;
        let just_completed = goal.apply_progress(delta);
        let stored = self.write_and_enqueue(goal, SyncOperation::Update).await?;

        if just_completed {
            info!("Goal #{} '{}' completed", goal_id, stored.name);
            let message = format!(
                "Félicitations ! Vous avez atteint votre objectif : {}",
                stored.name
            );
            if let Err(e) = self
                .create_notification(user_id, GOAL_COMPLETED_NOTIFICATION, message)
                .await
            {
                warn!("Failed to notify completion of goal #{}: {}", goal_id, e);
            }
        }

        self.log_action(
            user_id,
            "update_goal",
            format!("Updated goal progress: {}", stored.name),
        )
        .await;
        Ok(stored)
    }

    async fn add_loan(&self, user_id: i64, loan: NewLoan) -> Result<Loan> {
        self.ensure_initialized().await?;
        self.ensure_user(user_id).await?;
        let loan = loan.into_loan(user_id, today_local())?;
        let stored = self.write_and_enqueue(loan, SyncOperation::Create).await?;
        self.log_action(user_id, "create_loan", format!("Created loan: {}", stored.label))
            .await;
        Ok(stored)
    }

    async fn get_loans(&self, user_id: i64) -> Result<Vec<Loan>> {
        self.ensure_initialized().await?;
        self.user_records(user_id).await
    }

    async fn get_categories(&self, kind: Option<CategoryKind>) -> Result<Vec<Category>> {
        self.ensure_initialized().await?;
        match kind {
            Some(kind) => self.categories_by_kind(kind).await,
            None => self.store.all_typed().await,
        }
    }

    async fn get_user_stats(&self, user_id: i64) -> Result<UserStats> {
        self.ensure_initialized().await?;
        let expenses: Vec<Expense> = self.user_records(user_id).await?;
        let revenues: Vec<Revenue> = self.user_records(user_id).await?;
        let by_user = Some(IndexFilter::user(user_id));
        let goal_count = self.store.count(Collection::Goals, by_user.clone()).await?;
        let loan_count = self.store.count(Collection::Loans, by_user).await?;

        let total_expenses: f64 = expenses.iter().map(|e| e.amount).sum();
        let total_revenues: f64 = revenues.iter().map(|r| r.amount).sum();
        Ok(UserStats {
            transaction_count: expenses.len() + revenues.len(),
            expense_count: expenses.len(),
            revenue_count: revenues.len(),
            goal_count,
            loan_count,
            total_expenses,
            total_revenues,
            balance: total_revenues - total_expenses,
        })
    }

    async fn get_monthly_stats(&self, user_id: i64, year: i32, month: u32) -> Result<MonthlyStats> {
        self.ensure_initialized().await?;
        if month_bounds(year, month).is_none() {
            return Err(ValidationError::InvalidInput(format!(
                "Invalid month {}-{}",
                year, month
            ))
            .into());
        }

        let names = self.category_names().await?;
        let expenses: Vec<Expense> = self.user_records(user_id).await?;
        let revenues: Vec<Revenue> = self.user_records(user_id).await?;
        let monthly_expenses: Vec<&Expense> = expenses
            .iter()
            .filter(|e| is_in_month(e.date, year, month))
            .collect();
        let monthly_revenues: Vec<&Revenue> = revenues
            .iter()
            .filter(|r| is_in_month(r.date, year, month))
            .collect();

        let mut expenses_by_category: BTreeMap<String, f64> = BTreeMap::new();
        for expense in &monthly_expenses {
            *expenses_by_category
                .entry(Self::category_label(&names, expense.category_id))
                .or_insert(0.0) += expense.amount;
        }

        let total_expenses: f64 = monthly_expenses.iter().map(|e| e.amount).sum();
        let total_revenues: f64 = monthly_revenues.iter().map(|r| r.amount).sum();
        Ok(MonthlyStats {
            year,
            month,
            total_expenses,
            total_revenues,
            balance: total_revenues - total_expenses,
            transaction_count: monthly_expenses.len() + monthly_revenues.len(),
            expenses_by_category,
        })
    }

    async fn get_notifications(
        &self,
        user_id: i64,
        unread_only: bool,
    ) -> Result<Vec<Notification>> {
        self.ensure_initialized().await?;
        let mut notifications: Vec<Notification> = self.user_records(user_id).await?;
        if unread_only {
            notifications.retain(|n| n.is_unread());
        }
        notifications.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(notifications)
    }

    async fn mark_notification_read(
        &self,
        user_id: i64,
        notification_id: i64,
    ) -> Result<Notification> {
        self.ensure_initialized().await?;
        let mut notification: Notification = self.owned(user_id, notification_id).await?;
        if !notification.is_unread() {
            return Ok(notification);
        }
        notification.status = NotificationStatus::Read;
        self.write_and_enqueue(notification, SyncOperation::Update).await
    }

    async fn save_invoice(&self, user_id: i64, parsed: ParsedInvoice) -> Result<Invoice> {
        self.ensure_initialized().await?;
        self.ensure_user(user_id).await?;
        let invoice = parsed.into_invoice(user_id)?;
        let stored = self.write_and_enqueue(invoice, SyncOperation::Create).await?;
        self.log_action(
            user_id,
            "create_invoice",
            format!("Saved invoice from {}", stored.supplier),
        )
        .await;
        Ok(stored)
    }

    async fn export_user_data(&self, user_id: i64) -> Result<UserDataExport> {
        self.ensure_initialized().await?;
        let user: Option<User> = self.store.fetch_typed(user_id).await?;
        Ok(UserDataExport {
            user,
            expenses: self.user_records(user_id).await?,
            revenues: self.user_records(user_id).await?,
            goals: self.user_records(user_id).await?,
            loans: self.user_records(user_id).await?,
            notifications: self.user_records(user_id).await?,
            invoices: self.user_records(user_id).await?,
            action_history: self.user_records(user_id).await?,
            exported_at: now_naive(),
        })
    }

    async fn process_sync_queue(&self) -> Result<FlushReport> {
        self.ensure_initialized().await?;
        self.queue
            .flush(self.transmitter.as_ref(), self.config.transmit_timeout)
            .await
    }

    async fn get_sync_queue_size(&self) -> Result<usize> {
        self.ensure_initialized().await?;
        Ok(self.queue.pending_count().await)
    }

    async fn clear_sync_queue(&self) -> Result<()> {
        self.ensure_initialized().await?;
        self.queue.clear().await
    }
}
