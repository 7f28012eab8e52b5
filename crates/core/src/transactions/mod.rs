//! Transactions module - expense and revenue models plus the unified view.

mod transactions_model;

pub use transactions_model::{
    Expense, NewTransaction, Revenue, Transaction, TransactionKind, TransactionUpdate,
    EXPENSE_STATUS_VALID,
};
