//! Loans module - domain models and amortization helper.

mod loans_model;

pub use loans_model::{monthly_payment, Loan, LoanStatus, NewLoan};
