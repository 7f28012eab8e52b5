//! MesFactures Core - Domain entities, services, and traits.
//!
//! This crate contains the offline-first business logic for MesFactures.
//! It is database-agnostic and defines traits that are implemented
//! by the `storage-sqlite` crate.

pub mod auth;
pub mod categories;
pub mod connectivity;
pub mod constants;
pub mod errors;
pub mod goals;
pub mod history;
pub mod invoices;
pub mod loans;
pub mod notifications;
pub mod offline;
pub mod store;
pub mod sync;
pub mod transactions;
pub mod users;
pub mod utils;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
