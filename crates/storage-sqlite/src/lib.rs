//! SQLite storage implementation for MesFactures.
//!
//! This crate provides the durable half of the offline layer using Diesel ORM
//! with SQLite. It implements the store traits defined in `mesfactures-core`
//! and contains:
//! - Database connection pooling and management
//! - Diesel migrations for the mirrored collections
//! - A single-writer actor serializing all writes
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies exist.
//! All other crates (`core`, `connect`) are database-agnostic and work with traits.
//!
//! ```text
//! core (domain)          connect (remote API)
//!       │                      │
//!       └──────────┬───────────┘
//!                  │
//!                  ▼
//!          storage-sqlite (this crate)
//!                  │
//!                  ▼
//!              SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;

mod kv;
pub mod store;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, DbConnection, DbPool, WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

pub use store::SqliteLocalStore;

// Re-export from mesfactures-core for convenience
pub use mesfactures_core::errors::{DatabaseError, Error, Result};
