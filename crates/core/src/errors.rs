//! Core error types for the MesFactures offline layer.
//!
//! This module defines database-agnostic error types. Storage-specific errors
//! (from Diesel, SQLite, etc.) are converted to these types by the storage layer.

use chrono::ParseError as ChronoParseError;
use std::num::ParseFloatError;
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the offline layer.
///
/// Storage and sync failures surface here unchanged so the service façade can
/// decide whether to recover locally or hand a non-fatal message to the UI.
#[derive(Error, Debug)]
pub enum Error {
    /// The embedded database could not be opened (quota, permissions, corrupt file).
    #[error("Local storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    /// A uniqueness index was violated on write. Never retried automatically.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// The requested record belongs to another user.
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("{collection} record {id} not found")]
    NotFound { collection: String, id: i64 },

    /// A queued mutation could not be delivered to the remote backend.
    #[error("Transmit failed: {0}")]
    TransmitFailure(String),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    pub fn not_found(collection: impl Into<String>, id: i64) -> Self {
        Error::NotFound {
            collection: collection.into(),
            id,
        }
    }

    pub fn access_denied(message: impl Into<String>) -> Self {
        Error::AccessDenied(message.into())
    }

    pub fn transmit(message: impl Into<String>) -> Self {
        Error::TransmitFailure(message.into())
    }

    /// Whether the failure leaves local data intact and the feature merely degraded.
    pub fn is_degradation(&self) -> bool {
        matches!(self, Error::StorageUnavailable(_) | Error::TransmitFailure(_))
    }
}

/// Database-agnostic error type for storage operations.
///
/// This enum uses `String` for all error details, allowing the storage layer
/// to convert storage-specific errors into this format.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to establish a database connection.
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to create or configure the connection pool.
    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(String),

    /// A database query failed to execute.
    #[error("Database query failed: {0}")]
    QueryFailed(String),

    /// A foreign key constraint was violated.
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Database migration failed.
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Internal/unexpected database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Validation errors for user input and data parsing.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Failed to parse number: {0}")]
    NumberParse(#[from] ParseFloatError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] ChronoParseError),

    #[error("Collection '{collection}' has no index '{index}'")]
    UnknownIndex { collection: String, index: String },
}

// === From implementations for common error types ===

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateTimeParse(err))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
