//! Error types for the remote API client.

use mesfactures_core::errors::{Error, ValidationError};
use thiserror::Error;

/// Result type alias for remote API operations.
pub type Result<T> = std::result::Result<T, ConnectError>;

/// Errors that can occur while talking to the backend.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// HTTP client error (connection refused, DNS, timeout)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error response from the backend
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Invalid request (missing required data, etc.)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Authentication error (missing or invalid token)
    #[error("Authentication error: {0}")]
    Auth(String),
}

impl ConnectError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    /// Whether the backend rejected the credentials.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ConnectError::Api { status: 401, .. } | ConnectError::Auth(_))
    }
}

impl From<ConnectError> for Error {
    fn from(err: ConnectError) -> Self {
        match err {
            ConnectError::Auth(message) => Error::Auth(message),
            ConnectError::InvalidRequest(message) => {
                Error::Validation(ValidationError::InvalidInput(message))
            }
            other => Error::TransmitFailure(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_become_transmit_failures() {
        let err: Error = ConnectError::api(500, "boom").into();
        assert!(matches!(err, Error::TransmitFailure(ref m) if m.contains("500")));
        assert!(err.is_degradation());
    }

    #[test]
    fn unauthorized_is_detected() {
        assert!(ConnectError::api(401, "expired").is_unauthorized());
        assert!(!ConnectError::api(404, "missing").is_unauthorized());
    }
}
