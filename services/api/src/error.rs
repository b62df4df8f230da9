//! services/api/src/error.rs
//!
//! Defines the primary error type for the API service and the translation of
//! core port errors into HTTP responses.

use crate::config::ConfigError;
use axum::http::StatusCode;
use camptime_core::ports::PortError;
use tracing::{error, warn};

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a failure while applying the schema migrations.
    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// The status code a port error is reported with.
pub fn status_for(err: &PortError) -> StatusCode {
    match err {
        PortError::NotFound(_) => StatusCode::NOT_FOUND,
        PortError::Unauthorized => StatusCode::UNAUTHORIZED,
        PortError::Forbidden(_) => StatusCode::FORBIDDEN,
        PortError::Conflict(_) => StatusCode::CONFLICT,
        PortError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        PortError::Transaction(_) | PortError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Returns a mapper from `PortError` to the handler error tuple.
///
/// Client errors keep their message. Server errors are logged and answered with
/// `Failed to <action>` so internals do not leak.
pub fn http_error(action: &'static str) -> impl Fn(PortError) -> (StatusCode, String) {
    move |err| {
        let status = status_for(&err);
        if status.is_server_error() {
            error!(error = ?err, "Failed to {}", action);
            (status, format!("Failed to {}", action))
        } else {
            warn!(error = %err, "Rejected request to {}", action);
            (status, err.to_string())
        }
    }
}
