//! Unified error handling.
//!
//! Services return `Result<T, AppError>`. [`AppError::user_message`] gives
//! the text to show the user; backend details stay in the `Display` output
//! for logs only.

use thiserror::Error;

use lookoot_core::ValidationError;

use crate::config::ConfigError;
use crate::db::RepositoryError;
use crate::remote::StoreError;
use crate::services::auth::AuthError;

/// Application-level error type for the Lookoot client.
#[derive(Debug, Error)]
pub enum AppError {
    /// Repository operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Object storage operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Input failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller lacks the role for this action.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Message safe to show to users.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Database(RepositoryError::NotFound) => "Not found".to_string(),
            Self::Database(RepositoryError::Timeout(_)) => {
                "The request timed out. Please try again.".to_string()
            }
            Self::Database(RepositoryError::Conflict(msg)) => msg.clone(),
            Self::Database(_) | Self::Internal(_) | Self::Config(_) => {
                "Something went wrong. Please try again.".to_string()
            }
            Self::Storage(_) => "Upload failed. Please try again.".to_string(),
            Self::Auth(err) => err.user_message(),
            Self::Validation(err) => err.to_string(),
            Self::NotFound(what) => format!("{what} not found"),
            Self::Forbidden(_) => "You do not have permission to do that.".to_string(),
        }
    }

    /// Whether this error was caused by the backend rather than the user's input.
    #[must_use]
    pub const fn is_backend_failure(&self) -> bool {
        matches!(
            self,
            Self::Database(
                RepositoryError::Store(_)
                    | RepositoryError::DataCorruption(_)
                    | RepositoryError::Timeout(_)
            ) | Self::Storage(_)
                | Self::Internal(_)
        )
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
