//! Credential store error types.

use std::time::Duration;
use thiserror::Error;

/// Credential store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Insert rejected by a uniqueness constraint
    #[error("Record violates a uniqueness constraint")]
    Conflict,

    /// Operation exceeded its timeout
    #[error("Database operation timed out after {0:?}")]
    Timeout(Duration),

    /// Database error
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// Schema migration failed
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_error) = error {
            if db_error.is_unique_violation() {
                return StoreError::Conflict;
            }
        }
        StoreError::Database(error)
    }
}

/// Result type for credential store operations
pub type StoreResult<T> = Result<T, StoreError>;
