//! Authentication error types.

use thiserror::Error;

use crate::db::StoreError;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),

    /// Username or email already registered
    #[error("User already exists")]
    Conflict,

    /// Unknown email or wrong password; the two are indistinguishable
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Token signature, algorithm, claims or expiry rejected
    #[error("Invalid or expired token")]
    InvalidToken,

    /// Credential store failure
    #[error("Storage error: {0}")]
    Storage(StoreError),

    /// Password hashing failed
    #[error("Password hashing failed")]
    HashingFailed,

    /// JWT signing error
    #[error("JWT error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// Unexpected failure, such as a panicked blocking task
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AuthError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Conflict => AuthError::Conflict,
            other => AuthError::Storage(other),
        }
    }
}

impl AuthError {
    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// Storage, hashing and signing errors are sanitized to prevent information
    /// disclosure about the internal system structure.
    pub fn client_message(&self) -> String {
        match self {
            AuthError::Storage(_)
            | AuthError::HashingFailed
            | AuthError::Token(_)
            | AuthError::Internal(_) => "Internal server error".to_string(),
            // All other errors are safe to expose
            _ => self.to_string(),
        }
    }

    /// Whether this error is a server-side fault rather than a client mistake.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            AuthError::Storage(_) | AuthError::HashingFailed | AuthError::Token(_) | AuthError::Internal(_)
        )
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
