//! HTTP error responses.
//!
//! Every failure leaves the server as `{"error": "<short string>"}` with a
//! status derived from the [`AuthError`] kind. Internal faults are replaced by
//! the caller-supplied generic message; handlers log the underlying error.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use research_desk::auth::AuthError;
use serde::{Deserialize, Serialize};

/// JSON body of every error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error returned by handlers and extractors
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, AuthError::InvalidToken.to_string())
    }

    /// Map an auth failure to a response.
    ///
    /// `internal_message` is sent instead of the error text for server faults.
    pub fn from_auth(error: AuthError, internal_message: &str) -> Self {
        match error {
            AuthError::Validation(_) | AuthError::Conflict => {
                Self::bad_request(error.client_message())
            }
            AuthError::InvalidCredentials | AuthError::InvalidToken => {
                Self::new(StatusCode::UNAUTHORIZED, error.client_message())
            }
            AuthError::Storage(_)
            | AuthError::HashingFailed
            | AuthError::Token(_)
            | AuthError::Internal(_) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, internal_message)
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use research_desk::db::StoreError;
    use std::time::Duration;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AuthError::Validation("Email is required".into()), StatusCode::BAD_REQUEST),
            (AuthError::Conflict, StatusCode::BAD_REQUEST),
            (AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AuthError::InvalidToken, StatusCode::UNAUTHORIZED),
            (AuthError::HashingFailed, StatusCode::INTERNAL_SERVER_ERROR),
            (
                AuthError::Storage(StoreError::Timeout(Duration::from_secs(5))),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(ApiError::from_auth(error, "Error logging in").status(), expected);
        }
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ApiError::from_auth(AuthError::Conflict, "Error registering user").message(),
            "User already exists"
        );
        assert_eq!(
            ApiError::from_auth(AuthError::InvalidCredentials, "Error logging in").message(),
            "Invalid credentials"
        );
        assert_eq!(
            ApiError::from_auth(AuthError::Internal("join failed".into()), "Error logging in")
                .message(),
            "Error logging in"
        );
    }
}
