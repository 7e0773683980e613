//! Client error types.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Errors surfaced by the API client, session manager and data service
#[derive(Debug, Error)]
pub enum ClientError {
    /// No session is stored; the user must log in first
    #[error("Not logged in")]
    NotAuthenticated,

    /// A protected endpoint rejected the session token
    #[error("Session rejected: {0}")]
    Unauthorized(String),

    /// The server answered with a non-success status
    #[error("Request failed ({status}): {message}")]
    Api { status: StatusCode, message: String },

    /// Transport failure or undecodable response
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Session file could not be read or written
    #[error("Session storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Session file exists but does not contain a session
    #[error("Session file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

impl ClientError {
    /// Whether retrying the same operation may succeed.
    ///
    /// Local session-file I/O, refused connections, timeouts and gateway
    /// statuses (502, 503, 504) qualify. A missing session or a rejected
    /// token needs user action.
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Storage(_) => true,
            ClientError::Http(e) => e.is_connect() || e.is_timeout(),
            ClientError::Api { status, .. } => matches!(status.as_u16(), 502..=504),
            _ => false,
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Error body sent by the auth server (`error`) or the research API (`message`).
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// Turn a non-success response into a `ClientError`.
///
/// With `protected` set, a 401 means the bearer token was rejected and maps
/// to `ClientError::Unauthorized`; otherwise it is an ordinary API error,
/// such as wrong credentials on login.
pub(crate) async fn error_from_response(response: reqwest::Response, protected: bool) -> ClientError {
    let status = response.status();
    let message = match response.text().await {
        Ok(text) => serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|body| body.error.or(body.message))
            .unwrap_or_else(|| {
                if text.trim().is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("Unknown error")
                        .to_string()
                } else {
                    text
                }
            }),
        Err(e) => format!("Failed to read error response: {}", e),
    };

    if protected && status == StatusCode::UNAUTHORIZED {
        ClientError::Unauthorized(message)
    } else {
        ClientError::Api { status, message }
    }
}
