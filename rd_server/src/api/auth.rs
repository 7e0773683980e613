//! Authentication API handlers.
//!
//! This module provides HTTP REST endpoints for user authentication:
//! - Registration with username, email and password
//! - Login with email and password
//! - Profile lookup for the bearer of a session token
//!
//! All endpoints return JSON responses with either a session token or an
//! `{"error": ...}` body.
//!
//! # Examples
//!
//! Register a new user:
//! ```bash
//! curl -X POST http://localhost:5000/api/auth/register \
//!   -H "Content-Type: application/json" \
//!   -d '{"username": "alice", "email": "alice@example.com", "password": "Secret123"}'
//! ```
//!
//! Login:
//! ```bash
//! curl -X POST http://localhost:5000/api/auth/login \
//!   -H "Content-Type: application/json" \
//!   -d '{"email": "alice@example.com", "password": "Secret123"}'
//! ```

use axum::{Extension, Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use research_desk::auth::{
    AuthError, LoginRequest, RegisterRequest, SessionClaims, User, UserId,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::{AppState, error::ApiError, extract::JsonBody, request_id::RequestId};
use crate::{logging, metrics};

pub const REGISTERED_MESSAGE: &str = "User registered successfully";
pub const LOGGED_IN_MESSAGE: &str = "Logged in successfully";
pub const REGISTER_FAILED_MESSAGE: &str = "Error registering user";
pub const LOGIN_FAILED_MESSAGE: &str = "Error logging in";

/// Body of a successful register or login
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    pub user: User,
    pub token: String,
}

/// Identity asserted by the bearer token
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenUser {
    pub id: UserId,
    pub username: String,
}

/// Body of `GET /api/auth/me`
#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub user: TokenUser,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Register a new user account and log them in.
///
/// # Request Body
///
/// ```json
/// { "username": "alice", "email": "alice@example.com", "password": "Secret123" }
/// ```
///
/// # Response
///
/// On success, returns `201 Created`:
/// ```json
/// {
///   "message": "User registered successfully",
///   "user": { "id": "…", "username": "alice", "email": "alice@example.com" },
///   "token": "eyJhbGciOiJIUzI1NiIs..."
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Malformed body, empty field, or user already exists
/// - `500 Internal Server Error`: `{"error": "Error registering user"}`
pub async fn register(
    State(state): State<AppState>,
    request_id: RequestId,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let start = Instant::now();
    let result = state.auth.register(request).await;
    logging::log_performance("register", start.elapsed().as_millis() as u64);

    match result {
        Ok(session) => {
            metrics::registrations_total("created");
            tracing::info!(
                request_id = request_id.as_str(),
                user_id = %session.user.id,
                "User registered"
            );
            Ok((
                StatusCode::CREATED,
                Json(AuthResponse {
                    message: REGISTERED_MESSAGE.to_string(),
                    user: session.user,
                    token: session.token,
                }),
            ))
        }
        Err(e) => {
            metrics::registrations_total(match &e {
                AuthError::Conflict => "conflict",
                AuthError::Validation(_) => "invalid",
                _ => "error",
            });
            if e.is_internal() {
                tracing::error!(request_id = request_id.as_str(), error = %e, "Registration failed");
            }
            Err(ApiError::from_auth(e, REGISTER_FAILED_MESSAGE))
        }
    }
}

/// Authenticate a user and issue a session token.
///
/// # Request Body
///
/// ```json
/// { "email": "alice@example.com", "password": "Secret123" }
/// ```
///
/// # Response
///
/// On success, returns `200 OK` with the same shape as registration and the
/// message `"Logged in successfully"`.
///
/// # Errors
///
/// - `400 Bad Request`: Malformed body or empty field
/// - `401 Unauthorized`: `{"error": "Invalid credentials"}` for an unknown
///   email and for a wrong password alike
/// - `500 Internal Server Error`: `{"error": "Error logging in"}`
pub async fn login(
    State(state): State<AppState>,
    request_id: RequestId,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let start = Instant::now();
    let result = state.auth.login(request).await;
    logging::log_performance("login", start.elapsed().as_millis() as u64);

    match result {
        Ok(session) => {
            metrics::login_attempts_total(true);
            Ok(Json(AuthResponse {
                message: LOGGED_IN_MESSAGE.to_string(),
                user: session.user,
                token: session.token,
            }))
        }
        Err(e) => {
            if matches!(e, AuthError::InvalidCredentials) {
                metrics::login_attempts_total(false);
                logging::log_security_event("failed_login", None, "Invalid credentials");
            } else if e.is_internal() {
                tracing::error!(request_id = request_id.as_str(), error = %e, "Login failed");
            }
            Err(ApiError::from_auth(e, LOGIN_FAILED_MESSAGE))
        }
    }
}

/// Return the identity carried by the caller's session token.
///
/// Requires `Authorization: Bearer <token>`; the claims are placed in the
/// request extensions by [`auth_middleware`](super::middleware::auth_middleware).
pub async fn me(Extension(claims): Extension<SessionClaims>) -> Json<MeResponse> {
    Json(MeResponse {
        issued_at: claims.issued_at(),
        expires_at: claims.expires_at(),
        user: TokenUser {
            id: claims.sub,
            username: claims.username,
        },
    })
}
