//! Authentication middleware for protected endpoints.
//!
//! The middleware extracts and validates the session token from the
//! Authorization header, then injects the decoded [`SessionClaims`] into
//! request extensions for downstream handlers.
//!
//! # Usage
//!
//! ```rust,no_run
//! use axum::{Router, routing::get, middleware};
//! # use rd_server::api::middleware::auth_middleware;
//! # use rd_server::api::AppState;
//! # async fn handler() {}
//! # let state: AppState = unimplemented!();
//!
//! let protected_routes: Router = Router::new()
//!     .route("/api/protected", get(handler))
//!     .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
//!     .with_state(state);
//! # let _ = protected_routes;
//! ```
//!
//! In handler functions, extract the claims from request extensions:
//!
//! ```rust,no_run
//! use axum::extract::Extension;
//! use research_desk::auth::SessionClaims;
//!
//! async fn protected_handler(Extension(claims): Extension<SessionClaims>) -> String {
//!     format!("Authenticated as {}", claims.username)
//! }
//! # let _ = protected_handler;
//! ```

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

use super::{AppState, error::ApiError};
use crate::{logging, metrics};

/// Token from an `Authorization: Bearer <token>` header, if present.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Authentication middleware that validates session tokens.
///
/// # Behavior
///
/// - **Success**: Token valid → Injects `SessionClaims` into request extensions → Calls next handler
/// - **Missing or malformed header**: Returns `401 Unauthorized`
/// - **Invalid/expired token**: Returns `401 Unauthorized`
///
/// Every 401 carries `{"error": "Invalid or expired token"}`.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = bearer_token(request.headers()) else {
        return Err(ApiError::unauthorized());
    };

    match state.auth.verify_token(token) {
        Ok(claims) => {
            metrics::token_verifications_total(true);
            request.extensions_mut().insert(claims);
            Ok(next.run(request).await)
        }
        Err(_) => {
            metrics::token_verifications_total(false);
            logging::log_security_event("invalid_token", None, "Rejected session token");
            Err(ApiError::unauthorized())
        }
    }
}
