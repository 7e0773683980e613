//! HTTP API for the research desk authentication server.
//!
//! # Modules
//!
//! - [`auth`]: Registration, login and token introspection handlers
//! - [`error`]: `{"error": ...}` responses and the status mapping of auth errors
//! - [`extract`]: JSON body extractor with JSON rejections
//! - [`middleware`]: Bearer-token authentication for protected endpoints
//! - [`request_id`]: Request correlation ids and per-request metrics
//!
//! # Endpoints Overview
//!
//! ```text
//! GET  /health              - Health check (public)
//! POST /api/auth/register   - Register user (public)
//! POST /api/auth/login      - Login (public)
//! GET  /api/auth/me         - Token owner (auth required)
//! ```
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use rd_server::{api::{create_router, AppState}, config::CorsConfig};
//! use research_desk::{
//!     auth::{AuthService, HashCost, PasswordHasher, TokenIssuer},
//!     db::MemoryCredentialStore,
//! };
//! use std::sync::Arc;
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!
//! let auth = AuthService::new(
//!     Arc::new(MemoryCredentialStore::new()),
//!     PasswordHasher::new(HashCost::default())?,
//!     TokenIssuer::new("jwt_secret_of_at_least_thirty_two_chars"),
//! );
//! let app = create_router(AppState::new(auth), &CorsConfig::default());
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:5000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # CORS
//!
//! Only the configured origins may call the API from a browser. Allowed
//! methods are `GET` and `POST`, allowed headers `Content-Type` and
//! `Authorization`, and credentials are permitted.

pub mod auth;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod request_id;

use axum::{
    Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    response::Json,
    routing::{get, post},
};
use research_desk::auth::AuthService;
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::CorsConfig;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request; the service sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
}

impl AppState {
    pub fn new(auth: AuthService) -> Self {
        Self {
            auth: Arc::new(auth),
        }
    }
}

/// Create the API router with all endpoints and middleware.
///
/// Unknown paths fall through to axum's default `404 Not Found`.
pub fn create_router(state: AppState, cors: &CorsConfig) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login));

    let protected_routes = Router::new()
        .route("/api/auth/me", get(auth::me))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(cors_layer(cors))
        .with_state(state)
}

/// CORS policy restricted to the configured origins.
pub fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(cors.allowed_origins().iter().cloned()))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
}

/// Health check endpoint for monitoring and load balancers.
///
/// ```bash
/// curl http://localhost:5000/health
/// # {"status":"ok"}
/// ```
async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
