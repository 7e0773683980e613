//! # Research Desk
//!
//! Authentication and session core for the research desk application.
//!
//! The crate provides everything the HTTP server and the command line client
//! share:
//!
//! - **Credential Store**: durable user records with uniqueness guarantees
//! - **Password Hasher**: Argon2id hashing with per-record random salt
//! - **Session Token Issuer**: signed, 24-hour JWT session tokens
//! - **Auth Service**: register/login orchestration with a uniform error taxonomy
//! - **Retry Policy**: bounded retries around calls to external collaborators
//!
//! ## Core Modules
//!
//! - [`auth`]: Models, validation, hashing, tokens and the [`AuthService`]
//! - [`db`]: Connection pool lifecycle and [`CredentialStore`] implementations
//! - [`retry`]: The [`RetryPolicy`] used by the client session manager
//!
//! ## Example
//!
//! ```
//! use research_desk::{
//!     auth::{AuthService, HashCost, PasswordHasher, RegisterRequest, TokenIssuer},
//!     db::MemoryCredentialStore,
//! };
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let service = AuthService::new(
//!     Arc::new(MemoryCredentialStore::new()),
//!     PasswordHasher::new(HashCost::minimal())?,
//!     TokenIssuer::new("an-example-secret-that-is-long-enough"),
//! );
//!
//! let session = service
//!     .register(RegisterRequest {
//!         username: "alice".to_string(),
//!         email: "alice@example.com".to_string(),
//!         password: "Secret123".to_string(),
//!     })
//!     .await?;
//!
//! let claims = service.verify_token(&session.token)?;
//! assert_eq!(claims.username, "alice");
//! # Ok(())
//! # }
//! ```

/// Authentication: models, validation, password hashing, tokens and the service.
pub mod auth;
pub use auth::{AuthError, AuthResult, AuthService, AuthSession, SessionClaims, User, UserId};

/// Database pool lifecycle and credential store implementations.
pub mod db;
pub use db::{CredentialStore, Database, DatabaseConfig, MemoryCredentialStore, PgCredentialStore};

/// Bounded retry policy for calls to external collaborators.
pub mod retry;
pub use retry::{Backoff, RetryPolicy};
