//! Authentication module providing user registration, login, and session tokens.
//!
//! This module implements:
//! - Argon2id password hashing with per-record random salt
//! - Stateless JWT session tokens (24-hour expiry, no refresh, no revocation)
//! - Input validation at the service boundary
//! - A uniform error taxonomy that never reveals which credential was wrong
//!
//! ## Example
//!
//! ```no_run
//! use research_desk::auth::{AuthService, HashCost, LoginRequest, PasswordHasher, TokenIssuer};
//! use research_desk::db::{Database, DatabaseConfig, PgCredentialStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(&DatabaseConfig::default()).await?;
//!     let auth = AuthService::new(
//!         Arc::new(PgCredentialStore::new(db.pool().clone())),
//!         PasswordHasher::new(HashCost::default())?,
//!         TokenIssuer::new("jwt_secret_of_at_least_thirty_two_chars"),
//!     );
//!
//!     let session = auth
//!         .login(LoginRequest {
//!             email: "alice@example.com".to_string(),
//!             password: "Secret123".to_string(),
//!         })
//!         .await?;
//!     println!("Logged in: {}", session.user.username);
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod models;
pub mod password;
pub mod service;
pub mod tokens;
pub mod validation;

pub use errors::{AuthError, AuthResult};
pub use models::{
    AuthSession, CredentialRecord, LoginRequest, NewUser, RegisterRequest, SessionClaims,
    StoredHash, User, UserId,
};
pub use password::{HashCost, PasswordHasher};
pub use service::AuthService;
pub use tokens::{DEFAULT_TOKEN_VALIDITY, TokenIssuer};
