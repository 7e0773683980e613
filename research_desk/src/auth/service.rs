//! Authentication service implementation.

use std::sync::Arc;
use uuid::Uuid;

use super::{
    errors::{AuthError, AuthResult},
    models::{AuthSession, LoginRequest, NewUser, RegisterRequest, SessionClaims, StoredHash},
    password::PasswordHasher,
    tokens::TokenIssuer,
    validation::{validate_email, validate_login_password, validate_password, validate_username},
};
use crate::db::CredentialStore;

/// Authentication service
///
/// Orchestrates the credential store, password hasher and token issuer. Holds
/// no mutable state of its own, so clones can serve requests in parallel.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    tokens: TokenIssuer,
}

impl AuthService {
    /// Create a new authentication service
    ///
    /// # Arguments
    ///
    /// * `store` - Credential store shared with the rest of the process
    /// * `hasher` - Password hasher with the configured cost
    /// * `tokens` - Token issuer holding the signing secret
    pub fn new(store: Arc<dyn CredentialStore>, hasher: PasswordHasher, tokens: TokenIssuer) -> Self {
        Self {
            store,
            hasher,
            tokens,
        }
    }

    /// Register a new user and issue a session token
    ///
    /// # Errors
    ///
    /// * `AuthError::Validation` - A field is empty or malformed
    /// * `AuthError::Conflict` - Username or email already registered, including
    ///   when a concurrent registration wins the race to the store
    /// * `AuthError::Storage` / `AuthError::HashingFailed` - Internal failures
    pub async fn register(&self, request: RegisterRequest) -> AuthResult<AuthSession> {
        let username = validate_username(&request.username)?;
        let email = validate_email(&request.email)?;
        validate_password(&request.password)?;

        if self
            .store
            .find_by_email_or_username(&email, &username)
            .await?
            .is_some()
        {
            log::info!("Registration rejected: user already exists");
            return Err(AuthError::Conflict);
        }

        let password_hash = self.hash_password(request.password).await?;

        let new_user = NewUser {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash,
        };

        // A concurrent insert may have won since the check above; the store's
        // uniqueness constraint turns that into AuthError::Conflict.
        let user = self.store.create(new_user).await?;

        let token = self.tokens.issue(user.id, &user.username)?;
        log::info!("Registered user {}", user.id);

        Ok(AuthSession { user, token })
    }

    /// Login a user by email and password
    ///
    /// # Errors
    ///
    /// * `AuthError::Validation` - A field is empty or oversized
    /// * `AuthError::InvalidCredentials` - Unknown email or wrong password; the
    ///   two cases are indistinguishable to the caller
    pub async fn login(&self, request: LoginRequest) -> AuthResult<AuthSession> {
        if request.email.trim().is_empty() {
            return Err(AuthError::Validation("Email is required".to_string()));
        }
        validate_login_password(&request.password)?;
        let email = request.email.trim().to_lowercase();

        let record = self.store.find_by_email(&email).await?;

        let record = match record {
            Some(record) => record,
            None => {
                self.burn_verification(request.password).await?;
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !self
            .verify_password(request.password, record.password_hash)
            .await?
        {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(record.user.id, &record.user.username)?;
        log::debug!("User {} logged in", record.user.id);

        Ok(AuthSession {
            user: record.user,
            token,
        })
    }

    /// Verify a session token
    ///
    /// # Returns
    ///
    /// * `AuthResult<SessionClaims>` - Decoded claims or `AuthError::InvalidToken`
    pub fn verify_token(&self, token: &str) -> AuthResult<SessionClaims> {
        self.tokens.verify(token)
    }

    /// Token issuer used by this service.
    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Hash on the blocking pool; Argon2 is deliberately slow.
    async fn hash_password(&self, password: String) -> AuthResult<StoredHash> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Internal(format!("hashing task failed: {e}")))?
    }

    async fn verify_password(&self, password: String, hash: StoredHash) -> AuthResult<bool> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AuthError::Internal(format!("verification task failed: {e}")))?
    }

    async fn burn_verification(&self, password: String) -> AuthResult<()> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify_dummy(&password))
            .await
            .map_err(|e| AuthError::Internal(format!("verification task failed: {e}")))
    }
}
