//! Credential store trait and its PostgreSQL implementation.
//!
//! The trait keeps the auth service independent of storage, so the service can
//! run against [`PgCredentialStore`] in production and
//! [`MemoryCredentialStore`](super::MemoryCredentialStore) in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};

use super::{errors::StoreResult, timeouts::with_default_timeout};
use crate::auth::{CredentialRecord, NewUser, StoredHash, User};

/// Durable mapping from email/username to user records.
///
/// Implementations must enforce uniqueness of both `username` and `email` at
/// write time; the service's pre-check is not atomic with the insert.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Find a user whose email OR username matches
    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> StoreResult<Option<CredentialRecord>>;

    /// Find user by email
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<CredentialRecord>>;

    /// Insert a new user
    ///
    /// Fails with `StoreError::Conflict` if the username or email is taken.
    async fn create(&self, user: NewUser) -> StoreResult<User>;
}

/// PostgreSQL implementation of `CredentialStore`
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn record_from_row(row: PgRow) -> CredentialRecord {
    CredentialRecord {
        user: User {
            id: row.get("id"),
            username: row.get("username"),
            email: row.get("email"),
        },
        password_hash: StoredHash::new(row.get("password_hash")),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> StoreResult<Option<CredentialRecord>> {
        let row = with_default_timeout(
            sqlx::query(
                "SELECT id, username, email, password_hash, created_at
                 FROM users WHERE email = $1 OR username = $2
                 LIMIT 1",
            )
            .bind(email)
            .bind(username)
            .fetch_optional(&self.pool),
        )
        .await?;

        Ok(row.map(record_from_row))
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<CredentialRecord>> {
        let row = with_default_timeout(
            sqlx::query(
                "SELECT id, username, email, password_hash, created_at
                 FROM users WHERE email = $1",
            )
            .bind(email)
            .fetch_optional(&self.pool),
        )
        .await?;

        Ok(row.map(record_from_row))
    }

    async fn create(&self, user: NewUser) -> StoreResult<User> {
        let row = with_default_timeout(
            sqlx::query(
                "INSERT INTO users (id, username, email, password_hash)
                 VALUES ($1, $2, $3, $4)
                 RETURNING id, username, email",
            )
            .bind(user.id)
            .bind(&user.username)
            .bind(&user.email)
            .bind(user.password_hash.as_str())
            .fetch_one(&self.pool),
        )
        .await?;

        Ok(User {
            id: row.get("id"),
            username: row.get("username"),
            email: row.get("email"),
        })
    }
}
