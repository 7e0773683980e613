//! In-process credential store for development and tests.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{
    errors::{StoreError, StoreResult},
    repository::CredentialStore,
};
use crate::auth::{CredentialRecord, NewUser, User, UserId};

/// `CredentialStore` backed by a `HashMap`.
///
/// Uniqueness is checked and the insert performed under one write lock, which
/// gives the same guarantee as the database's UNIQUE constraints.
#[derive(Default)]
pub struct MemoryCredentialStore {
    users: RwLock<HashMap<UserId, CredentialRecord>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> StoreResult<Option<CredentialRecord>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|r| r.user.email == email || r.user.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<CredentialRecord>> {
        let users = self.users.read().await;
        Ok(users.values().find(|r| r.user.email == email).cloned())
    }

    async fn create(&self, user: NewUser) -> StoreResult<User> {
        let mut users = self.users.write().await;

        let taken = users.contains_key(&user.id)
            || users
                .values()
                .any(|r| r.user.email == user.email || r.user.username == user.username);
        if taken {
            return Err(StoreError::Conflict);
        }

        let profile = User {
            id: user.id,
            username: user.username,
            email: user.email,
        };
        users.insert(
            profile.id,
            CredentialRecord {
                user: profile.clone(),
                password_hash: user.password_hash,
                created_at: Utc::now(),
            },
        );

        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StoredHash;
    use std::sync::Arc;
    use uuid::Uuid;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: StoredHash::new("hash".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let store = MemoryCredentialStore::new();
        assert!(store.is_empty().await);

        let user = store
            .create(new_user("alice", "alice@example.com"))
            .await
            .expect("Failed to create user");

        let found = store.find_by_email("alice@example.com").await.unwrap();
        assert_eq!(found.unwrap().user, user);
        assert!(store.find_by_email("bob@example.com").await.unwrap().is_none());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_find_by_email_or_username() {
        let store = MemoryCredentialStore::new();
        store.create(new_user("alice", "alice@example.com")).await.unwrap();

        assert!(store
            .find_by_email_or_username("other@example.com", "alice")
            .await
            .unwrap()
            .is_some());
        assert!(store
            .find_by_email_or_username("alice@example.com", "other")
            .await
            .unwrap()
            .is_some());
        assert!(store
            .find_by_email_or_username("bob@example.com", "bob")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryCredentialStore::new();
        store.create(new_user("alice", "alice@example.com")).await.unwrap();

        let result = store.create(new_user("alice2", "alice@example.com")).await;
        assert!(matches!(result, Err(StoreError::Conflict)));
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let store = MemoryCredentialStore::new();
        store.create(new_user("alice", "alice@example.com")).await.unwrap();

        let result = store.create(new_user("alice", "other@example.com")).await;
        assert!(matches!(result, Err(StoreError::Conflict)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_inserts_single_winner() {
        let store = Arc::new(MemoryCredentialStore::new());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .create(new_user(&format!("user{i}"), "same@example.com"))
                        .await
                })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }

        assert_eq!(successes, 1, "Exactly one insert should win");
        assert_eq!(store.len().await, 1);
    }
}
