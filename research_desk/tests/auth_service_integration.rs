//! Integration tests for the authentication service.
//!
//! Tests registration, login, token verification and the uniqueness guarantees
//! of the credential store under concurrent registrations.

use research_desk::auth::{
    AuthError, AuthService, HashCost, LoginRequest, PasswordHasher, RegisterRequest, TokenIssuer,
};
use research_desk::db::{CredentialStore, MemoryCredentialStore};
use std::sync::Arc;

const JWT_SECRET: &str = "test_secret_key_for_testing_only_0123456789";

/// Helper to create an auth service over a fresh in-memory store
fn setup_auth_service() -> (AuthService, Arc<MemoryCredentialStore>) {
    let store = Arc::new(MemoryCredentialStore::new());
    let hasher = PasswordHasher::new(HashCost::minimal()).expect("valid hash cost");
    let service = AuthService::new(store.clone(), hasher, TokenIssuer::new(JWT_SECRET));
    (service, store)
}

fn register_request(username: &str, email: &str, password: &str) -> RegisterRequest {
    RegisterRequest {
        username: username.to_string(),
        email: email.to_string(),
        password: password.to_string(),
    }
}

fn login_request(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn test_register_then_login() {
    let (auth, _) = setup_auth_service();

    let registered = auth
        .register(register_request("alice", "alice@example.com", "Secret123"))
        .await
        .expect("Registration should succeed");

    assert_eq!(registered.user.username, "alice");
    assert_eq!(registered.user.email, "alice@example.com");
    assert!(!registered.token.is_empty());

    let claims = auth
        .verify_token(&registered.token)
        .expect("Issued token should verify");
    assert_eq!(claims.sub, registered.user.id);
    assert_eq!(claims.username, "alice");

    let logged_in = auth
        .login(login_request("alice@example.com", "Secret123"))
        .await
        .expect("Login should succeed");

    assert_eq!(logged_in.user, registered.user);
    assert_ne!(logged_in.token, registered.token, "Login should issue a new token");
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let (auth, store) = setup_auth_service();

    auth.register(register_request("alice", "alice@example.com", "Secret123"))
        .await
        .expect("First registration should succeed");

    let result = auth
        .register(register_request("someone_else", "alice@example.com", "Other456"))
        .await;

    assert!(
        matches!(result, Err(AuthError::Conflict)),
        "Should return Conflict error"
    );
    assert_eq!(store.len().await, 1, "No second record should be written");
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let (auth, _) = setup_auth_service();

    auth.register(register_request("alice", "alice@example.com", "Secret123"))
        .await
        .unwrap();

    let result = auth
        .register(register_request("alice", "other@example.com", "Secret123"))
        .await;

    assert!(matches!(result, Err(AuthError::Conflict)));
}

#[tokio::test]
async fn test_email_is_case_insensitive() {
    let (auth, _) = setup_auth_service();

    auth.register(register_request("alice", "Alice@Example.com", "Secret123"))
        .await
        .unwrap();

    let duplicate = auth
        .register(register_request("alice2", "ALICE@example.com", "Secret123"))
        .await;
    assert!(matches!(duplicate, Err(AuthError::Conflict)));

    let session = auth
        .login(login_request("alice@EXAMPLE.com", "Secret123"))
        .await
        .expect("Login should ignore email case");
    assert_eq!(session.user.email, "alice@example.com");
}

#[tokio::test]
async fn test_register_rejects_empty_fields() {
    let (auth, store) = setup_auth_service();

    let cases = [
        register_request("", "alice@example.com", "Secret123"),
        register_request("alice", "", "Secret123"),
        register_request("alice", "alice@example.com", ""),
        register_request("   ", "alice@example.com", "Secret123"),
    ];

    for request in cases {
        let result = auth.register(request).await;
        assert!(
            matches!(result, Err(AuthError::Validation(_))),
            "Empty field should be a validation error"
        );
    }

    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_login_rejects_empty_fields() {
    let (auth, _) = setup_auth_service();

    assert!(matches!(
        auth.login(login_request("", "Secret123")).await,
        Err(AuthError::Validation(_))
    ));
    assert!(matches!(
        auth.login(login_request("alice@example.com", "")).await,
        Err(AuthError::Validation(_))
    ));
}

#[tokio::test]
async fn test_wrong_password_and_unknown_email_are_identical() {
    let (auth, _) = setup_auth_service();

    auth.register(register_request("alice", "alice@example.com", "Secret123"))
        .await
        .unwrap();

    let wrong_password = auth
        .login(login_request("alice@example.com", "wrong"))
        .await
        .unwrap_err();
    let unknown_email = auth
        .login(login_request("nobody@example.com", "Secret123"))
        .await
        .unwrap_err();

    assert!(matches!(wrong_password, AuthError::InvalidCredentials));
    assert!(matches!(unknown_email, AuthError::InvalidCredentials));
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    assert_eq!(wrong_password.client_message(), "Invalid credentials");
}

#[tokio::test]
async fn test_whitespace_password_is_invalid_credentials() {
    let (auth, _) = setup_auth_service();

    auth.register(register_request("alice", "alice@example.com", "Secret123"))
        .await
        .unwrap();

    let result = auth.login(login_request("alice@example.com", "   ")).await;
    assert!(matches!(result, Err(AuthError::InvalidCredentials)));

    let result = auth.login(login_request("nobody@example.com", "   ")).await;
    assert!(matches!(result, Err(AuthError::InvalidCredentials)));
}

#[tokio::test]
async fn test_password_hash_never_returned() {
    let (auth, store) = setup_auth_service();

    let session = auth
        .register(register_request("alice", "alice@example.com", "Secret123"))
        .await
        .unwrap();

    let json = serde_json::to_string(&session).unwrap();
    assert!(!json.contains("argon2"));
    assert!(!json.contains("Secret123"));

    let record = store
        .find_by_email("alice@example.com")
        .await
        .unwrap()
        .expect("User should be stored");
    assert!(record.password_hash.as_str().starts_with("$argon2id$"));
    assert_ne!(record.password_hash.as_str(), "Secret123");
}

#[tokio::test]
async fn test_concurrent_duplicate_registrations() {
    let (auth, store) = setup_auth_service();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let auth = auth.clone();
            tokio::spawn(async move {
                auth.register(register_request(
                    &format!("racer{i}"),
                    "race@example.com",
                    "Secret123",
                ))
                .await
            })
        })
        .collect();

    let mut successes = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(AuthError::Conflict) => conflicts += 1,
            Err(other) => panic!("Unexpected error: {other}"),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(conflicts, 7);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_token_from_other_service_rejected() {
    let (auth, _) = setup_auth_service();
    let session = auth
        .register(register_request("alice", "alice@example.com", "Secret123"))
        .await
        .unwrap();

    let other = AuthService::new(
        Arc::new(MemoryCredentialStore::new()),
        PasswordHasher::new(HashCost::minimal()).unwrap(),
        TokenIssuer::new("another_secret_key_for_testing_only_98765"),
    );

    assert!(matches!(
        other.verify_token(&session.token),
        Err(AuthError::InvalidToken)
    ));
}
