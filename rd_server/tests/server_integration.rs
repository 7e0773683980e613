//! Integration tests for the HTTP API.
//!
//! Drives the router in-process over an in-memory credential store: status
//! codes, response bodies, the bearer-token middleware, and CORS.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use rd_server::api::{AppState, create_router};
use rd_server::config::CorsConfig;
use research_desk::auth::{AuthService, HashCost, PasswordHasher, TokenIssuer};
use research_desk::db::MemoryCredentialStore;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt; // For `oneshot` method
use uuid::Uuid;

const JWT_SECRET: &str = "test_secret_key_for_testing_only_0123456789";

/// Helper to create a test server over a fresh in-memory store
fn create_test_server() -> axum::Router {
    let auth = AuthService::new(
        Arc::new(MemoryCredentialStore::new()),
        PasswordHasher::new(HashCost::minimal()).expect("valid hash cost"),
        TokenIssuer::new(JWT_SECRET),
    );

    create_router(AppState::new(auth), &CorsConfig::default())
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

/// Send a request and decode the JSON response body
async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("Response body should be JSON")
    };
    (status, value)
}

async fn register(
    app: &axum::Router,
    username: &str,
    email: &str,
    password: &str,
) -> (StatusCode, Value) {
    send(
        app,
        json_request(
            "POST",
            "/api/auth/register",
            json!({ "username": username, "email": email, "password": password }),
        ),
    )
    .await
}

async fn login(app: &axum::Router, email: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        json_request(
            "POST",
            "/api/auth/login",
            json!({ "email": email, "password": password }),
        ),
    )
    .await
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check_endpoint() {
    let app = create_test_server();

    let response = app
        .clone()
        .oneshot(get_request("/health", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let value: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = create_test_server();

    let response = app
        .oneshot(get_request("/api/does-not-exist", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let app = create_test_server();

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "trace-me-42")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.headers()["x-request-id"], "trace-me-42");
}

// ============================================================================
// Register / Login Tests
// ============================================================================

#[tokio::test]
async fn test_alice_scenario() {
    let app = create_test_server();

    let (status, body) = register(&app, "alice", "alice@example.com", "Secret123").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User registered successfully");
    assert_eq!(body["user"]["username"], "alice");
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert!(body["user"]["id"].is_string());
    assert!(body["user"].get("password_hash").is_none());
    let register_token = body["token"].as_str().unwrap().to_string();
    assert!(!register_token.is_empty());

    let (status, body) = login(&app, "alice@example.com", "Secret123").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged in successfully");
    assert_eq!(body["user"]["username"], "alice");
    let login_token = body["token"].as_str().unwrap();
    assert!(!login_token.is_empty());
    assert_ne!(login_token, register_token);

    let (status, body) = login(&app, "alice@example.com", "wrong").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Invalid credentials" }));
}

#[tokio::test]
async fn test_wrong_password_and_unknown_email_identical() {
    let app = create_test_server();
    register(&app, "bob", "bob@example.com", "Secret123").await;

    let wrong_password = login(&app, "bob@example.com", "nope").await;
    let unknown_email = login(&app, "nobody@example.com", "Secret123").await;

    assert_eq!(wrong_password, unknown_email);
    assert_eq!(wrong_password.0, StatusCode::UNAUTHORIZED);

    // Whitespace is a wrong password, not a missing one
    let blank_password = login(&app, "bob@example.com", "   ").await;
    assert_eq!(blank_password, unknown_email);
}

#[tokio::test]
async fn test_duplicate_registration_rejected() {
    let app = create_test_server();

    let (status, _) = register(&app, "carol", "carol@example.com", "Secret123").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = register(&app, "someone", "carol@example.com", "Other456").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "User already exists" }));

    // Original password still works
    let (status, _) = login(&app, "carol@example.com", "Secret123").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_empty_fields_rejected() {
    let app = create_test_server();

    let (status, body) = register(&app, "", "dave@example.com", "Secret123").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = register(&app, "dave", "dave@example.com", "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = login(&app, "", "Secret123").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_body_rejected() {
    let app = create_test_server();

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send(
        &app,
        json_request("POST", "/api/auth/login", json!({ "email": "x@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

// ============================================================================
// Protected Route Tests
// ============================================================================

#[tokio::test]
async fn test_me_with_valid_token() {
    let app = create_test_server();
    let (_, body) = register(&app, "erin", "erin@example.com", "Secret123").await;
    let token = body["token"].as_str().unwrap();

    let (status, me) = send(&app, get_request("/api/auth/me", Some(token))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["user"]["id"], body["user"]["id"]);
    assert_eq!(me["user"]["username"], "erin");
    assert!(me["issued_at"].is_string());
    assert!(me["expires_at"].is_string());
}

#[tokio::test]
async fn test_me_rejects_missing_or_bad_tokens() {
    let app = create_test_server();
    let expected = json!({ "error": "Invalid or expired token" });

    let (status, body) = send(&app, get_request("/api/auth/me", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, expected);

    let (status, body) = send(&app, get_request("/api/auth/me", Some("not.a.token"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, expected);

    let forged = TokenIssuer::new("a_completely_different_secret_0123456789")
        .issue(Uuid::new_v4(), "mallory")
        .unwrap();
    let (status, _) = send(&app, get_request("/api/auth/me", Some(&forged))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_rejects_expired_token() {
    let app = create_test_server();

    let expired = TokenIssuer::new(JWT_SECRET)
        .issue_at(Uuid::new_v4(), "frank", Utc::now() - Duration::hours(25))
        .unwrap();

    let (status, body) = send(&app, get_request("/api/auth/me", Some(&expired))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid or expired token");
}

// ============================================================================
// CORS Tests
// ============================================================================

fn preflight(origin: &str) -> Request<Body> {
    Request::builder()
        .method("OPTIONS")
        .uri("/api/auth/login")
        .header(header::ORIGIN, origin)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_cors_allows_configured_origin() {
    let app = create_test_server();

    let response = app
        .oneshot(preflight("http://localhost:8080"))
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:8080"
    );
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
}

#[tokio::test]
async fn test_cors_rejects_other_origin() {
    let app = create_test_server();

    let response = app
        .oneshot(preflight("https://evil.example.com"))
        .await
        .unwrap();

    assert!(
        !response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN)
    );
}

#[tokio::test]
async fn test_cors_custom_origins() {
    let auth = AuthService::new(
        Arc::new(MemoryCredentialStore::new()),
        PasswordHasher::new(HashCost::minimal()).unwrap(),
        TokenIssuer::new(JWT_SECRET),
    );
    let cors = CorsConfig::new(["https://desk.example.com"]).unwrap();
    let app = create_router(AppState::new(auth), &cors);

    let allowed = app
        .clone()
        .oneshot(preflight("https://desk.example.com"))
        .await
        .unwrap();
    assert_eq!(
        allowed.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://desk.example.com"
    );

    let default_origin = app
        .oneshot(preflight("http://localhost:8080"))
        .await
        .unwrap();
    assert!(
        !default_origin
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN)
    );
}
