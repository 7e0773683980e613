//! HTTP API client for the authentication server.

use chrono::{DateTime, Utc};
use research_desk::auth::{AuthSession, LoginRequest, RegisterRequest, User, UserId};
use serde::Deserialize;

use crate::error::{ClientResult, error_from_response};

/// Successful register/login response
#[derive(Debug, Deserialize)]
struct AuthResponse {
    message: String,
    user: User,
    token: String,
}

/// Identity asserted by a session token, as reported by the server
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TokenInfo {
    pub user: TokenUser,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TokenUser {
    pub id: UserId,
    pub username: String,
}

/// API client for communicating with the authentication server
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Register a new user
    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<AuthSession> {
        self.authenticate("/api/auth/register", request).await
    }

    /// Login with email and password
    pub async fn login(&self, request: &LoginRequest) -> ClientResult<AuthSession> {
        self.authenticate("/api/auth/login", request).await
    }

    /// Ask the server who the token belongs to.
    ///
    /// A rejected token yields `ClientError::Unauthorized`.
    pub async fn me(&self, token: &str) -> ClientResult<TokenInfo> {
        let response = self
            .client
            .get(format!("{}/api/auth/me", self.base_url))
            .bearer_auth(token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response, true).await);
        }

        Ok(response.json().await?)
    }

    async fn authenticate<T: serde::Serialize>(
        &self,
        path: &str,
        body: &T,
    ) -> ClientResult<AuthSession> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response, false).await);
        }

        let auth: AuthResponse = response.json().await?;
        log::debug!("{}", auth.message);

        Ok(AuthSession {
            user: auth.user,
            token: auth.token,
        })
    }
}
