//! Client-side session persistence.
//!
//! After a successful register or login the token and profile are written to
//! a local JSON file. Later commands read it back and attach the token as a
//! bearer credential. Logging out deletes the file.

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use research_desk::{
    auth::{AuthSession, LoginRequest, RegisterRequest, User},
    retry::RetryPolicy,
};
use serde::{Deserialize, Serialize};
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::{
    api_client::{ApiClient, TokenInfo},
    error::{ClientError, ClientResult},
};

/// File name of the persisted session
pub const SESSION_FILE_NAME: &str = "session.json";

/// What the client remembers between runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    pub user: User,
    pub saved_at: DateTime<Utc>,
}

impl From<AuthSession> for StoredSession {
    fn from(session: AuthSession) -> Self {
        Self {
            token: session.token,
            user: session.user,
            saved_at: Utc::now(),
        }
    }
}

/// JSON file holding at most one session
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<platform data dir>/research-desk/session.json`, if the platform has
    /// a home directory.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "research-desk")
            .map(|dirs| dirs.data_dir().join(SESSION_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored session; `None` when no session file exists.
    pub async fn load(&self) -> ClientResult<Option<StoredSession>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write the session, replacing any previous one.
    ///
    /// The file is written next to its final location and renamed into place
    /// so readers never observe a partial session.
    pub async fn save(&self, session: &StoredSession) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let staging = self.path.with_extension("json.tmp");
        tokio::fs::write(&staging, serde_json::to_vec_pretty(session)?).await?;
        tokio::fs::rename(&staging, &self.path).await?;
        Ok(())
    }

    /// Delete the stored session. Clearing an absent session succeeds.
    pub async fn clear(&self) -> ClientResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Keeps the local session in step with the server.
///
/// Reading the session before an API call, and asking the server about the
/// token, go through a bounded [`RetryPolicy`]. A 401 from a protected
/// endpoint is surfaced as [`ClientError::Unauthorized`]; there is no silent
/// refresh.
#[derive(Debug, Clone)]
pub struct SessionManager {
    api: ApiClient,
    store: SessionStore,
    retry: RetryPolicy,
}

impl SessionManager {
    pub fn new(api: ApiClient, store: SessionStore) -> Self {
        Self {
            api,
            store,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Register and remember the new session.
    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<StoredSession> {
        let session = self.api.register(request).await?;
        self.remember(session).await
    }

    /// Login and remember the new session.
    pub async fn login(&self, request: &LoginRequest) -> ClientResult<StoredSession> {
        let session = self.api.login(request).await?;
        self.remember(session).await
    }

    /// Forget the stored token and profile.
    pub async fn logout(&self) -> ClientResult<()> {
        self.store.clear().await?;
        log::info!("Session cleared");
        Ok(())
    }

    /// Current session, read with retries.
    ///
    /// # Errors
    ///
    /// * `ClientError::NotAuthenticated` - No session stored; not retried
    /// * `ClientError::Storage` - Session file unreadable after every attempt
    pub async fn current(&self) -> ClientResult<StoredSession> {
        self.retry
            .run_if(
                || async { self.store.load().await?.ok_or(ClientError::NotAuthenticated) },
                ClientError::is_transient,
            )
            .await
    }

    /// Bearer token of the current session.
    pub async fn bearer(&self) -> ClientResult<String> {
        Ok(self.current().await?.token)
    }

    /// Ask the server whether the stored token is still accepted.
    ///
    /// Connection failures and gateway errors are retried under the same
    /// policy as session reads. A 401 is returned at once as
    /// `ClientError::Unauthorized`.
    pub async fn whoami(&self) -> ClientResult<TokenInfo> {
        let token = self.bearer().await?;
        self.retry
            .run_if(|| self.api.me(&token), ClientError::is_transient)
            .await
    }

    async fn remember(&self, session: AuthSession) -> ClientResult<StoredSession> {
        let stored = StoredSession::from(session);
        self.store.save(&stored).await?;
        log::info!("Session saved to {}", self.store.path().display());
        Ok(stored)
    }
}
