//! Logged-in session, persisted as a small JSON file

use super::{AuthError, AuthService, LoginRequest};
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub logged_in_at: DateTime<Utc>,
}

/// Session state passed explicitly to the application
#[derive(Debug, Clone)]
pub struct AuthContext {
    store_path: PathBuf,
    credentials: Option<Credentials>,
}

impl AuthContext {
    /// Default credentials file (`<data_dir>/credentials.json`)
    pub fn default_path() -> PathBuf {
        ProjectDirs::from("com", "aurora", "aurora")
            .map(|dirs| dirs.data_dir().join("credentials.json"))
            .unwrap_or_else(|| PathBuf::from("aurora-credentials.json"))
    }

    /// Empty session backed by `store_path`; nothing is read yet
    pub fn new(store_path: impl Into<PathBuf>) -> Self {
        Self {
            store_path: store_path.into(),
            credentials: None,
        }
    }

    /// Restore the session stored at `store_path`.
    ///
    /// A missing file means logged out. An unreadable file is logged and
    /// also treated as logged out, so a stale store never blocks startup.
    pub fn hydrate(store_path: impl Into<PathBuf>) -> Result<Self, AuthError> {
        let mut context = Self::new(store_path);

        if !context.store_path.exists() {
            return Ok(context);
        }

        let content = std::fs::read_to_string(&context.store_path)?;
        match serde_json::from_str::<Credentials>(&content) {
            Ok(credentials) => {
                info!(username = %credentials.username, "Restored session");
                context.credentials = Some(credentials);
            }
            Err(e) => {
                warn!(path = ?context.store_path, error = %e, "Ignoring unreadable credentials file");
            }
        }

        Ok(context)
    }

    /// Log in through `service` and persist the result
    pub async fn login(
        &mut self,
        service: &dyn AuthService,
        username: &str,
        password: &str,
    ) -> Result<&Credentials, AuthError> {
        let response = service
            .login(&LoginRequest::new(username, password))
            .await?;
        info!(username = %response.username, backend = service.name(), "{}", response.message);

        let credentials = Credentials {
            username: response.username,
            token: response.token,
            logged_in_at: Utc::now(),
        };
        self.persist(&credentials)?;

        Ok(&*self.credentials.insert(credentials))
    }

    /// Forget the session in memory and on disk. Returns whether anyone was
    /// logged in.
    pub fn logout(&mut self) -> Result<bool, AuthError> {
        let was_logged_in = self.credentials.take().is_some();

        if self.store_path.exists() {
            std::fs::remove_file(&self.store_path)?;
        }

        Ok(was_logged_in)
    }

    pub fn is_logged_in(&self) -> bool {
        self.credentials.is_some()
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn username(&self) -> Option<&str> {
        self.credentials.as_ref().map(|c| c.username.as_str())
    }

    /// Token to attach to analysis requests, if the login issued one
    pub fn bearer_token(&self) -> Option<&str> {
        self.credentials.as_ref().and_then(|c| c.token.as_deref())
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    fn persist(&self, credentials: &Credentials) -> Result<(), AuthError> {
        if let Some(parent) = self.store_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(credentials)?;
        std::fs::write(&self.store_path, content)?;
        Ok(())
    }
}
