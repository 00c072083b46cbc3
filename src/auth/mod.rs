//! Authentication boundary
//!
//! The analysis service does not require a login, but when one exists the
//! stored token is attached to stream requests. Two backends share the
//! [`AuthService`] trait:
//!
//! - [`RemoteAuthService`] posts credentials to the configured login endpoint
//! - [`MockAuthService`] checks a fixed table of demo users
//!
//! Session state lives in an explicit [`AuthContext`] that is hydrated from
//! disk at startup and passed to whoever needs it.

pub mod context;
pub mod mock;
pub mod remote;

use crate::config::AppConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use context::{AuthContext, Credentials};
pub use mock::MockAuthService;
pub use remote::RemoteAuthService;

/// Auth errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Login failed: {0}")]
    LoginFailed(String),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Credential store error: {0}")]
    StoreError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub username: String,
    #[serde(default)]
    pub message: String,
    /// Bearer token, when the service issues one
    #[serde(default, alias = "access_token", skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Login backend
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, AuthError>;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

/// Pick the backend selected by `use_mock`
pub fn create_auth_service(config: &AppConfig) -> Result<Box<dyn AuthService>, AuthError> {
    if config.use_mock {
        Ok(Box::new(MockAuthService::new()))
    } else {
        Ok(Box::new(RemoteAuthService::new(config)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_honours_use_mock() {
        let config = AppConfig {
            use_mock: true,
            ..Default::default()
        };
        let service = create_auth_service(&config).unwrap();
        assert_eq!(service.name(), "mock");

        let service = create_auth_service(&AppConfig::default()).unwrap();
        assert_eq!(service.name(), "remote");
    }

    #[test]
    fn test_login_response_accepts_access_token() {
        let response: LoginResponse =
            serde_json::from_str(r#"{"username":"admin","message":"ok","access_token":"abc"}"#)
                .unwrap();
        assert_eq!(response.token.as_deref(), Some("abc"));

        let response: LoginResponse = serde_json::from_str(r#"{"username":"admin"}"#).unwrap();
        assert!(response.token.is_none());
        assert!(response.message.is_empty());
    }
}
