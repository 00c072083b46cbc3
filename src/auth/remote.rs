use super::{AuthError, AuthService, LoginRequest, LoginResponse};
use crate::config::AppConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Posts `{username, password}` as JSON to the login endpoint
pub struct RemoteAuthService {
    client: Client,
    url: String,
}

impl RemoteAuthService {
    pub fn new(config: &AppConfig) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            url: config.login_url(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl AuthService for RemoteAuthService {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, AuthError> {
        tracing::debug!(url = %self.url, username = %request.username, "Sending login request");

        let response = self.client.post(&self.url).json(request).send().await?;

        match response.status() {
            status if status.is_success() => Ok(response.json().await?),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AuthError::InvalidCredentials),
            status => Err(AuthError::LoginFailed(format!("HTTP {}", status))),
        }
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}
