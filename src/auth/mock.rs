use super::{AuthError, AuthService, LoginRequest, LoginResponse};
use async_trait::async_trait;

const MOCK_USERS: &[(&str, &str)] = &[("admin", "admin123"), ("user", "user123")];

/// Offline backend for demos and tests
#[derive(Debug, Default, Clone)]
pub struct MockAuthService;

impl MockAuthService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuthService for MockAuthService {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, AuthError> {
        let known = MOCK_USERS
            .iter()
            .any(|(user, pass)| *user == request.username && *pass == request.password);

        if !known {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(LoginResponse {
            username: request.username.clone(),
            message: "Login successful (Mock)".to_string(),
            token: None,
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_demo_users() {
        let service = MockAuthService::new();

        let response = service
            .login(&LoginRequest::new("admin", "admin123"))
            .await
            .unwrap();
        assert_eq!(response.username, "admin");
        assert_eq!(response.message, "Login successful (Mock)");

        assert!(service.login(&LoginRequest::new("user", "user123")).await.is_ok());
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let service = MockAuthService::new();
        let result = service.login(&LoginRequest::new("admin", "user123")).await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }
}
