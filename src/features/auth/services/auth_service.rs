use crate::core::error::Result;
use crate::features::auth::clients::{IdentityProvider, ProviderSession};
use crate::features::auth::dtos::{
    AuthResponseDto, AuthUserDto, LoginRequestDto, MeResponseDto, RefreshTokenRequestDto,
    RefreshTokenResponseDto,
};
use crate::features::auth::model::{AdminPolicy, AuthenticatedUser};
use std::sync::Arc;

/// Service for authentication operations (login, refresh, current user)
pub struct AuthService {
    provider: Arc<dyn IdentityProvider>,
    admin_policy: AdminPolicy,
}

impl AuthService {
    pub fn new(provider: Arc<dyn IdentityProvider>, admin_policy: AdminPolicy) -> Self {
        Self {
            provider,
            admin_policy,
        }
    }

    /// Login with email and password
    pub async fn login(&self, dto: LoginRequestDto) -> Result<AuthResponseDto> {
        let session = self
            .provider
            .sign_in_with_password(dto.email.trim(), &dto.password)
            .await?;

        let user = self.auth_user(&session, Some(dto.email.trim()));

        Ok(AuthResponseDto {
            access_token: session.id_token,
            token_type: "Bearer".to_string(),
            expires_in: session.expires_in,
            refresh_token: session.refresh_token,
            user,
        })
    }

    /// Get current user info (for /me endpoint)
    pub async fn get_current_user(&self, user: AuthenticatedUser) -> Result<MeResponseDto> {
        Ok(user.into())
    }

    /// Exchange a refresh token for a new ID token
    pub async fn refresh_token(
        &self,
        dto: RefreshTokenRequestDto,
    ) -> Result<RefreshTokenResponseDto> {
        let session = self.provider.refresh(&dto.refresh_token).await?;

        Ok(RefreshTokenResponseDto {
            access_token: session.id_token,
            token_type: "Bearer".to_string(),
            expires_in: session.expires_in,
            refresh_token: session.refresh_token,
        })
    }

    fn auth_user(&self, session: &ProviderSession, fallback_email: Option<&str>) -> AuthUserDto {
        let email = session
            .email
            .clone()
            .or_else(|| fallback_email.map(String::from));
        let is_admin = !self
            .admin_policy
            .roles_for(email.as_deref(), session.email_verified)
            .is_empty();

        AuthUserDto {
            uid: session.uid.clone(),
            email,
            is_admin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::AppError;
    use async_trait::async_trait;

    struct FakeProvider {
        verified: bool,
    }

    #[async_trait]
    impl IdentityProvider for FakeProvider {
        async fn sign_in_with_password(
            &self,
            email: &str,
            password: &str,
        ) -> Result<ProviderSession> {
            if password != "correct-horse" {
                return Err(AppError::Unauthorized("Invalid credentials".to_string()));
            }
            Ok(ProviderSession {
                uid: "uid-1".to_string(),
                email: Some(email.to_string()),
                email_verified: self.verified,
                id_token: "id-token".to_string(),
                refresh_token: "refresh-token".to_string(),
                expires_in: 3600,
            })
        }

        async fn refresh(&self, refresh_token: &str) -> Result<ProviderSession> {
            if refresh_token != "refresh-token" {
                return Err(AppError::Unauthorized("Session expired".to_string()));
            }
            Ok(ProviderSession {
                uid: "uid-1".to_string(),
                email: None,
                email_verified: true,
                id_token: "id-token-2".to_string(),
                refresh_token: "refresh-token-2".to_string(),
                expires_in: 3600,
            })
        }
    }

    fn service(admins: &[&str]) -> AuthService {
        service_with(admins, true)
    }

    fn service_with(admins: &[&str], verified: bool) -> AuthService {
        let admins: Vec<String> = admins.iter().map(|s| s.to_string()).collect();
        AuthService::new(
            Arc::new(FakeProvider { verified }),
            AdminPolicy::new(&admins),
        )
    }

    #[tokio::test]
    async fn test_login_returns_tokens_and_admin_flag() {
        let response = service(&["curator@example.com"])
            .login(LoginRequestDto {
                email: "curator@example.com".to_string(),
                password: "correct-horse".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(response.access_token, "id-token");
        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.user.uid, "uid-1");
        assert!(response.user.is_admin);
    }

    #[tokio::test]
    async fn test_login_non_admin() {
        let response = service(&["curator@example.com"])
            .login(LoginRequestDto {
                email: "guest@example.com".to_string(),
                password: "correct-horse".to_string(),
            })
            .await
            .unwrap();
        assert!(!response.user.is_admin);
    }

    #[tokio::test]
    async fn test_login_unverified_email_is_not_admin() {
        let response = service_with(&["curator@example.com"], false)
            .login(LoginRequestDto {
                email: "curator@example.com".to_string(),
                password: "correct-horse".to_string(),
            })
            .await
            .unwrap();
        assert!(!response.user.is_admin);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let result = service(&[])
            .login(LoginRequestDto {
                email: "curator@example.com".to_string(),
                password: "nope".to_string(),
            })
            .await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_refresh_token() {
        let response = service(&[])
            .refresh_token(RefreshTokenRequestDto {
                refresh_token: "refresh-token".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(response.access_token, "id-token-2");
        assert_eq!(response.refresh_token, "refresh-token-2");
    }
}
