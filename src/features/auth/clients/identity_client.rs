use crate::core::config::AuthConfig;
use crate::core::error::{AppError, Result};
use async_trait::async_trait;
use base64::prelude::*;
use serde::{Deserialize, Serialize};

/// Tokens handed out by the identity provider after a successful sign-in or refresh
#[derive(Debug, Clone)]
pub struct ProviderSession {
    pub uid: String,
    pub email: Option<String>,
    /// `email_verified` claim of the issued ID token
    pub email_verified: bool,
    pub id_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

/// Password sign-in and token refresh against a managed identity provider
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<ProviderSession>;

    async fn refresh(&self, refresh_token: &str) -> Result<ProviderSession>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    user_id: String,
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorResponse {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    #[serde(default)]
    message: String,
}

/// Client for the Firebase Authentication REST API
pub struct FirebaseIdentityClient {
    api_key: String,
    identity_toolkit_url: String,
    secure_token_url: String,
    http_client: reqwest::Client,
}

impl FirebaseIdentityClient {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            identity_toolkit_url: config.identity_toolkit_url.trim_end_matches('/').to_string(),
            secure_token_url: config.secure_token_url.trim_end_matches('/').to_string(),
            http_client: reqwest::Client::new(),
        }
    }

    async fn error_from_response(response: reqwest::Response) -> AppError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        match serde_json::from_str::<ProviderErrorResponse>(&body) {
            Ok(parsed) => map_provider_error(&parsed.error.message),
            Err(_) => {
                tracing::error!("Identity provider error: HTTP {} - {}", status, body);
                AppError::ExternalServiceError(format!("Identity provider error: HTTP {}", status))
            }
        }
    }
}

/// Map a provider error code (e.g. `INVALID_PASSWORD`, or
/// `TOO_MANY_ATTEMPTS_TRY_LATER : detail`) to an application error
fn map_provider_error(message: &str) -> AppError {
    let code = message
        .split([' ', ':'])
        .next()
        .unwrap_or_default()
        .trim();

    match code {
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "INVALID_EMAIL" => {
            AppError::Unauthorized("Invalid credentials".to_string())
        }
        "TOKEN_EXPIRED" | "INVALID_REFRESH_TOKEN" | "INVALID_GRANT_TYPE" | "USER_NOT_FOUND" => {
            AppError::Unauthorized("Session expired, please sign in again".to_string())
        }
        "USER_DISABLED" => AppError::Forbidden("Account is disabled".to_string()),
        c if c.starts_with("TOO_MANY_ATTEMPTS") => AppError::RateLimitExceeded(
            "Too many sign-in attempts, try again later".to_string(),
        ),
        other => {
            tracing::error!("Identity provider returned {}", message);
            AppError::ExternalServiceError(format!("Identity provider error: {}", other))
        }
    }
}

#[derive(Debug, Deserialize)]
struct VerificationClaims {
    #[serde(default)]
    email_verified: bool,
}

/// Read `email_verified` from a token the provider just issued to us.
/// Signature checks happen in the JWT validator on every request.
fn email_verified_claim(id_token: &str) -> bool {
    id_token
        .split('.')
        .nth(1)
        .and_then(|payload| BASE64_URL_SAFE_NO_PAD.decode(payload).ok())
        .and_then(|json| serde_json::from_slice::<VerificationClaims>(&json).ok())
        .is_some_and(|claims| claims.email_verified)
}

fn parse_expires_in(value: &str) -> i64 {
    value.parse::<i64>().unwrap_or(3600)
}

#[async_trait]
impl IdentityProvider for FirebaseIdentityClient {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<ProviderSession> {
        let url = format!(
            "{}/v1/accounts:signInWithPassword?key={}",
            self.identity_toolkit_url,
            urlencoding::encode(&self.api_key)
        );

        tracing::debug!("Signing in user: {}", email);

        let response = self
            .http_client
            .post(&url)
            .json(&SignInRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to reach identity provider: {}", e);
                AppError::ExternalServiceError(format!("Failed to sign in: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let body = response.json::<SignInResponse>().await.map_err(|e| {
            AppError::ExternalServiceError(format!("Failed to parse sign-in response: {}", e))
        })?;

        tracing::info!("User signed in: {}", body.local_id);

        Ok(ProviderSession {
            uid: body.local_id,
            email: body.email,
            email_verified: email_verified_claim(&body.id_token),
            id_token: body.id_token,
            refresh_token: body.refresh_token,
            expires_in: parse_expires_in(&body.expires_in),
        })
    }

    async fn refresh(&self, refresh_token: &str) -> Result<ProviderSession> {
        let url = format!(
            "{}/v1/token?key={}",
            self.secure_token_url,
            urlencoding::encode(&self.api_key)
        );

        let response = self
            .http_client
            .post(&url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to reach token endpoint: {}", e);
                AppError::ExternalServiceError(format!("Failed to refresh token: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let body = response.json::<RefreshResponse>().await.map_err(|e| {
            AppError::ExternalServiceError(format!("Failed to parse refresh response: {}", e))
        })?;

        Ok(ProviderSession {
            uid: body.user_id,
            email: None,
            email_verified: email_verified_claim(&body.id_token),
            id_token: body.id_token,
            refresh_token: body.refresh_token,
            expires_in: parse_expires_in(&body.expires_in),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_invalid_credentials() {
        for code in [
            "EMAIL_NOT_FOUND",
            "INVALID_PASSWORD",
            "INVALID_LOGIN_CREDENTIALS",
        ] {
            assert!(matches!(map_provider_error(code), AppError::Unauthorized(_)));
        }
    }

    #[test]
    fn test_map_disabled_and_throttled() {
        assert!(matches!(
            map_provider_error("USER_DISABLED"),
            AppError::Forbidden(_)
        ));
        assert!(matches!(
            map_provider_error(
                "TOO_MANY_ATTEMPTS_TRY_LATER : Access to this account has been temporarily disabled"
            ),
            AppError::RateLimitExceeded(_)
        ));
    }

    #[test]
    fn test_map_unknown_is_external_error() {
        assert!(matches!(
            map_provider_error("OPERATION_NOT_ALLOWED"),
            AppError::ExternalServiceError(_)
        ));
    }

    #[test]
    fn test_parse_sign_in_response() {
        let body: SignInResponse = serde_json::from_value(serde_json::json!({
            "kind": "identitytoolkit#VerifyPasswordResponse",
            "localId": "uid-1",
            "email": "a@example.com",
            "displayName": "",
            "idToken": "id.token.value",
            "registered": true,
            "refreshToken": "refresh",
            "expiresIn": "3600"
        }))
        .unwrap();
        assert_eq!(body.local_id, "uid-1");
        assert_eq!(parse_expires_in(&body.expires_in), 3600);
    }

    #[test]
    fn test_email_verified_claim() {
        let token = |claims: serde_json::Value| {
            format!(
                "header.{}.signature",
                BASE64_URL_SAFE_NO_PAD.encode(claims.to_string())
            )
        };
        assert!(email_verified_claim(&token(serde_json::json!({
            "sub": "uid-1",
            "email_verified": true
        }))));
        assert!(!email_verified_claim(&token(serde_json::json!({
            "sub": "uid-1",
            "email_verified": false
        }))));
        assert!(!email_verified_claim(&token(serde_json::json!({ "sub": "uid-1" }))));
        assert!(!email_verified_claim("not-a-jwt"));
    }
}
