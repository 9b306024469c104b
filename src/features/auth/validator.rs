use super::model::{AdminPolicy, AuthenticatedUser};
use crate::core::error::AppError;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use super::jwks::JwksClient;

/// Verifies identity-provider ID tokens and resolves the caller's roles
pub struct JwtValidator {
    jwks_client: Arc<JwksClient>,
    issuer: String,
    audience: String,
    leeway: u64,
    admin_policy: AdminPolicy,
}

#[derive(Debug, Clone, Deserialize)]
struct Claims {
    // Standard JWT claims (iss/aud/exp validated by jsonwebtoken)
    sub: String,
    #[serde(rename = "iss")]
    _iss: String,
    #[serde(rename = "aud")]
    _aud: String,
    #[serde(rename = "exp")]
    _exp: u64,

    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
}

impl JwtValidator {
    pub fn new(
        jwks_client: Arc<JwksClient>,
        issuer: String,
        audience: String,
        leeway: Duration,
        admin_policy: AdminPolicy,
    ) -> Self {
        Self {
            jwks_client,
            issuer,
            audience,
            leeway: leeway.as_secs(),
            admin_policy,
        }
    }

    pub fn admin_policy(&self) -> &AdminPolicy {
        &self.admin_policy
    }

    pub async fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let header = decode_header(token).map_err(|e| AppError::Auth(e.to_string()))?;

        if header.alg != Algorithm::RS256 {
            return Err(AppError::Auth(format!(
                "Unsupported algorithm: {:?}. Only RS256 is allowed",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| AppError::Auth("Missing kid in token header".to_string()))?;

        let decoding_key = self
            .jwks_client
            .get_key(&kid)
            .await
            .map_err(|e| AppError::Auth(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.leeway = self.leeway;
        validation.validate_nbf = true;

        let token_data = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|e| AppError::Auth(e.to_string()))?;

        user_from_claims(token_data.claims, &self.admin_policy)
    }
}

fn user_from_claims(claims: Claims, policy: &AdminPolicy) -> Result<AuthenticatedUser, AppError> {
    if claims.sub.is_empty() {
        return Err(AppError::Auth("Token has an empty subject".to_string()));
    }

    let roles = policy.roles_for(claims.email.as_deref(), claims.email_verified);

    Ok(AuthenticatedUser {
        uid: claims.sub,
        email: claims.email,
        email_verified: claims.email_verified,
        roles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(sub: &str, email: Option<&str>) -> Claims {
        claims_with(sub, email, true)
    }

    fn claims_with(sub: &str, email: Option<&str>, email_verified: bool) -> Claims {
        serde_json::from_value(serde_json::json!({
            "sub": sub,
            "iss": "https://securetoken.google.com/demo",
            "aud": "demo",
            "exp": 4_102_444_800u64,
            "email": email,
            "email_verified": email_verified,
        }))
        .unwrap()
    }

    #[test]
    fn test_user_from_claims_grants_admin_to_listed_email() {
        let policy = AdminPolicy::new(&["curator@example.com".to_string()]);
        let user = user_from_claims(claims("uid-1", Some("curator@example.com")), &policy).unwrap();
        assert_eq!(user.uid, "uid-1");
        assert!(user.email_verified);
        assert!(user.is_admin());
    }

    #[test]
    fn test_user_from_claims_without_admin_role() {
        let policy = AdminPolicy::new(&["curator@example.com".to_string()]);
        let user = user_from_claims(claims("uid-2", Some("guest@example.com")), &policy).unwrap();
        assert!(!user.is_admin());
    }

    #[test]
    fn test_user_from_claims_ignores_unverified_listed_email() {
        let policy = AdminPolicy::new(&["curator@example.com".to_string()]);
        let user = user_from_claims(
            claims_with("uid-3", Some("curator@example.com"), false),
            &policy,
        )
        .unwrap();
        assert!(!user.email_verified);
        assert!(user.roles.is_empty());
    }

    #[test]
    fn test_user_from_claims_rejects_empty_subject() {
        let result = user_from_claims(claims("", None), &AdminPolicy::default());
        assert!(matches!(result, Err(AppError::Auth(_))));
    }

    #[tokio::test]
    async fn test_validate_token_rejects_garbage() {
        let validator = JwtValidator::new(
            Arc::new(JwksClient::new(
                "http://127.0.0.1:9/jwks",
                Duration::from_secs(60),
            )),
            "https://securetoken.google.com/demo".to_string(),
            "demo".to_string(),
            Duration::from_secs(60),
            AdminPolicy::default(),
        );

        let result = validator.validate_token("not-a-jwt").await;
        assert!(matches!(result, Err(AppError::Auth(_))));
    }
}
