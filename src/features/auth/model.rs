use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::constants::ROLE_ADMIN;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Identity provider user id (`sub` claim)
    pub uid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub email_verified: bool,
    pub roles: Vec<String>,
}

impl AuthenticatedUser {
    /// Check if user has a specific role
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Check if user may use the admin panel and admin API
    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }
}

/// Decides which signed-in users receive the admin role.
///
/// An empty allowlist admits every signed-in user. Otherwise the email
/// must be verified by the identity provider and match case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct AdminPolicy {
    emails: Vec<String>,
}

impl AdminPolicy {
    pub fn new(emails: &[String]) -> Self {
        Self {
            emails: emails
                .iter()
                .map(|e| e.trim().to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    /// True when no allowlist is configured
    pub fn allows_everyone(&self) -> bool {
        self.emails.is_empty()
    }

    pub fn roles_for(&self, email: Option<&str>, email_verified: bool) -> Vec<String> {
        let admitted = self.emails.is_empty()
            || email_verified && email.is_some_and(|email| {
                let email = email.trim().to_lowercase();
                self.emails.iter().any(|allowed| *allowed == email)
            });

        if admitted {
            vec![ROLE_ADMIN.to_string()]
        } else {
            Vec::new()
        }
    }
}
