//! Auth domain data types
//!
//! Simple, serializable types exchanged with the hosted auth provider.

use serde::{Deserialize, Serialize};

use crate::common::{AuthUser, UserId};
use crate::domains::profiles::models::Role;

/// Token pair issued by the auth provider for one browser session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

/// A freshly issued session and the principal it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSession {
    pub tokens: SessionTokens,
    pub user: AuthUser,
}

/// Metadata attached to the principal at sign-up.
///
/// Stored by the provider as free-form JSON, so every field is optional and
/// unknown roles are ignored rather than rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,
}

impl UserMetadata {
    pub fn for_role(role: Role) -> Self {
        Self {
            role: Some(role.as_str().to_string()),
            is_verified: Some(role.initially_verified()),
        }
    }

    pub fn into_auth_user(
        self,
        user_id: UserId,
        email: Option<String>,
        phone: Option<String>,
    ) -> AuthUser {
        AuthUser {
            user_id,
            email: email.filter(|e| !e.is_empty()),
            phone: phone.filter(|p| !p.is_empty()),
            requested_role: self.role.as_deref().and_then(|r| r.parse().ok()),
            requested_verified: self.is_verified,
        }
    }
}

/// Everything the provider needs to create an e-mail/password account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
    /// Where the confirmation e-mail link lands (our `/auth/callback`).
    pub redirect_to: String,
    pub code_challenge: String,
}

/// Result of a sign-up call.
#[derive(Debug, Clone, PartialEq)]
pub enum SignUpOutcome {
    /// Account created; the user must confirm their e-mail first.
    ConfirmationSent,
    /// Provider has confirmations disabled and signed the user in directly.
    SignedIn(AuthSession),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_for_role() {
        let buyer = UserMetadata::for_role(Role::Buyer);
        assert_eq!(buyer.role.as_deref(), Some("buyer"));
        assert_eq!(buyer.is_verified, Some(true));

        let seller = UserMetadata::for_role(Role::Seller);
        assert_eq!(seller.is_verified, Some(false));
    }

    #[test]
    fn test_unknown_metadata_role_is_ignored() {
        let metadata: UserMetadata =
            serde_json::from_value(serde_json::json!({"role": "admin", "is_verified": true}))
                .unwrap();
        let user = metadata.into_auth_user(UserId::new(), Some(String::new()), None);
        assert_eq!(user.requested_role, None);
        assert_eq!(user.requested_verified, Some(true));
        assert_eq!(user.email, None);
    }

    #[test]
    fn test_missing_metadata_fields_default() {
        let metadata: UserMetadata = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(metadata, UserMetadata::default());
    }
}
