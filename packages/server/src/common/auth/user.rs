use serde::{Deserialize, Serialize};

use crate::common::UserId;
use crate::domains::profiles::models::Role;

/// Authenticated principal resolved from a valid session.
///
/// `requested_role` and `requested_verified` come from the metadata attached
/// at sign-up. They are hints for profile provisioning only; access decisions
/// always read the stored Profile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: UserId,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub requested_role: Option<Role>,
    pub requested_verified: Option<bool>,
}

impl AuthUser {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            email: None,
            phone: None,
            requested_role: None,
            requested_verified: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_requested_role(mut self, role: Role) -> Self {
        self.requested_role = Some(role);
        self
    }
}
