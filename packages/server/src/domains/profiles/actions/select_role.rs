//! Select role action

use tracing::info;

use crate::common::{AppError, UserId};
use crate::domains::access::{BUYER_DASHBOARD_PATH, VERIFICATION_PATH};
use crate::domains::profiles::models::{NewProfile, Profile, Role};
use crate::kernel::ServerDeps;

#[derive(Debug, Clone)]
pub struct RoleSelected {
    pub profile: Profile,
    /// Buyers go straight to their dashboard, sellers on to verification.
    pub next: &'static str,
}

/// Create the user's profile with the chosen role.
///
/// A role can only be chosen once: a second call fails with `ProfileExists`
/// and leaves the stored profile untouched.
pub async fn select_role(
    user_id: UserId,
    role: Role,
    deps: &ServerDeps,
) -> Result<RoleSelected, AppError> {
    let profile = deps
        .profiles
        .insert_profile(NewProfile::for_role(user_id, role))
        .await?;

    info!(user_id = %user_id, role = %role, "Profile created");
    deps.profile_hub.publish(&profile).await;

    let next = match role {
        Role::Buyer => BUYER_DASHBOARD_PATH,
        Role::Seller => VERIFICATION_PATH,
    };
    Ok(RoleSelected { profile, next })
}
