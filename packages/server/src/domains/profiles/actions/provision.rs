//! Profile provisioning from sign-up metadata

use tracing::{info, warn};

use crate::common::AuthUser;
use crate::domains::access::{dashboard_path, ROLE_SELECTION_PATH};
use crate::domains::profiles::models::NewProfile;
use crate::kernel::{ServerDeps, StoreError};

/// Make sure a freshly signed-in user has a profile and return where they
/// should land.
///
/// - existing profile: that role's dashboard
/// - no profile, role chosen at sign-up: create it, then that dashboard
/// - otherwise, or if anything fails: role selection
///
/// The initial `is_verified` always comes from the role. A verified flag in
/// the metadata is ignored because the client wrote it.
pub async fn provision_from_metadata(user: &AuthUser, deps: &ServerDeps) -> &'static str {
    match deps.profiles.get_profile(user.user_id).await {
        Ok(Some(profile)) => return dashboard_path(profile.role),
        Ok(None) => {}
        Err(e) => {
            warn!(user_id = %user.user_id, error = %e, "Profile lookup failed after sign-in");
            return ROLE_SELECTION_PATH;
        }
    }

    let Some(role) = user.requested_role else {
        return ROLE_SELECTION_PATH;
    };

    match deps
        .profiles
        .insert_profile(NewProfile::for_role(user.user_id, role))
        .await
    {
        Ok(profile) => {
            info!(user_id = %user.user_id, role = %role, "Profile created from sign-up metadata");
            deps.profile_hub.publish(&profile).await;
            dashboard_path(profile.role)
        }
        // Lost a race with another tab; trust whatever was stored
        Err(StoreError::AlreadyExists) => match deps.profiles.get_profile(user.user_id).await {
            Ok(Some(profile)) => dashboard_path(profile.role),
            _ => ROLE_SELECTION_PATH,
        },
        Err(e) => {
            warn!(user_id = %user.user_id, error = %e, "Failed to create profile from metadata");
            ROLE_SELECTION_PATH
        }
    }
}
