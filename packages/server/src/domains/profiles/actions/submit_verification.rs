//! Submit seller verification details action

use tracing::info;

use crate::common::{AppError, UserId, ValidationErrors};
use crate::domains::profiles::models::{Profile, Role, VerificationDetails};
use crate::kernel::ServerDeps;

/// Attach business details to a seller's profile and put it into review.
///
/// Input is validated before the store is touched. Resubmitting is allowed
/// and always resets `is_verified` to false.
pub async fn submit_verification(
    user_id: UserId,
    details: VerificationDetails,
    deps: &ServerDeps,
) -> Result<Profile, AppError> {
    details.validate()?;

    let current = deps
        .profiles
        .get_profile(user_id)
        .await?
        .ok_or(AppError::ProfileMissing)?;

    if current.role != Role::Seller {
        let mut errors = ValidationErrors::new();
        errors.add("role", "Only sellers can submit verification details");
        return Err(errors.into());
    }

    let profile = deps
        .profiles
        .update_profile(user_id, details.into_update())
        .await?;

    info!(user_id = %user_id, "Seller verification submitted");
    deps.profile_hub.publish(&profile).await;

    Ok(profile)
}
