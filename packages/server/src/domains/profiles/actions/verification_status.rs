//! Pending-review status query

use crate::common::{AppError, UserId};
use crate::domains::profiles::models::Profile;
use crate::kernel::ServerDeps;

#[derive(Debug, Clone, PartialEq)]
pub enum VerificationStatus {
    /// Review is done; the seller belongs on their dashboard.
    Verified,
    Pending(Profile),
}

pub async fn verification_status(
    user_id: UserId,
    deps: &ServerDeps,
) -> Result<VerificationStatus, AppError> {
    let profile = deps
        .profiles
        .get_profile(user_id)
        .await?
        .ok_or(AppError::ProfileMissing)?;

    if profile.is_verified {
        Ok(VerificationStatus::Verified)
    } else {
        Ok(VerificationStatus::Pending(profile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::profiles::models::Role;
    use crate::kernel::{InMemoryProfileStore, TestDependencies};

    #[tokio::test]
    async fn test_status_follows_flag() {
        let pending_id = UserId::new();
        let verified_id = UserId::new();
        let pending = Profile::fixture(pending_id, Role::Seller, false);
        let deps = TestDependencies::new()
            .mock_profiles(
                InMemoryProfileStore::new()
                    .with_profile(pending.clone())
                    .with_profile(Profile::fixture(verified_id, Role::Seller, true)),
            )
            .into_server_deps();

        assert_eq!(
            verification_status(pending_id, &deps).await.unwrap(),
            VerificationStatus::Pending(pending)
        );
        assert_eq!(
            verification_status(verified_id, &deps).await.unwrap(),
            VerificationStatus::Verified
        );
    }

    #[tokio::test]
    async fn test_no_profile() {
        let deps = TestDependencies::new().into_server_deps();
        let result = verification_status(UserId::new(), &deps).await;
        assert!(matches!(result, Err(AppError::ProfileMissing)));
    }
}
