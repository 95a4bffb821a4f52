//! Sign-out action

use tracing::{info, warn};

use crate::kernel::ServerDeps;

/// Revoke the session at the provider. Best effort: the caller clears the
/// cookies whatever happens here.
pub async fn sign_out(access_token: Option<&str>, deps: &ServerDeps) {
    let Some(access_token) = access_token else {
        return;
    };

    match deps.auth.sign_out(access_token).await {
        Ok(()) => info!("Signed out"),
        Err(e) => warn!(error = %e, "Provider sign-out failed; clearing local session anyway"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{AuthUser, UserId};
    use crate::kernel::{BaseAuthProvider, TestDependencies};

    #[tokio::test]
    async fn test_sign_out_revokes_token() {
        let test_deps = TestDependencies::new();
        let session = test_deps.auth.session_for(&AuthUser::new(UserId::new()));

        sign_out(Some(&session.tokens.access_token), &test_deps.server_deps()).await;

        assert_eq!(test_deps.auth.signed_out().len(), 1);
        let resolved = test_deps
            .auth
            .validate_session(&session.tokens.access_token)
            .await
            .unwrap();
        assert!(resolved.is_none());
    }

    #[tokio::test]
    async fn test_provider_failure_is_swallowed() {
        let test_deps = TestDependencies::new();
        test_deps.auth.set_unavailable(true);

        sign_out(Some("token"), &test_deps.server_deps()).await;
        assert!(test_deps.auth.signed_out().is_empty());
    }
}
