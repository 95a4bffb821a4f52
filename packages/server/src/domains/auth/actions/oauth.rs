//! OAuth sign-in and the shared provider callback

use tracing::{info, warn};

use super::register::CALLBACK_PATH;
use crate::common::{AppError, ValidationErrors};
use crate::domains::access::LOGIN_PATH;
use crate::domains::auth::pkce::PkceChallenge;
use crate::domains::auth::types::AuthSession;
use crate::domains::profiles::actions::provision_from_metadata;
use crate::kernel::ServerDeps;

/// Third-party identity providers enabled on the hosted project.
pub const SUPPORTED_OAUTH_PROVIDERS: &[&str] = &["google"];

#[derive(Debug, Clone)]
pub struct OAuthStart {
    pub authorize_url: String,
    /// Kept by the browser in an http-only cookie until the callback.
    pub code_verifier: String,
}

pub fn start_oauth(provider: &str, deps: &ServerDeps) -> Result<OAuthStart, AppError> {
    if !SUPPORTED_OAUTH_PROVIDERS.contains(&provider) {
        let mut errors = ValidationErrors::new();
        errors.add("provider", "Unsupported sign-in provider");
        return Err(errors.into());
    }

    let pkce = PkceChallenge::generate();
    let authorize_url =
        deps.auth
            .authorize_url(provider, &deps.site_path(CALLBACK_PATH), &pkce.challenge)?;

    Ok(OAuthStart {
        authorize_url,
        code_verifier: pkce.verifier,
    })
}

/// Result of the provider redirecting back to us. There is no error case:
/// every failure becomes a navigation.
#[derive(Debug, Clone)]
pub struct CallbackOutcome {
    pub session: Option<AuthSession>,
    pub next: &'static str,
}

impl CallbackOutcome {
    fn failed() -> Self {
        Self {
            session: None,
            next: LOGIN_PATH,
        }
    }
}

/// Exchange the authorization code and make sure the user has a profile.
///
/// Missing code, missing verifier or a failed exchange send the user back to
/// login. After a successful exchange the landing follows
/// `provision_from_metadata`.
pub async fn complete_callback(
    code: Option<&str>,
    code_verifier: Option<&str>,
    deps: &ServerDeps,
) -> CallbackOutcome {
    let (Some(code), Some(code_verifier)) = (code, code_verifier) else {
        warn!("Auth callback without code or verifier");
        return CallbackOutcome::failed();
    };

    let session = match deps.auth.exchange_code(code, code_verifier).await {
        Ok(session) => session,
        Err(e) => {
            warn!(error = %e, "Authorization code exchange failed");
            return CallbackOutcome::failed();
        }
    };

    let next = provision_from_metadata(&session.user, deps).await;
    info!(user_id = %session.user.user_id, next, "Auth callback completed");

    CallbackOutcome {
        session: Some(session),
        next,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{AuthUser, UserId};
    use crate::domains::profiles::models::{Profile, Role};
    use crate::kernel::{InMemoryProfileStore, MockAuthProvider, TestDependencies};

    #[test]
    fn test_start_oauth_for_google() {
        let deps = TestDependencies::new().into_server_deps();
        let start = start_oauth("google", &deps).unwrap();

        assert!(start.authorize_url.contains("provider=google"));
        assert!(start
            .authorize_url
            .contains(&crate::domains::auth::pkce::challenge_for(&start.code_verifier)));
    }

    #[test]
    fn test_unknown_provider_is_a_validation_error() {
        let deps = TestDependencies::new().into_server_deps();
        let result = start_oauth("myspace", &deps);
        assert!(matches!(result, Err(AppError::ValidationFailed(e)) if e.has_field("provider")));
    }

    #[tokio::test]
    async fn test_missing_code_goes_to_login() {
        let deps = TestDependencies::new().into_server_deps();
        let outcome = complete_callback(None, Some("verifier"), &deps).await;
        assert!(outcome.session.is_none());
        assert_eq!(outcome.next, "/auth/login");
    }

    #[tokio::test]
    async fn test_failed_exchange_goes_to_login() {
        let deps = TestDependencies::new().into_server_deps();
        let outcome = complete_callback(Some("stale-code"), Some("verifier"), &deps).await;
        assert!(outcome.session.is_none());
        assert_eq!(outcome.next, "/auth/login");
    }

    #[tokio::test]
    async fn test_existing_profile_goes_to_dashboard() {
        let user = AuthUser::new(UserId::new());
        let deps = TestDependencies::new()
            .mock_auth(MockAuthProvider::new().with_authorization_code("code-1", user.clone()))
            .mock_profiles(
                InMemoryProfileStore::new()
                    .with_profile(Profile::fixture(user.user_id, Role::Seller, true)),
            )
            .into_server_deps();

        let outcome = complete_callback(Some("code-1"), Some("verifier"), &deps).await;
        assert_eq!(outcome.next, "/seller/dashboard");
        assert_eq!(outcome.session.unwrap().user, user);
    }

    #[tokio::test]
    async fn test_new_user_with_metadata_role_is_provisioned() {
        let user = AuthUser::new(UserId::new()).with_requested_role(Role::Buyer);
        let test_deps = TestDependencies::new()
            .mock_auth(MockAuthProvider::new().with_authorization_code("code-1", user.clone()));

        let outcome = complete_callback(Some("code-1"), Some("verifier"), &test_deps.server_deps()).await;

        assert_eq!(outcome.next, "/buyer/dashboard");
        assert!(test_deps.profiles.profile(user.user_id).is_some());
    }

    #[tokio::test]
    async fn test_new_user_without_role_goes_to_role_selection() {
        let user = AuthUser::new(UserId::new());
        let deps = TestDependencies::new()
            .mock_auth(MockAuthProvider::new().with_authorization_code("code-1", user))
            .into_server_deps();

        let outcome = complete_callback(Some("code-1"), Some("verifier"), &deps).await;
        assert!(outcome.session.is_some());
        assert_eq!(outcome.next, "/auth/role");
    }
}
