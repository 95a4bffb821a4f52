//! Password sign-in action

use tracing::info;

use crate::common::{AppError, UserId};
use crate::domains::access::{dashboard_path, ROLE_SELECTION_PATH};
use crate::domains::auth::models::LoginForm;
use crate::domains::auth::types::AuthSession;
use crate::kernel::ServerDeps;

/// A new session and where to send the user with it.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub session: AuthSession,
    pub next: &'static str,
}

/// The user's dashboard, or role selection when they have no profile yet.
pub(super) async fn landing_path(
    user_id: UserId,
    deps: &ServerDeps,
) -> Result<&'static str, AppError> {
    Ok(match deps.profiles.get_profile(user_id).await? {
        Some(profile) => dashboard_path(profile.role),
        None => ROLE_SELECTION_PATH,
    })
}

pub async fn sign_in_with_password(
    form: LoginForm,
    deps: &ServerDeps,
) -> Result<SignedIn, AppError> {
    form.validate()?;

    let session = deps
        .auth
        .sign_in_with_password(&form.email, &form.password)
        .await?;
    let next = landing_path(session.user.user_id, deps).await?;

    info!(user_id = %session.user.user_id, "Signed in with password");
    Ok(SignedIn { session, next })
}
