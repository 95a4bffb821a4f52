use axum::{
    async_trait,
    extract::{Extension, FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

use super::CurrentUser;
use crate::common::AppError;
use crate::domains::access::{decide, Decision};
use crate::domains::profiles::models::Profile;
use crate::kernel::ServerDeps;

/// Profile of the current user, inserted by `access_guard_middleware` when
/// the navigation is allowed and a profile exists.
#[derive(Clone, Debug)]
pub struct CurrentProfile(pub Profile);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentProfile {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentProfile>()
            .cloned()
            .ok_or(AppError::ProfileMissing)
    }
}

/// Route access guard
///
/// Looks up the signed-in user's profile and runs the access policy for the
/// requested path. Redirect decisions answer `307 Temporary Redirect` without
/// reaching the handler. A failing profile store answers 503 rather than
/// being mistaken for "no profile".
pub async fn access_guard_middleware(
    Extension(deps): Extension<ServerDeps>,
    mut request: Request,
    next: Next,
) -> Response {
    let user_id = request
        .extensions()
        .get::<CurrentUser>()
        .map(|user| user.0.user_id);

    let profile = match user_id {
        Some(user_id) => match deps.profiles.get_profile(user_id).await {
            Ok(profile) => profile,
            Err(e) => return AppError::from(e).into_response(),
        },
        None => None,
    };

    let path = request.uri().path().to_owned();
    match decide(&path, user_id, profile.as_ref()) {
        Decision::Allow => {
            if let Some(profile) = profile {
                request.extensions_mut().insert(CurrentProfile(profile));
            }
            next.run(request).await
        }
        Decision::RedirectTo(target) => {
            debug!(path = %path, target, "Access guard redirect");
            Redirect::temporary(target).into_response()
        }
    }
}
