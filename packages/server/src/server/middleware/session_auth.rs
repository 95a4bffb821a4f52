use axum::{
    async_trait,
    extract::{Extension, FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::common::{AppError, AuthUser};
use crate::kernel::ServerDeps;
use crate::server::auth::cookies::{
    append_cookies, session_cookies, sets_cookie, ACCESS_TOKEN_COOKIE,
};
use crate::server::auth::resolve_session;

/// Signed-in user for this request, inserted by `session_auth_middleware`.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthUser);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AppError::AuthenticationAbsent)
    }
}

/// Access token the current user is authenticated with. After a refresh this
/// is the new token, not the one the request carried.
#[derive(Clone, Debug)]
pub struct CurrentAccessToken(pub String);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentAccessToken {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentAccessToken>()
            .cloned()
            .ok_or(AppError::AuthenticationAbsent)
    }
}

/// Middleware to resolve the session and populate the current user
///
/// This middleware:
/// 1. Reads the access token from the Authorization header or session cookie
/// 2. Validates it with the auth provider, refreshing once if needed
/// 3. Stores CurrentUser and CurrentAccessToken in request extensions
/// 4. Writes refreshed tokens back as cookies
///
/// Note: This middleware does NOT block requests - it only extracts auth info.
/// Access decisions happen in `access_guard_middleware`.
pub async fn session_auth_middleware(
    Extension(deps): Extension<ServerDeps>,
    mut request: Request,
    next: Next,
) -> Response {
    let resolved = resolve_session(request.headers(), deps.auth.as_ref()).await;

    match (&resolved.user, &resolved.access_token) {
        (Some(user), Some(token)) => {
            debug!(user_id = %user.user_id, "Authenticated request");
            request.extensions_mut().insert(CurrentUser(user.clone()));
            request
                .extensions_mut()
                .insert(CurrentAccessToken(token.clone()));
        }
        _ => debug!("No valid session"),
    }

    let mut response = next.run(request).await;

    // A handler that set its own session cookies (sign-in, sign-out) wins
    if let Some(tokens) = resolved.refreshed {
        if !sets_cookie(response.headers(), ACCESS_TOKEN_COOKIE) {
            append_cookies(
                response.headers_mut(),
                session_cookies(&tokens, deps.secure_cookies),
            );
        }
    }

    response
}
