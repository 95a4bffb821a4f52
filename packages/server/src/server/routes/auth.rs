//! Sign-in, registration, role selection and sign-out handlers.
//!
//! Form posts answer `303 See Other` to the next page with session cookies
//! attached. Validation and provider errors render inline as JSON.

use axum::{
    extract::{Extension, Path, Query},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::common::AppError;
use crate::domains::access::LOGIN_PATH;
use crate::domains::auth::actions::{self, Registered, SignedIn, SUPPORTED_OAUTH_PROVIDERS};
use crate::domains::auth::models::{
    LoginForm, PhoneOtpRequest, PhoneOtpVerification, RegistrationForm,
};
use crate::domains::profiles::actions::select_role;
use crate::domains::profiles::models::Role;
use crate::kernel::ServerDeps;
use crate::server::auth::cookies::{
    append_cookies, clear_cookie, clear_session_cookies, code_verifier_cookie,
    read_cookie, session_cookies, CODE_VERIFIER_COOKIE,
};
use crate::server::middleware::{CurrentAccessToken, CurrentProfile, CurrentUser};

const ROLES: [Role; 2] = [Role::Buyer, Role::Seller];

/// 303 to `target`, setting `cookies` on the way.
fn see_other_with_cookies(target: &str, cookies: Vec<String>) -> Response {
    let mut response = Redirect::to(target).into_response();
    append_cookies(response.headers_mut(), cookies);
    response
}

fn signed_in_response(signed_in: SignedIn, deps: &ServerDeps) -> Response {
    see_other_with_cookies(
        signed_in.next,
        session_cookies(&signed_in.session.tokens, deps.secure_cookies),
    )
}

pub async fn login_page() -> Json<serde_json::Value> {
    Json(json!({ "page": "login", "oauth_providers": SUPPORTED_OAUTH_PROVIDERS }))
}

pub async fn login_handler(
    Extension(deps): Extension<ServerDeps>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let signed_in = actions::sign_in_with_password(form, &deps).await?;
    Ok(signed_in_response(signed_in, &deps))
}

pub async fn register_page() -> Json<serde_json::Value> {
    Json(json!({ "page": "register", "roles": ROLES }))
}

pub async fn register_handler(
    Extension(deps): Extension<ServerDeps>,
    Form(form): Form<RegistrationForm>,
) -> Result<Response, AppError> {
    match actions::register(form, &deps).await? {
        Registered::ConfirmationSent { code_verifier } => {
            let mut response = Json(json!({ "status": "confirmation_sent" })).into_response();
            append_cookies(
                response.headers_mut(),
                [code_verifier_cookie(&code_verifier, deps.secure_cookies)],
            );
            Ok(response)
        }
        Registered::SignedIn(signed_in) => Ok(signed_in_response(signed_in, &deps)),
    }
}

pub async fn phone_otp_handler(
    Extension(deps): Extension<ServerDeps>,
    Form(form): Form<PhoneOtpRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    actions::send_phone_otp(form, &deps).await?;
    Ok(Json(json!({ "status": "code_sent" })))
}

pub async fn phone_verify_handler(
    Extension(deps): Extension<ServerDeps>,
    Form(form): Form<PhoneOtpVerification>,
) -> Result<Response, AppError> {
    let signed_in = actions::verify_phone_otp(form, &deps).await?;
    Ok(signed_in_response(signed_in, &deps))
}

pub async fn oauth_handler(
    Extension(deps): Extension<ServerDeps>,
    Path(provider): Path<String>,
) -> Result<Response, AppError> {
    let start = actions::start_oauth(&provider, &deps)?;
    Ok(see_other_with_cookies(
        &start.authorize_url,
        vec![code_verifier_cookie(&start.code_verifier, deps.secure_cookies)],
    ))
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    /// Set by the provider when the user declined or the flow broke
    error_description: Option<String>,
}

pub async fn callback_handler(
    Extension(deps): Extension<ServerDeps>,
    Query(query): Query<CallbackQuery>,
    headers: HeaderMap,
) -> Response {
    if let Some(description) = &query.error_description {
        debug!(error = %description, "Provider returned an error to the callback");
    }

    let verifier = read_cookie(&headers, CODE_VERIFIER_COOKIE);
    let outcome =
        actions::complete_callback(query.code.as_deref(), verifier.as_deref(), &deps).await;

    let mut cookies = vec![clear_cookie(CODE_VERIFIER_COOKIE, deps.secure_cookies)];
    if let Some(session) = &outcome.session {
        cookies.extend(session_cookies(&session.tokens, deps.secure_cookies));
    }
    see_other_with_cookies(outcome.next, cookies)
}

/// Role selection page. Reachable with a profile too; the form then fails
/// with 409.
pub async fn role_page(
    CurrentUser(user): CurrentUser,
    profile: Option<CurrentProfile>,
) -> Json<serde_json::Value> {
    Json(json!({
        "page": "role_selection",
        "user_id": user.user_id,
        "roles": ROLES,
        "profile": profile.map(|p| p.0),
    }))
}

#[derive(Debug, Deserialize)]
pub struct RoleForm {
    role: Role,
}

pub async fn select_role_handler(
    Extension(deps): Extension<ServerDeps>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<RoleForm>,
) -> Result<Redirect, AppError> {
    let selected = select_role(user.user_id, form.role, &deps).await?;
    Ok(Redirect::to(selected.next))
}

/// Sign out: resolves the session but is not guarded, so it works in any
/// profile state. Revokes the token the session resolved to, which is the
/// refreshed one when the request's own token had expired.
pub async fn sign_out_handler(
    Extension(deps): Extension<ServerDeps>,
    token: Option<CurrentAccessToken>,
) -> Response {
    let token = token.map(|CurrentAccessToken(token)| token);
    actions::sign_out(token.as_deref(), &deps).await;
    see_other_with_cookies(LOGIN_PATH, clear_session_cookies(deps.secure_cookies))
}
