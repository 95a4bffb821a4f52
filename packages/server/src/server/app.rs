//! Application setup and router configuration.

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method, StatusCode,
    },
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::kernel::ServerDeps;
use crate::server::middleware::{access_guard_middleware, session_auth_middleware};
use crate::server::routes::{
    buyer_dashboard_handler, callback_handler, dashboard_handler, health_handler, login_handler,
    login_page, oauth_handler, pending_handler, phone_otp_handler, phone_verify_handler,
    profile_stream_handler, register_handler, register_page, role_page, select_role_handler,
    seller_dashboard_handler, sign_out_handler, submit_verification_handler, verification_page,
};

async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}

/// CORS: any origin when none are configured (development), otherwise the
/// listed origins with credentials so session cookies flow.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        cors.allow_origin(tower_http::cors::Any)
    } else {
        cors.allow_origin(AllowOrigin::list(origins))
            .allow_credentials(true)
    }
}

/// Build the Axum application router
///
/// Every page route, known or not, runs behind the access guard. Sign-out and
/// the profile stream only resolve the session; `/health` does neither.
pub fn build_app(deps: ServerDeps, allowed_origins: &[String]) -> Router {
    let guarded = Router::new()
        .route("/auth/login", get(login_page).post(login_handler))
        .route("/auth/register", get(register_page).post(register_handler))
        .route("/auth/phone", post(phone_otp_handler))
        .route("/auth/phone/verify", post(phone_verify_handler))
        .route("/auth/oauth/:provider", get(oauth_handler))
        .route("/auth/callback", get(callback_handler))
        .route("/auth/role", get(role_page).post(select_role_handler))
        .route("/dashboard", get(dashboard_handler))
        .route("/buyer/dashboard", get(buyer_dashboard_handler))
        .route("/seller/dashboard", get(seller_dashboard_handler))
        .route(
            "/seller/verification",
            get(verification_page).post(submit_verification_handler),
        )
        .route("/seller/pending", get(pending_handler))
        .fallback(not_found)
        .layer(middleware::from_fn(access_guard_middleware));

    Router::new()
        .merge(guarded)
        .route("/auth/signout", post(sign_out_handler))
        .route("/streams/profile", get(profile_stream_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(session_auth_middleware))
        .route("/health", get(health_handler))
        .layer(Extension(deps)) // Must wrap every middleware that reads it
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}
