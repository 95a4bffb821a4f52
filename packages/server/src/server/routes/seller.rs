//! Seller verification handlers.

use axum::{
    extract::Extension,
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use serde_json::json;

use crate::common::AppError;
use crate::domains::access::{PENDING_REVIEW_PATH, SELLER_DASHBOARD_PATH};
use crate::domains::profiles::actions::{
    submit_verification, verification_status, VerificationStatus,
};
use crate::domains::profiles::models::{VerificationDetails, VerificationState};
use crate::kernel::ServerDeps;
use crate::server::middleware::{CurrentProfile, CurrentUser};

pub async fn verification_page(
    CurrentProfile(profile): CurrentProfile,
) -> Json<serde_json::Value> {
    Json(json!({
        "page": "seller_verification",
        "state": VerificationState::of(&profile),
        "profile": profile,
    }))
}

pub async fn submit_verification_handler(
    Extension(deps): Extension<ServerDeps>,
    CurrentUser(user): CurrentUser,
    Form(details): Form<VerificationDetails>,
) -> Result<Redirect, AppError> {
    submit_verification(user.user_id, details, &deps).await?;
    Ok(Redirect::to(PENDING_REVIEW_PATH))
}

/// Pending-review page. Live updates come from `/streams/profile`.
pub async fn pending_handler(
    Extension(deps): Extension<ServerDeps>,
    CurrentUser(user): CurrentUser,
) -> Result<Response, AppError> {
    match verification_status(user.user_id, &deps).await? {
        VerificationStatus::Verified => {
            Ok(Redirect::temporary(SELLER_DASHBOARD_PATH).into_response())
        }
        VerificationStatus::Pending(profile) => Ok(Json(json!({
            "page": "seller_pending",
            "state": VerificationState::of(&profile),
            "profile": profile,
        }))
        .into_response()),
    }
}
