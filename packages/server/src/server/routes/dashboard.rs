use axum::{response::Redirect, Json};
use serde_json::json;

use crate::domains::access::dashboard_path;
use crate::server::middleware::CurrentProfile;

/// `/dashboard` forwards to the role's own dashboard.
pub async fn dashboard_handler(CurrentProfile(profile): CurrentProfile) -> Redirect {
    Redirect::temporary(dashboard_path(profile.role))
}

/// The guard has already matched role and section by the time these run.
pub async fn buyer_dashboard_handler(
    CurrentProfile(profile): CurrentProfile,
) -> Json<serde_json::Value> {
    Json(json!({ "page": "buyer_dashboard", "profile": profile }))
}

pub async fn seller_dashboard_handler(
    CurrentProfile(profile): CurrentProfile,
) -> Json<serde_json::Value> {
    Json(json!({ "page": "seller_dashboard", "profile": profile }))
}
