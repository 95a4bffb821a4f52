use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::common::{AuthProviderError, ValidationErrors};
use crate::domains::access::{LOGIN_PATH, ROLE_SELECTION_PATH};
use crate::kernel::StoreError;

/// Errors surfaced by handlers and actions.
///
/// `AuthenticationAbsent` and `ProfileMissing` are navigation outcomes, not
/// user-facing failures: they render as silent redirects. The remaining
/// variants render an inline JSON message so the form can be retried.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication required")]
    AuthenticationAbsent,

    #[error("Profile required")]
    ProfileMissing,

    #[error("Validation failed: {0}")]
    ValidationFailed(ValidationErrors),

    #[error("A profile already exists for this account")]
    ProfileExists,

    #[error("{0}")]
    AuthRejected(String),

    #[error("Backend unavailable: {0}")]
    BackendUnavailable(#[source] anyhow::Error),
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::ValidationFailed(errors)
    }
}

impl From<AuthProviderError> for AppError {
    fn from(err: AuthProviderError) -> Self {
        match err {
            AuthProviderError::Rejected { message, .. } => AppError::AuthRejected(message),
            AuthProviderError::Unavailable(e) => AppError::BackendUnavailable(e),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AlreadyExists => AppError::ProfileExists,
            StoreError::NotFound => AppError::ProfileMissing,
            StoreError::Backend(e) => AppError::BackendUnavailable(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::AuthenticationAbsent => Redirect::to(LOGIN_PATH).into_response(),
            AppError::ProfileMissing => Redirect::to(ROLE_SELECTION_PATH).into_response(),
            AppError::ValidationFailed(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": "Validation failed", "fields": errors })),
            )
                .into_response(),
            AppError::ProfileExists => (
                StatusCode::CONFLICT,
                Json(json!({ "error": AppError::ProfileExists.to_string() })),
            )
                .into_response(),
            AppError::AuthRejected(message) => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": message })),
            )
                .into_response(),
            AppError::BackendUnavailable(e) => {
                tracing::error!(error = %e, "Backend call failed");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({ "error": "Service temporarily unavailable, please retry" })),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::LOCATION;

    #[test]
    fn test_absent_session_is_a_silent_redirect() {
        let response = AppError::AuthenticationAbsent.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/auth/login");
    }

    #[test]
    fn test_missing_profile_redirects_to_role_selection() {
        let response = AppError::ProfileMissing.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/auth/role");
    }

    #[test]
    fn test_validation_is_inline() {
        let mut errors = ValidationErrors::new();
        errors.add("email", "Invalid email address");
        let response = AppError::from(errors).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(response.headers().get(LOCATION).is_none());
    }

    #[test]
    fn test_store_errors_map_to_taxonomy() {
        assert!(matches!(
            AppError::from(StoreError::AlreadyExists),
            AppError::ProfileExists
        ));
        assert!(matches!(
            AppError::from(StoreError::NotFound),
            AppError::ProfileMissing
        ));
        assert!(matches!(
            AppError::from(StoreError::Backend(anyhow::anyhow!("pool timed out"))),
            AppError::BackendUnavailable(_)
        ));
    }

    #[test]
    fn test_provider_errors_map_to_taxonomy() {
        let rejected = AuthProviderError::rejected("Token has expired or is invalid", 403);
        assert!(matches!(AppError::from(rejected), AppError::AuthRejected(m) if m.contains("expired")));

        let down = AuthProviderError::Unavailable(anyhow::anyhow!("dns failure"));
        let response = AppError::from(down).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
