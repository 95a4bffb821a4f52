//! Session resolution: request headers in, authenticated user (or none) out.

use axum::http::HeaderMap;
use tracing::{debug, warn};

use super::cookies::{access_token, refresh_token};
use crate::common::{AuthUser, UserId};
use crate::domains::auth::types::SessionTokens;
use crate::kernel::BaseAuthProvider;

/// Outcome of resolving a request's session. Never an error: anything that
/// goes wrong folds into "no user".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedSession {
    pub user: Option<AuthUser>,
    /// Token `user` was authenticated with; the refreshed one after a refresh.
    pub access_token: Option<String>,
    /// New tokens when the session was refreshed; the caller must hand them
    /// back to the browser.
    pub refreshed: Option<SessionTokens>,
}

impl ResolvedSession {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user.as_ref().map(|u| u.user_id)
    }
}

pub async fn resolve_session(headers: &HeaderMap, auth: &dyn BaseAuthProvider) -> ResolvedSession {
    if let Some(token) = access_token(headers) {
        match auth.validate_session(&token).await {
            Ok(Some(user)) => {
                return ResolvedSession {
                    user: Some(user),
                    access_token: Some(token),
                    refreshed: None,
                }
            }
            Ok(None) => debug!("Access token not accepted"),
            Err(e) => {
                warn!(error = %e, "Session validation failed; treating request as anonymous");
                return ResolvedSession::anonymous();
            }
        }
    }

    match refresh_token(headers) {
        Some(refresh) => refresh_session(&refresh, auth).await,
        None => ResolvedSession::anonymous(),
    }
}

/// One refresh attempt. The new access token is validated like any other.
async fn refresh_session(refresh: &str, auth: &dyn BaseAuthProvider) -> ResolvedSession {
    let session = match auth.refresh_session(refresh).await {
        Ok(session) => session,
        Err(e) if e.is_rejected() => {
            debug!(error = %e, "Refresh token not accepted");
            return ResolvedSession::anonymous();
        }
        Err(e) => {
            warn!(error = %e, "Session refresh failed; treating request as anonymous");
            return ResolvedSession::anonymous();
        }
    };

    match auth.validate_session(&session.tokens.access_token).await {
        Ok(Some(user)) => {
            debug!(user_id = %user.user_id, "Session refreshed");
            ResolvedSession {
                user: Some(user),
                access_token: Some(session.tokens.access_token.clone()),
                refreshed: Some(session.tokens),
            }
        }
        Ok(None) => ResolvedSession::anonymous(),
        Err(e) => {
            warn!(error = %e, "Validating refreshed session failed");
            ResolvedSession::anonymous()
        }
    }
}
