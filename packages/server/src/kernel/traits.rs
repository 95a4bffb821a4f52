// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Access decisions and profile flows are domain functions that use these traits.
//
// Naming convention: Base* for trait names (e.g., BaseAuthProvider, BaseProfileStore)

use async_trait::async_trait;
use thiserror::Error;

use crate::common::{AuthProviderError, AuthUser, UserId};
use crate::domains::auth::types::{AuthSession, SignUpOutcome, SignUpRequest};
use crate::domains::profiles::models::{NewProfile, Profile, ProfileUpdate};

// =============================================================================
// Auth Provider Trait (Infrastructure - hosted identity service)
// =============================================================================

#[async_trait]
pub trait BaseAuthProvider: Send + Sync {
    /// Validate an access token. `Ok(None)` means the provider does not
    /// recognise it (expired, revoked, malformed).
    async fn validate_session(
        &self,
        access_token: &str,
    ) -> Result<Option<AuthUser>, AuthProviderError>;

    /// Trade a refresh token for a new session.
    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, AuthProviderError>;

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthProviderError>;

    async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpOutcome, AuthProviderError>;

    /// Send a one-time SMS code to an E.164 phone number
    async fn send_phone_otp(&self, phone: &str) -> Result<(), AuthProviderError>;

    async fn verify_phone_otp(
        &self,
        phone: &str,
        token: &str,
    ) -> Result<AuthSession, AuthProviderError>;

    /// URL to send the browser to for a third-party OAuth sign-in.
    fn authorize_url(
        &self,
        provider: &str,
        redirect_to: &str,
        code_challenge: &str,
    ) -> Result<String, AuthProviderError>;

    /// Exchange a PKCE authorization code (OAuth or e-mail confirmation).
    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<AuthSession, AuthProviderError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthProviderError>;
}

// =============================================================================
// Profile Store Trait (Infrastructure - persistence)
// =============================================================================

/// Failures reported by a profile store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Profile already exists")]
    AlreadyExists,

    #[error("Profile not found")]
    NotFound,

    #[error("Profile store error: {0}")]
    Backend(#[from] anyhow::Error),
}

#[async_trait]
pub trait BaseProfileStore: Send + Sync {
    async fn get_profile(&self, user_id: UserId) -> Result<Option<Profile>, StoreError>;

    /// Insert a profile. Returns `AlreadyExists` if the user has one.
    async fn insert_profile(&self, new: NewProfile) -> Result<Profile, StoreError>;

    /// Apply a partial update. Returns `NotFound` if the user has no profile.
    async fn update_profile(
        &self,
        user_id: UserId,
        update: ProfileUpdate,
    ) -> Result<Profile, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
