// TestDependencies - mock implementations for testing
//
// Provides in-memory collaborators that can be injected into ServerDeps for
// unit tests and router-level integration tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use super::{BaseAuthProvider, BaseProfileStore, ProfileHub, ServerDeps, StoreError};
use crate::common::{AuthProviderError, AuthUser, UserId};
use crate::domains::auth::jwt::JwtService;
use crate::domains::auth::types::{AuthSession, SessionTokens, SignUpOutcome, SignUpRequest};
use crate::domains::profiles::models::{NewProfile, Profile, ProfileUpdate};

/// Secret the mock provider signs its access tokens with.
pub const MOCK_JWT_SECRET: &str = "mock-auth-provider-secret";

/// The only SMS code the mock provider accepts.
pub const MOCK_OTP_CODE: &str = "123456";

const ACCESS_TOKEN_TTL: i64 = 3600;

// =============================================================================
// Mock Auth Provider
// =============================================================================

#[derive(Default)]
struct MockAuthState {
    passwords: HashMap<String, (String, AuthUser)>,
    phone_users: HashMap<String, AuthUser>,
    auth_codes: HashMap<String, AuthUser>,
    refresh_tokens: HashMap<String, AuthUser>,
    revoked: HashSet<String>,
    sign_ups: Vec<SignUpRequest>,
    otp_sent_to: Vec<String>,
    signed_out: Vec<String>,
}

/// Hosted auth provider double. Issues real HS256 tokens so the same access
/// token works against `validate_session` and `JwtService`.
pub struct MockAuthProvider {
    jwt: JwtService,
    state: Mutex<MockAuthState>,
    unavailable: AtomicBool,
    auto_confirm: AtomicBool,
}

impl MockAuthProvider {
    pub fn new() -> Self {
        Self {
            jwt: JwtService::new(MOCK_JWT_SECRET),
            state: Mutex::new(MockAuthState::default()),
            unavailable: AtomicBool::new(false),
            auto_confirm: AtomicBool::new(false),
        }
    }

    /// Register an e-mail/password account.
    pub fn with_account(self, email: &str, password: &str, user: AuthUser) -> Self {
        self.state
            .lock()
            .unwrap()
            .passwords
            .insert(email.to_string(), (password.to_string(), user));
        self
    }

    /// Register the principal a phone number signs in as.
    pub fn with_phone_user(self, phone: &str, user: AuthUser) -> Self {
        self.state
            .lock()
            .unwrap()
            .phone_users
            .insert(phone.to_string(), user);
        self
    }

    /// Register a one-time authorization code (OAuth or e-mail confirmation).
    pub fn with_authorization_code(self, code: &str, user: AuthUser) -> Self {
        self.state
            .lock()
            .unwrap()
            .auth_codes
            .insert(code.to_string(), user);
        self
    }

    /// Sign-ups return a session immediately instead of a confirmation e-mail.
    pub fn with_auto_confirm(self) -> Self {
        self.auto_confirm.store(true, Ordering::SeqCst);
        self
    }

    /// Simulate an outage: every call fails with `Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Mint a session for `user` as if they had just signed in.
    pub fn session_for(&self, user: &AuthUser) -> AuthSession {
        self.issue_session(user.clone())
    }

    /// Mint an access token that is already expired.
    pub fn expired_token_for(&self, user: &AuthUser) -> String {
        self.jwt
            .create_token(user, -600)
            .expect("mock token signing")
    }

    pub fn sign_ups(&self) -> Vec<SignUpRequest> {
        self.state.lock().unwrap().sign_ups.clone()
    }

    pub fn otp_sent_to(&self) -> Vec<String> {
        self.state.lock().unwrap().otp_sent_to.clone()
    }

    pub fn signed_out(&self) -> Vec<String> {
        self.state.lock().unwrap().signed_out.clone()
    }

    fn check_available(&self) -> Result<(), AuthProviderError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("mock auth provider unavailable").into());
        }
        Ok(())
    }

    fn issue_session(&self, user: AuthUser) -> AuthSession {
        let access_token = self
            .jwt
            .create_token(&user, ACCESS_TOKEN_TTL)
            .expect("mock token signing");
        let refresh_token = format!("refresh-{}", uuid::Uuid::new_v4().simple());
        self.state
            .lock()
            .unwrap()
            .refresh_tokens
            .insert(refresh_token.clone(), user.clone());

        AuthSession {
            tokens: SessionTokens {
                access_token,
                refresh_token,
                expires_in: ACCESS_TOKEN_TTL,
            },
            user,
        }
    }
}

impl Default for MockAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseAuthProvider for MockAuthProvider {
    async fn validate_session(
        &self,
        access_token: &str,
    ) -> Result<Option<AuthUser>, AuthProviderError> {
        self.check_available()?;
        if self.state.lock().unwrap().revoked.contains(access_token) {
            return Ok(None);
        }
        Ok(self.jwt.authenticate(access_token).ok())
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, AuthProviderError> {
        self.check_available()?;
        // Refresh tokens are single use
        let user = self
            .state
            .lock()
            .unwrap()
            .refresh_tokens
            .remove(refresh_token)
            .ok_or_else(|| {
                AuthProviderError::rejected("Invalid Refresh Token: Refresh Token Not Found", 400)
            })?;
        Ok(self.issue_session(user))
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthProviderError> {
        self.check_available()?;
        let user = {
            let state = self.state.lock().unwrap();
            match state.passwords.get(email) {
                Some((expected, user)) if expected == password => user.clone(),
                _ => return Err(AuthProviderError::rejected("Invalid login credentials", 400)),
            }
        };
        Ok(self.issue_session(user))
    }

    async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpOutcome, AuthProviderError> {
        self.check_available()?;
        let user = {
            let mut state = self.state.lock().unwrap();
            if state.passwords.contains_key(&request.email) {
                return Err(AuthProviderError::rejected("User already registered", 422));
            }
            let mut user =
                AuthUser::new(UserId::new()).with_email(request.email.clone());
            user.requested_role = Some(request.role);
            user.requested_verified = Some(request.role.initially_verified());
            state.passwords.insert(
                request.email.clone(),
                (request.password.clone(), user.clone()),
            );
            state.sign_ups.push(request.clone());
            user
        };

        if self.auto_confirm.load(Ordering::SeqCst) {
            Ok(SignUpOutcome::SignedIn(self.issue_session(user)))
        } else {
            Ok(SignUpOutcome::ConfirmationSent)
        }
    }

    async fn send_phone_otp(&self, phone: &str) -> Result<(), AuthProviderError> {
        self.check_available()?;
        self.state
            .lock()
            .unwrap()
            .otp_sent_to
            .push(phone.to_string());
        Ok(())
    }

    async fn verify_phone_otp(
        &self,
        phone: &str,
        token: &str,
    ) -> Result<AuthSession, AuthProviderError> {
        self.check_available()?;
        if token != MOCK_OTP_CODE {
            return Err(AuthProviderError::rejected("Token has expired or is invalid", 403));
        }
        let user = self
            .state
            .lock()
            .unwrap()
            .phone_users
            .entry(phone.to_string())
            .or_insert_with(|| {
                let mut user = AuthUser::new(UserId::new());
                user.phone = Some(phone.to_string());
                user
            })
            .clone();
        Ok(self.issue_session(user))
    }

    fn authorize_url(
        &self,
        provider: &str,
        redirect_to: &str,
        code_challenge: &str,
    ) -> Result<String, AuthProviderError> {
        Ok(format!(
            "https://auth.mock/authorize?provider={}&redirect_to={}&code_challenge={}&code_challenge_method=s256",
            urlencoding::encode(provider),
            urlencoding::encode(redirect_to),
            urlencoding::encode(code_challenge),
        ))
    }

    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<AuthSession, AuthProviderError> {
        self.check_available()?;
        if code_verifier.is_empty() {
            return Err(AuthProviderError::rejected("code verifier should be non-empty", 400));
        }
        let user = self
            .state
            .lock()
            .unwrap()
            .auth_codes
            .remove(code)
            .ok_or_else(|| {
                AuthProviderError::rejected("invalid flow state, no valid flow state found", 404)
            })?;
        Ok(self.issue_session(user))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthProviderError> {
        self.check_available()?;
        let mut state = self.state.lock().unwrap();
        state.revoked.insert(access_token.to_string());
        state.signed_out.push(access_token.to_string());
        Ok(())
    }
}

// =============================================================================
// In-memory Profile Store
// =============================================================================

/// Profile store backed by a map, with the same uniqueness rules as the
/// `profiles` table.
pub struct InMemoryProfileStore {
    profiles: RwLock<HashMap<UserId, Profile>>,
    failing: AtomicBool,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self {
            profiles: RwLock::new(HashMap::new()),
            failing: AtomicBool::new(false),
        }
    }

    /// Seed a profile.
    pub fn with_profile(self, profile: Profile) -> Self {
        self.profiles
            .write()
            .unwrap()
            .insert(profile.user_id, profile);
        self
    }

    /// Simulate an outage: every call fails with `Backend`.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Peek at the stored profile without going through the trait.
    pub fn profile(&self, user_id: UserId) -> Option<Profile> {
        self.profiles.read().unwrap().get(&user_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.profiles.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Backend(anyhow::anyhow!(
                "in-memory profile store unavailable"
            )));
        }
        Ok(())
    }
}

impl Default for InMemoryProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseProfileStore for InMemoryProfileStore {
    async fn get_profile(&self, user_id: UserId) -> Result<Option<Profile>, StoreError> {
        self.check_available()?;
        Ok(self.profile(user_id))
    }

    async fn insert_profile(&self, new: NewProfile) -> Result<Profile, StoreError> {
        self.check_available()?;
        let mut profiles = self.profiles.write().unwrap();
        if profiles.contains_key(&new.user_id) {
            return Err(StoreError::AlreadyExists);
        }
        let profile = Profile::from_new(new);
        profiles.insert(profile.user_id, profile.clone());
        Ok(profile)
    }

    async fn update_profile(
        &self,
        user_id: UserId,
        update: ProfileUpdate,
    ) -> Result<Profile, StoreError> {
        self.check_available()?;
        let mut profiles = self.profiles.write().unwrap();
        let profile = profiles.get_mut(&user_id).ok_or(StoreError::NotFound)?;
        update.apply_to(profile);
        Ok(profile.clone())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.check_available()
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

pub struct TestDependencies {
    pub auth: Arc<MockAuthProvider>,
    pub profiles: Arc<InMemoryProfileStore>,
    pub profile_hub: ProfileHub,
    pub site_url: String,
    pub secure_cookies: bool,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            auth: Arc::new(MockAuthProvider::new()),
            profiles: Arc::new(InMemoryProfileStore::new()),
            profile_hub: ProfileHub::new(),
            site_url: "http://localhost:8080".to_string(),
            secure_cookies: false,
        }
    }

    /// Set a mock auth provider
    pub fn mock_auth(mut self, auth: MockAuthProvider) -> Self {
        self.auth = Arc::new(auth);
        self
    }

    /// Set an in-memory profile store
    pub fn mock_profiles(mut self, profiles: InMemoryProfileStore) -> Self {
        self.profiles = Arc::new(profiles);
        self
    }

    pub fn with_site_url(mut self, site_url: &str) -> Self {
        self.site_url = site_url.to_string();
        self
    }

    pub fn with_secure_cookies(mut self) -> Self {
        self.secure_cookies = true;
        self
    }

    /// Convert into ServerDeps. The mocks stay reachable through `self`'s
    /// clones of the `Arc`s.
    pub fn server_deps(&self) -> ServerDeps {
        ServerDeps::new(
            self.auth.clone(),
            self.profiles.clone(),
            self.profile_hub.clone(),
            self.site_url.clone(),
            self.secure_cookies,
        )
    }

    pub fn into_server_deps(self) -> ServerDeps {
        self.server_deps()
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
