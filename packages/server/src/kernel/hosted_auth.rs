//! Client for the hosted auth provider's REST API (GoTrue-compatible
//! `/auth/v1` endpoints).

use anyhow::Context;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::BaseAuthProvider;
use crate::common::{AuthProviderError, AuthUser, UserId};
use crate::domains::auth::jwt::JwtService;
use crate::domains::auth::types::{
    AuthSession, SessionTokens, SignUpOutcome, SignUpRequest, UserMetadata,
};

/// Hosted auth API client
pub struct HostedAuthClient {
    base_url: String,
    anon_key: String,
    /// Set when the project JWT secret is configured; sessions are then
    /// validated locally instead of with a round trip.
    jwt: Option<JwtService>,
    client: reqwest::Client,
}

/// Provider user object
#[derive(Debug, Deserialize)]
struct ProviderUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    user_metadata: UserMetadata,
}

impl ProviderUser {
    fn into_auth_user(self) -> Result<AuthUser, AuthProviderError> {
        let user_id =
            UserId::parse(&self.id).context("Auth provider returned a malformed user id")?;
        Ok(self
            .user_metadata
            .into_auth_user(user_id, self.email, self.phone))
    }
}

/// Token grant response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    user: ProviderUser,
}

impl TokenResponse {
    fn into_session(self) -> Result<AuthSession, AuthProviderError> {
        Ok(AuthSession {
            tokens: SessionTokens {
                access_token: self.access_token,
                refresh_token: self.refresh_token,
                expires_in: self.expires_in,
            },
            user: self.user.into_auth_user()?,
        })
    }
}

/// Sign-up returns a session when confirmations are off, the bare user
/// otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    Pending(serde_json::Value),
}

/// The provider is inconsistent about where it puts the message.
#[derive(Debug, Default, Deserialize)]
struct ProviderErrorBody {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ProviderErrorBody {
    fn into_message(self) -> Option<String> {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
    }
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshGrant<'a> {
    refresh_token: &'a str,
}

#[derive(Serialize)]
struct PkceGrant<'a> {
    auth_code: &'a str,
    code_verifier: &'a str,
}

#[derive(Serialize)]
struct SignUpBody<'a> {
    email: &'a str,
    password: &'a str,
    data: UserMetadata,
    code_challenge: &'a str,
    code_challenge_method: &'static str,
}

#[derive(Serialize)]
struct OtpBody<'a> {
    phone: &'a str,
    create_user: bool,
}

#[derive(Serialize)]
struct VerifyBody<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    phone: &'a str,
    token: &'a str,
}

impl HostedAuthClient {
    /// Create a new client for the project at `base_url`.
    pub fn new(
        base_url: &str,
        anon_key: String,
        jwt_secret: Option<&str>,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
            jwt: jwt_secret.map(JwtService::new),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .post(self.endpoint(path))
            .header("apikey", &self.anon_key)
    }

    async fn token_grant<B: Serialize>(
        &self,
        grant_type: &str,
        body: &B,
    ) -> Result<AuthSession, AuthProviderError> {
        let response = self
            .post("token")
            .query(&[("grant_type", grant_type)])
            .json(body)
            .send()
            .await?;

        read_json::<TokenResponse>(response).await?.into_session()
    }

    async fn fetch_user(&self, access_token: &str) -> Result<Option<AuthUser>, AuthProviderError> {
        let response = self
            .client
            .get(self.endpoint("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        match read_json::<ProviderUser>(response).await {
            Ok(user) => user.into_auth_user().map(Some),
            Err(e) if e.is_rejected() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Classify a response: 2xx decodes, 4xx is a rejection carrying the
/// provider's message, anything else means the provider is unavailable.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, AuthProviderError> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<T>()
            .await
            .context("Failed to parse auth provider response")
            .map_err(AuthProviderError::Unavailable);
    }

    let body = response.text().await.unwrap_or_default();
    if status.is_client_error() {
        let message = serde_json::from_str::<ProviderErrorBody>(&body)
            .ok()
            .and_then(ProviderErrorBody::into_message)
            .unwrap_or_else(|| status.to_string());
        return Err(AuthProviderError::rejected(message, status.as_u16()));
    }

    Err(anyhow::anyhow!("Auth provider error {}: {}", status, body).into())
}

async fn expect_success(response: reqwest::Response) -> Result<(), AuthProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    read_json::<serde_json::Value>(response).await.map(|_| ())
}

#[async_trait]
impl BaseAuthProvider for HostedAuthClient {
    async fn validate_session(
        &self,
        access_token: &str,
    ) -> Result<Option<AuthUser>, AuthProviderError> {
        match &self.jwt {
            Some(jwt) => match jwt.authenticate(access_token) {
                Ok(user) => Ok(Some(user)),
                Err(e) => {
                    debug!(error = %e, "Access token rejected");
                    Ok(None)
                }
            },
            None => self.fetch_user(access_token).await,
        }
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, AuthProviderError> {
        self.token_grant("refresh_token", &RefreshGrant { refresh_token })
            .await
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthProviderError> {
        self.token_grant("password", &PasswordGrant { email, password })
            .await
    }

    async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpOutcome, AuthProviderError> {
        let body = SignUpBody {
            email: &request.email,
            password: &request.password,
            data: UserMetadata::for_role(request.role),
            code_challenge: &request.code_challenge,
            code_challenge_method: "s256",
        };

        let response = self
            .post("signup")
            .query(&[("redirect_to", request.redirect_to.as_str())])
            .json(&body)
            .send()
            .await?;

        match read_json::<SignUpResponse>(response).await? {
            SignUpResponse::Session(tokens) => Ok(SignUpOutcome::SignedIn(tokens.into_session()?)),
            SignUpResponse::Pending(_) => Ok(SignUpOutcome::ConfirmationSent),
        }
    }

    async fn send_phone_otp(&self, phone: &str) -> Result<(), AuthProviderError> {
        let response = self
            .post("otp")
            .json(&OtpBody {
                phone,
                create_user: true,
            })
            .send()
            .await?;
        expect_success(response).await
    }

    async fn verify_phone_otp(
        &self,
        phone: &str,
        token: &str,
    ) -> Result<AuthSession, AuthProviderError> {
        let response = self
            .post("verify")
            .json(&VerifyBody {
                kind: "sms",
                phone,
                token,
            })
            .send()
            .await?;
        read_json::<TokenResponse>(response).await?.into_session()
    }

    fn authorize_url(
        &self,
        provider: &str,
        redirect_to: &str,
        code_challenge: &str,
    ) -> Result<String, AuthProviderError> {
        let url = url::Url::parse_with_params(
            &self.endpoint("authorize"),
            &[
                ("provider", provider),
                ("redirect_to", redirect_to),
                ("code_challenge", code_challenge),
                ("code_challenge_method", "s256"),
            ],
        )
        .context("Invalid auth provider URL")?;
        Ok(url.into())
    }

    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<AuthSession, AuthProviderError> {
        self.token_grant(
            "pkce",
            &PkceGrant {
                auth_code: code,
                code_verifier,
            },
        )
        .await
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthProviderError> {
        let response = self
            .post("logout")
            .bearer_auth(access_token)
            .send()
            .await?;
        expect_success(response).await
    }
}
