use anyhow::{Context, Result};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::types::UserMetadata;
use crate::common::{AuthUser, UserId};

/// Audience the hosted provider stamps on signed-in users' access tokens.
pub const AUTHENTICATED_AUDIENCE: &str = "authenticated";

/// Access token claims as issued by the hosted auth provider
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,          // Subject (auth user id)
    pub aud: String,          // Audience ("authenticated")
    pub exp: i64,             // Expiration timestamp
    pub iat: i64,             // Issued at timestamp
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

impl Claims {
    pub fn into_auth_user(self) -> Result<AuthUser> {
        let user_id = UserId::parse(&self.sub).context("Token subject is not a user id")?;
        Ok(self
            .user_metadata
            .into_auth_user(user_id, self.email, self.phone))
    }
}

/// JWT Service - verifies (and, for tests and local tooling, signs) access
/// tokens with the project's shared HS256 secret
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    audience: String,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            audience: AUTHENTICATED_AUDIENCE.to_string(),
        }
    }

    /// Sign an access token for `user`, valid for `ttl_seconds`.
    pub fn create_token(&self, user: &AuthUser, ttl_seconds: i64) -> Result<String> {
        let now = chrono::Utc::now();
        let metadata = UserMetadata {
            role: user.requested_role.map(|r| r.as_str().to_string()),
            is_verified: user.requested_verified,
        };

        let claims = Claims {
            sub: user.user_id.to_string(),
            aud: self.audience.clone(),
            exp: (now + chrono::Duration::seconds(ttl_seconds)).timestamp(),
            iat: now.timestamp(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            user_metadata: metadata,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(Into::into)
    }

    /// Verify signature, expiry and audience.
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.audience]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(Into::into)
    }

    /// Verify and convert to the principal in one step.
    pub fn authenticate(&self, token: &str) -> Result<AuthUser> {
        self.verify_token(token)?.into_auth_user()
    }
}
