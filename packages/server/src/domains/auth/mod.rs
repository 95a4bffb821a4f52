//! Auth domain - sign-in flows against the hosted auth provider
//!
//! Responsibilities:
//! - Password, phone OTP and OAuth (PKCE) sign-in
//! - Registration with the chosen role as sign-up metadata
//! - Access token verification with the project JWT secret
//!
//! Sessions themselves are owned by the provider; this domain validates
//! input, calls the provider and decides where the user lands next.

pub mod actions;
pub mod jwt;
pub mod models;
pub mod pkce;
pub mod types;

pub use jwt::{Claims, JwtService};
pub use pkce::PkceChallenge;
pub use types::{AuthSession, SessionTokens, SignUpOutcome, SignUpRequest, UserMetadata};
