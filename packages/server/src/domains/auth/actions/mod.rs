//! Auth domain actions - business logic functions
//!
//! Actions are async functions called directly from HTTP handlers. They
//! validate input first and never reach the provider with a malformed form.

mod oauth;
mod phone_otp;
mod register;
mod sign_in;
mod sign_out;

pub use oauth::{complete_callback, start_oauth, CallbackOutcome, OAuthStart, SUPPORTED_OAUTH_PROVIDERS};
pub use phone_otp::{send_phone_otp, verify_phone_otp};
pub use register::{register, Registered, CALLBACK_PATH};
pub use sign_in::{sign_in_with_password, SignedIn};
pub use sign_out::sign_out;
