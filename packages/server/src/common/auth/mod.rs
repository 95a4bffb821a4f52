//! Authentication primitives shared by the kernel adapters and the HTTP layer.
//!
//! The hosted auth provider owns credentials and sessions; this module only
//! describes what the rest of the server sees of it: an authenticated
//! principal and the ways a provider call can fail.

mod errors;
mod user;

pub use errors::AuthProviderError;
pub use user::AuthUser;
