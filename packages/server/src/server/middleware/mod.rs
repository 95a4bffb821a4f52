// HTTP middleware
pub mod access_guard;
pub mod session_auth;

pub use access_guard::*;
pub use session_auth::*;
