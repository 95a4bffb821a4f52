pub mod cookies;
pub mod session;

pub use session::{resolve_session, ResolvedSession};
