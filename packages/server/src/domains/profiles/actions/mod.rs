//! Profiles domain actions - business logic functions
//!
//! Actions are async functions called directly from HTTP handlers with the
//! explicitly constructed `ServerDeps`.

mod provision;
mod select_role;
mod submit_verification;
mod verification_status;

pub use provision::provision_from_metadata;
pub use select_role::{select_role, RoleSelected};
pub use submit_verification::submit_verification;
pub use verification_status::{verification_status, VerificationStatus};
