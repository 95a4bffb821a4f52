//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod hosted_auth;
pub mod pg_profile_store;
pub mod profile_hub;
pub mod test_dependencies;
pub mod traits;

pub use deps::ServerDeps;
pub use hosted_auth::HostedAuthClient;
pub use pg_profile_store::{listen_for_profile_changes, PgProfileStore};
pub use profile_hub::{ChannelRelease, ProfileHub};
pub use test_dependencies::{
    InMemoryProfileStore, MockAuthProvider, TestDependencies, MOCK_JWT_SECRET, MOCK_OTP_CODE,
};
pub use traits::*;
