//! Server dependencies for actions (using traits for testability)
//!
//! The central, explicitly constructed context every handler and action
//! receives. External services sit behind trait objects so tests can swap
//! them for in-memory doubles.

use std::sync::Arc;

use crate::kernel::{BaseAuthProvider, BaseProfileStore, ProfileHub};

#[derive(Clone)]
pub struct ServerDeps {
    pub auth: Arc<dyn BaseAuthProvider>,
    pub profiles: Arc<dyn BaseProfileStore>,
    /// In-process pub/sub hub for profile state pushed over SSE
    pub profile_hub: ProfileHub,
    /// Public origin of this server, used to build provider callback URLs
    pub site_url: String,
    /// Mark session cookies `Secure` (HTTPS deployments)
    pub secure_cookies: bool,
}

impl ServerDeps {
    pub fn new(
        auth: Arc<dyn BaseAuthProvider>,
        profiles: Arc<dyn BaseProfileStore>,
        profile_hub: ProfileHub,
        site_url: impl Into<String>,
        secure_cookies: bool,
    ) -> Self {
        Self {
            auth,
            profiles,
            profile_hub,
            site_url: site_url.into().trim_end_matches('/').to_string(),
            secure_cookies,
        }
    }

    /// Absolute URL for a path on this server.
    pub fn site_path(&self, path: &str) -> String {
        format!("{}{}", self.site_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::test_dependencies::TestDependencies;

    #[test]
    fn test_site_path_trims_trailing_slash() {
        let deps = TestDependencies::new()
            .with_site_url("https://lastbite.example/")
            .into_server_deps();
        assert_eq!(
            deps.site_path("/auth/callback"),
            "https://lastbite.example/auth/callback"
        );
    }
}
