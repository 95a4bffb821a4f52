use crate::common::UserId;
use crate::domains::profiles::models::{Profile, Role};

pub const LOGIN_PATH: &str = "/auth/login";
pub const ROLE_SELECTION_PATH: &str = "/auth/role";
pub const VERIFICATION_PATH: &str = "/seller/verification";
pub const PENDING_REVIEW_PATH: &str = "/seller/pending";
pub const BUYER_DASHBOARD_PATH: &str = "/buyer/dashboard";
pub const SELLER_DASHBOARD_PATH: &str = "/seller/dashboard";

/// Outcome of evaluating a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    RedirectTo(&'static str),
}

impl Decision {
    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn redirect_target(&self) -> Option<&'static str> {
        match *self {
            Decision::Allow => None,
            Decision::RedirectTo(target) => Some(target),
        }
    }
}

/// Top-level route section a path belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Auth,
    Buyer,
    Seller,
    Other,
}

impl Section {
    /// Classify by first path segment. `/auth` and `/auth/...` are in the auth
    /// section; `/authority` is not.
    pub fn of(path: &str) -> Self {
        if in_section(path, "/auth") {
            Section::Auth
        } else if in_section(path, "/buyer") {
            Section::Buyer
        } else if in_section(path, "/seller") {
            Section::Seller
        } else {
            Section::Other
        }
    }
}

fn in_section(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Dashboard a signed-in user with the given role lands on.
pub fn dashboard_path(role: Role) -> &'static str {
    match role {
        Role::Buyer => BUYER_DASHBOARD_PATH,
        Role::Seller => SELLER_DASHBOARD_PATH,
    }
}

/// Decide whether a navigation to `path` proceeds.
///
/// First match wins:
/// 1. anonymous outside `/auth` -> login
/// 2. anonymous inside `/auth` -> allow
/// 3. signed in without a profile, anywhere but role selection -> role selection
/// 4. signed in with a profile, inside `/auth` (not role selection) -> own dashboard
/// 5. unverified seller in `/seller` (not verification/pending) -> verification,
///    or pending review once business details were submitted
/// 6. buyer in `/seller` -> buyer dashboard
/// 7. seller in `/buyer` -> seller dashboard
/// 8. allow
pub fn decide(path: &str, user: Option<UserId>, profile: Option<&Profile>) -> Decision {
    let section = Section::of(path);

    if user.is_none() {
        return match section {
            Section::Auth => Decision::Allow,
            _ => Decision::RedirectTo(LOGIN_PATH),
        };
    }

    let is_role_selection = path == ROLE_SELECTION_PATH;

    let Some(profile) = profile else {
        return if is_role_selection {
            Decision::Allow
        } else {
            Decision::RedirectTo(ROLE_SELECTION_PATH)
        };
    };

    if section == Section::Auth && !is_role_selection {
        return Decision::RedirectTo(dashboard_path(profile.role));
    }

    match (profile.role, section) {
        (Role::Seller, Section::Seller)
            if !profile.is_verified && path != VERIFICATION_PATH && path != PENDING_REVIEW_PATH =>
        {
            if profile.has_business_name() {
                Decision::RedirectTo(PENDING_REVIEW_PATH)
            } else {
                Decision::RedirectTo(VERIFICATION_PATH)
            }
        }
        (Role::Buyer, Section::Seller) => Decision::RedirectTo(BUYER_DASHBOARD_PATH),
        (Role::Seller, Section::Buyer) => Decision::RedirectTo(SELLER_DASHBOARD_PATH),
        _ => Decision::Allow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::profiles::models::Profile;

    const AUTH_PATHS: &[&str] = &[
        "/auth",
        "/auth/login",
        "/auth/register",
        "/auth/role",
        "/auth/callback",
        "/auth/phone/verify",
    ];

    const SELLER_PATHS: &[&str] = &[
        "/seller",
        "/seller/dashboard",
        "/seller/verification",
        "/seller/pending",
        "/seller/listings/42",
    ];

    const BUYER_PATHS: &[&str] = &["/buyer", "/buyer/dashboard", "/buyer/orders"];

    const OTHER_PATHS: &[&str] = &["/", "/dashboard", "/authority", "/sellers"];

    fn all_paths() -> Vec<&'static str> {
        AUTH_PATHS
            .iter()
            .chain(SELLER_PATHS)
            .chain(BUYER_PATHS)
            .chain(OTHER_PATHS)
            .copied()
            .collect()
    }

    fn buyer(user_id: UserId) -> Profile {
        Profile::fixture(user_id, Role::Buyer, true)
    }

    fn verified_seller(user_id: UserId) -> Profile {
        let mut profile = Profile::fixture(user_id, Role::Seller, true);
        profile.business_name = Some("Corner Bakery".to_string());
        profile
    }

    fn unverified_seller(user_id: UserId, business_name: Option<&str>) -> Profile {
        let mut profile = Profile::fixture(user_id, Role::Seller, false);
        profile.business_name = business_name.map(str::to_string);
        profile
    }

    #[test]
    fn test_section_classification_is_segment_aware() {
        assert_eq!(Section::of("/auth"), Section::Auth);
        assert_eq!(Section::of("/auth/login"), Section::Auth);
        assert_eq!(Section::of("/authority"), Section::Other);
        assert_eq!(Section::of("/buyer/dashboard"), Section::Buyer);
        assert_eq!(Section::of("/buyers"), Section::Other);
        assert_eq!(Section::of("/seller"), Section::Seller);
        assert_eq!(Section::of("/dashboard"), Section::Other);
    }

    #[test]
    fn test_anonymous_allowed_in_auth_section() {
        for path in AUTH_PATHS {
            assert_eq!(decide(path, None, None), Decision::Allow, "path {}", path);
        }
    }

    #[test]
    fn test_anonymous_redirected_to_login_elsewhere() {
        for path in SELLER_PATHS.iter().chain(BUYER_PATHS).chain(OTHER_PATHS) {
            assert_eq!(
                decide(path, None, None),
                Decision::RedirectTo(LOGIN_PATH),
                "path {}",
                path
            );
        }
    }

    #[test]
    fn test_anonymous_ignores_stray_profile() {
        // A profile without a session never grants access
        let profile = buyer(UserId::new());
        assert_eq!(
            decide("/buyer/dashboard", None, Some(&profile)),
            Decision::RedirectTo(LOGIN_PATH)
        );
    }

    #[test]
    fn test_no_profile_goes_to_role_selection_everywhere_but_role_selection() {
        let user = Some(UserId::new());
        for path in all_paths() {
            let expected = if path == ROLE_SELECTION_PATH {
                Decision::Allow
            } else {
                Decision::RedirectTo(ROLE_SELECTION_PATH)
            };
            assert_eq!(decide(path, user, None), expected, "path {}", path);
        }
    }

    #[test]
    fn test_profiled_user_leaves_auth_section_for_dashboard() {
        let user_id = UserId::new();
        let buyer = buyer(user_id);
        let seller = verified_seller(user_id);

        for path in AUTH_PATHS.iter().filter(|p| **p != ROLE_SELECTION_PATH) {
            assert_eq!(
                decide(path, Some(user_id), Some(&buyer)),
                Decision::RedirectTo(BUYER_DASHBOARD_PATH)
            );
            assert_eq!(
                decide(path, Some(user_id), Some(&seller)),
                Decision::RedirectTo(SELLER_DASHBOARD_PATH)
            );
        }
    }

    #[test]
    fn test_profiled_user_may_view_role_selection() {
        let user_id = UserId::new();
        assert_eq!(
            decide(ROLE_SELECTION_PATH, Some(user_id), Some(&buyer(user_id))),
            Decision::Allow
        );
    }

    #[test]
    fn test_verified_seller_allowed_on_every_seller_path() {
        let user_id = UserId::new();
        let seller = verified_seller(user_id);
        for path in SELLER_PATHS {
            assert_eq!(decide(path, Some(user_id), Some(&seller)), Decision::Allow, "path {}", path);
        }
    }

    #[test]
    fn test_unverified_seller_without_business_name_goes_to_verification() {
        let user_id = UserId::new();
        let seller = unverified_seller(user_id, None);
        for path in ["/seller", "/seller/dashboard", "/seller/listings/42"] {
            assert_eq!(
                decide(path, Some(user_id), Some(&seller)),
                Decision::RedirectTo(VERIFICATION_PATH),
                "path {}",
                path
            );
        }
    }

    #[test]
    fn test_empty_business_name_counts_as_absent() {
        let user_id = UserId::new();
        let seller = unverified_seller(user_id, Some(""));
        assert_eq!(
            decide("/seller/dashboard", Some(user_id), Some(&seller)),
            Decision::RedirectTo(VERIFICATION_PATH)
        );
    }

    #[test]
    fn test_unverified_seller_with_business_name_goes_to_pending() {
        let user_id = UserId::new();
        let seller = unverified_seller(user_id, Some("Corner Bakery"));
        assert_eq!(
            decide("/seller/dashboard", Some(user_id), Some(&seller)),
            Decision::RedirectTo(PENDING_REVIEW_PATH)
        );
    }

    #[test]
    fn test_unverified_seller_may_reach_verification_and_pending() {
        let user_id = UserId::new();
        for seller in [
            unverified_seller(user_id, None),
            unverified_seller(user_id, Some("Corner Bakery")),
        ] {
            assert_eq!(decide(VERIFICATION_PATH, Some(user_id), Some(&seller)), Decision::Allow);
            assert_eq!(decide(PENDING_REVIEW_PATH, Some(user_id), Some(&seller)), Decision::Allow);
        }
    }

    #[test]
    fn test_buyer_kept_out_of_seller_section() {
        let user_id = UserId::new();
        let buyer = buyer(user_id);
        for path in SELLER_PATHS {
            assert_eq!(
                decide(path, Some(user_id), Some(&buyer)),
                Decision::RedirectTo(BUYER_DASHBOARD_PATH),
                "path {}",
                path
            );
        }
    }

    #[test]
    fn test_seller_kept_out_of_buyer_section() {
        let user_id = UserId::new();
        for seller in [verified_seller(user_id), unverified_seller(user_id, None)] {
            for path in BUYER_PATHS {
                assert_eq!(
                    decide(path, Some(user_id), Some(&seller)),
                    Decision::RedirectTo(SELLER_DASHBOARD_PATH),
                    "path {}",
                    path
                );
            }
        }
    }

    #[test]
    fn test_profiled_users_pass_through_other_paths() {
        let user_id = UserId::new();
        for profile in [buyer(user_id), verified_seller(user_id), unverified_seller(user_id, None)] {
            for path in OTHER_PATHS {
                assert_eq!(decide(path, Some(user_id), Some(&profile)), Decision::Allow);
            }
        }
    }

    #[test]
    fn test_scenario_no_profile_on_buyer_dashboard() {
        assert_eq!(
            decide("/buyer/dashboard", Some(UserId::new()), None),
            Decision::RedirectTo("/auth/role")
        );
    }

    #[test]
    fn test_scenario_unverified_seller_on_seller_dashboard() {
        let user_id = UserId::new();
        let seller = unverified_seller(user_id, None);
        assert_eq!(
            decide("/seller/dashboard", Some(user_id), Some(&seller)),
            Decision::RedirectTo("/seller/verification")
        );
    }

    #[test]
    fn test_scenario_buyer_on_seller_dashboard() {
        let user_id = UserId::new();
        assert_eq!(
            decide("/seller/dashboard", Some(user_id), Some(&buyer(user_id))),
            Decision::RedirectTo("/buyer/dashboard")
        );
    }

    #[test]
    fn test_decision_helpers() {
        assert!(Decision::Allow.is_allow());
        assert_eq!(Decision::Allow.redirect_target(), None);
        assert_eq!(
            Decision::RedirectTo(LOGIN_PATH).redirect_target(),
            Some(LOGIN_PATH)
        );
    }
}
