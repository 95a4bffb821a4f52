//! Access domain - route access control
//!
//! Pure decision logic: given the requested path, whether a user is signed in
//! and the user's profile (if any), decide whether the navigation proceeds or
//! is redirected. No I/O happens here; the session and profile are resolved by
//! middleware before `decide` is called.

pub mod policy;

pub use policy::{
    decide, dashboard_path, Decision, Section, BUYER_DASHBOARD_PATH, LOGIN_PATH,
    PENDING_REVIEW_PATH, ROLE_SELECTION_PATH, SELLER_DASHBOARD_PATH, VERIFICATION_PATH,
};
