//! Profiles domain - the role/verification record attached to a user
//!
//! Responsibilities:
//! - Role selection (profile creation, once per user)
//! - Seller verification submission
//! - Pending-review status and profile change notifications

pub mod actions;
pub mod models;

pub use models::{
    NewProfile, Profile, ProfileUpdate, Role, VerificationDetails, VerificationState,
};
