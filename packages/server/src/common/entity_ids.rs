//! Typed ID definitions for LastBite entities.
//!
//! ```rust
//! use lastbite_core::common::{ProfileId, UserId};
//!
//! let user_id: UserId = UserId::new();
//! let profile_id: ProfileId = ProfileId::new();
//! # let _ = (user_id, profile_id);
//! ```

pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for auth principals (issued by the hosted auth provider).
pub struct User;

/// Marker type for Profile rows.
pub struct ProfileRecord;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

/// Typed ID for auth principals.
pub type UserId = Id<User>;

/// Typed ID for Profile rows.
pub type ProfileId = Id<ProfileRecord>;
