// Common types and utilities shared across the application

pub mod auth;
pub mod entity_ids;
pub mod error;
pub mod id;
pub mod validation;

pub use auth::{AuthProviderError, AuthUser};
pub use entity_ids::*;
pub use error::AppError;
pub use validation::{FieldError, ValidationErrors};
pub use id::Id;
