// Business domains
pub mod access;
pub mod auth;
pub mod profiles;
