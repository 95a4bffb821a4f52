// LastBite - access server core
//
// Request-time session resolution and route access control for the LastBite
// buyer/seller marketplace, plus the profile and sign-in flows that feed it.
// The hosted auth provider and the profile store sit behind kernel traits.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
