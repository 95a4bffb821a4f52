pub mod profile;
pub mod verification;

pub use profile::*;
pub use verification::*;
