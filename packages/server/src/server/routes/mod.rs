// HTTP routes
pub mod auth;
pub mod dashboard;
pub mod health;
pub mod seller;
pub mod stream;

pub use auth::*;
pub use dashboard::*;
pub use health::*;
pub use seller::*;
pub use stream::*;
