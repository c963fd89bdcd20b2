pub mod error;
pub mod manager;
pub mod types;

pub use error::SessionError;
pub use manager::SessionCache;
pub use types::{RouteKey, RouteMapping};
