pub mod db;
pub mod error;
pub mod events;
pub mod store;
pub mod types;

pub use error::{Result, StoreError};
pub use store::Store;
