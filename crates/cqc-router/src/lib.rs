pub mod error;
pub mod router;
pub mod types;

pub use error::RouterError;
pub use router::ChannelRouter;
pub use types::{DeepLinkMatch, RouteOutcome};
