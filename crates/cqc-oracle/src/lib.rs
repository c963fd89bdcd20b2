pub mod provider;
pub mod router;

pub use provider::{AiOracle, HttpOracle, OracleError, OracleExtraction, OracleRequest};
pub use router::BackoffOracle;
