use thiserror::Error;

/// Errors produced by the gateway binary's HTTP layer and CLI.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Sql(#[from] rusqlite::Error),

    #[error("webhook authentication failed: {0}")]
    Unauthorized(String),

    #[error(transparent)]
    Core(#[from] cqc_core::CqcError),
}

impl From<GatewayError> for cqc_core::CqcError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::Sql(err) => cqc_core::CqcError::Database(err.to_string()),
            GatewayError::Unauthorized(msg) => cqc_core::CqcError::Validation(msg),
            GatewayError::Core(err) => err,
        }
    }
}
