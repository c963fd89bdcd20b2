//! Crate-wide error taxonomy.
//!
//! Per-crate errors (`StoreError`, `SessionError`, ...) convert into this
//! taxonomy at the boundary the error-handling design calls for; handlers
//! never let a raw dependency error cross into transport code.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CqcError {
    /// Inbound data violates a contract: malformed phone, unknown button payload.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A state precondition was violated (e.g. budget asked without transaction_type).
    #[error("integrity violation: {0}")]
    Integrity(String),

    /// Oracle/cache/transport timeout or 5xx; retried, then degraded.
    #[error("transient dependency failure: {0}")]
    TransientDependency(String),

    /// DB unreachable; the turn aborts and the transport returns a retryable status.
    #[error("fatal dependency failure: {0}")]
    FatalDependency(String),

    /// Missing admin, missing vertical, missing tenant configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("database error: {0}")]
    Database(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl CqcError {
    pub fn code(&self) -> &'static str {
        match self {
            CqcError::Validation(_) => "VALIDATION_ERROR",
            CqcError::Integrity(_) => "INTEGRITY_ERROR",
            CqcError::TransientDependency(_) => "TRANSIENT_DEPENDENCY_ERROR",
            CqcError::FatalDependency(_) => "FATAL_DEPENDENCY_ERROR",
            CqcError::Configuration(_) => "CONFIGURATION_ERROR",
            CqcError::Database(_) => "DATABASE_ERROR",
            CqcError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        CqcError::Validation(msg.into())
    }

    pub fn integrity(msg: impl Into<String>) -> Self {
        CqcError::Integrity(msg.into())
    }

    pub fn database(msg: impl std::fmt::Display) -> Self {
        CqcError::Database(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CqcError>;
