use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid session key: {0}")]
    InvalidKey(String),
}

impl From<SessionError> for cqc_core::CqcError {
    fn from(e: SessionError) -> Self {
        cqc_core::CqcError::validation(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
