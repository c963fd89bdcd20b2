use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("integrity violation: {0}")]
    Integrity(String),

    #[error(transparent)]
    Store(#[from] cqc_store::StoreError),
}

impl From<StateError> for cqc_core::CqcError {
    fn from(e: StateError) -> Self {
        match e {
            StateError::Integrity(msg) => cqc_core::CqcError::Integrity(msg),
            StateError::Store(err) => err.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StateError>;
