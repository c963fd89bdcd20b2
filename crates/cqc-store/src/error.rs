use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found: {1}")]
    NotFound(&'static str, String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("invariant violated: {0}")]
    Invariant(String),
}

impl From<StoreError> for cqc_core::CqcError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(kind, id) => {
                cqc_core::CqcError::validation(format!("{kind} not found: {id}"))
            }
            StoreError::Database(err) => cqc_core::CqcError::database(err),
            StoreError::Invariant(msg) => cqc_core::CqcError::integrity(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
