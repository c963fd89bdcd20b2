use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouterError {
    #[error(transparent)]
    Store(#[from] cqc_store::StoreError),
}

impl From<RouterError> for cqc_core::CqcError {
    fn from(e: RouterError) -> Self {
        match e {
            RouterError::Store(err) => err.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RouterError>;
