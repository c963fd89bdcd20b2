use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error(transparent)]
    Store(#[from] cqc_store::StoreError),
}

impl From<WorkerError> for cqc_core::CqcError {
    fn from(e: WorkerError) -> Self {
        match e {
            WorkerError::Store(err) => err.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, WorkerError>;
