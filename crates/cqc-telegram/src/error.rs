/// Errors produced by the Telegram adapter.
#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    #[error("teloxide error: {0}")]
    Teloxide(#[from] teloxide::RequestError),

    #[error("no bot token configured")]
    NoToken,

    #[error(transparent)]
    Router(#[from] cqc_router::RouterError),

    #[error(transparent)]
    Core(#[from] cqc_core::CqcError),
}

impl From<TelegramError> for cqc_core::CqcError {
    fn from(e: TelegramError) -> Self {
        match e {
            TelegramError::Teloxide(err) => cqc_core::CqcError::TransientDependency(err.to_string()),
            TelegramError::NoToken => cqc_core::CqcError::Configuration("no bot token configured".into()),
            TelegramError::Router(err) => err.into(),
            TelegramError::Core(err) => err,
        }
    }
}
