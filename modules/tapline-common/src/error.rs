use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaplineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Topic error: {0}")]
    Topic(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
