use thiserror::Error;

pub type Result<T> = std::result::Result<T, LamodaError>;

#[derive(Debug, Error)]
pub enum LamodaError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<reqwest::Error> for LamodaError {
    fn from(err: reqwest::Error) -> Self {
        LamodaError::Network(err.to_string())
    }
}
