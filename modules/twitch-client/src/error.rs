use thiserror::Error;

pub type Result<T> = std::result::Result<T, TwitchError>;

#[derive(Debug, Error)]
pub enum TwitchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl TwitchError {
    /// Upstream rejected the credentials (expired or missing scope).
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, TwitchError::Api { status: 401 | 403, .. })
    }
}

impl From<reqwest::Error> for TwitchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            TwitchError::Parse(err.to_string())
        } else {
            TwitchError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TwitchError {
    fn from(err: serde_json::Error) -> Self {
        TwitchError::Parse(err.to_string())
    }
}
