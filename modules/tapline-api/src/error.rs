use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use lamoda_client::LamodaError;
use tapline_common::TaplineError;
use thiserror::Error;
use twitch_client::TwitchError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// The source answered but had nothing to publish.
    #[error("No data found for {0}")]
    Empty(&'static str),

    #[error("Lamoda: {0}")]
    Lamoda(#[from] LamodaError),

    #[error("Twitch: {0}")]
    Twitch(#[from] TwitchError),

    #[error(transparent)]
    Internal(#[from] TaplineError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) | ApiError::Empty(_) => StatusCode::NOT_FOUND,
            ApiError::Lamoda(LamodaError::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            ApiError::Lamoda(LamodaError::Api { status: 404, .. }) => StatusCode::NOT_FOUND,
            ApiError::Lamoda(LamodaError::Api { status: 401 | 403, .. }) => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Lamoda(_) => StatusCode::BAD_GATEWAY,
            ApiError::Twitch(e) if e.is_unauthorized() => StatusCode::UNAUTHORIZED,
            ApiError::Twitch(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub(crate) fn topic(err: anyhow::Error) -> Self {
        ApiError::Internal(TaplineError::Topic(format!("{err:#}")))
    }

    pub(crate) fn store(err: anyhow::Error) -> Self {
        ApiError::Internal(TaplineError::Store(format!("{err:#}")))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
