//! Error types for lensgauge-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Result type alias for lensgauge-api operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors that can occur while handling a request
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ApiError {
    /// The form has no `file` field
    #[error("No file part")]
    MissingFilePart,

    /// The `file` field has an empty filename
    #[error("No selected file")]
    NoSelectedFile,

    /// The multipart body could not be read
    #[error("Invalid multipart body: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    /// Error from lensgauge-core
    #[error("Core error: {0}")]
    Core(#[from] lensgauge_core::Error),

    /// The blocking worker panicked or was cancelled
    #[error("Processing task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    /// Server failed to bind or serve
    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingFilePart | ApiError::NoSelectedFile => StatusCode::BAD_REQUEST,
            ApiError::Multipart(e) => e.status(),
            ApiError::Core(e) if e.is_client_error() => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Core(_) | ApiError::TaskJoin(_) | ApiError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Plain-text body returned to the client.
    ///
    /// Server-side details other than calibration problems are logged, not returned.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::MissingFilePart | ApiError::NoSelectedFile => self.to_string(),
            ApiError::Multipart(e) => format!("Invalid upload: {}", e.body_text()),
            ApiError::Core(e) if e.is_client_error() => {
                "Uploaded file is not a readable image".to_string()
            }
            ApiError::Core(e @ lensgauge_core::Error::MalformedCalibration { .. }) => e.to_string(),
            _ => "internal server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::warn!(error = %self, "Request rejected");
        }
        (status, self.public_message()).into_response()
    }
}
