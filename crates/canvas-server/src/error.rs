//! Error types for the server

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use canvas_commands::{ActionResult, CommandError};
use inference::GatewayError;
use serde_json::json;

/// Failures while starting the server
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

/// Failures of a single request
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The command text was not JSON at all
    #[error("{0}")]
    Malformed(CommandError),

    #[error("Error fetching models: {0}")]
    Models(GatewayError),

    #[error("Failed to process the image: {0}")]
    Image(GatewayError),

    #[error("{0}")]
    BadRequest(String),

    #[error("Invalid multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Model request failed: {0}")]
    Gateway(#[from] GatewayError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Malformed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::BadRequest(_) | ApiError::Multipart(_) => StatusCode::BAD_REQUEST,
            ApiError::Models(_) | ApiError::Image(_) | ApiError::Gateway(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<CommandError> for ApiError {
    fn from(error: CommandError) -> Self {
        ApiError::Malformed(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            // Same shape as a per-action error result
            ApiError::Malformed(error) => ActionResult::from(error).to_json(),
            other => {
                if status.is_server_error() {
                    log::error!("{}", other);
                } else {
                    log::warn!("{}", other);
                }
                json!({ "detail": other.to_string() })
            }
        };
        (status, Json(body)).into_response()
    }
}
