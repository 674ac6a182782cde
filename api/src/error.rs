use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::status_payload::StatusPayload;

pub const PROCESSING_FAILED: &str = "Processing failed.";
pub const ASK_FAILED: &str = "Ask failed.";
pub const NO_FILE_UPLOADED: &str = "No file uploaded.";

/// Failures surfaced by the relay routes. The underlying cause is logged and
/// never sent back to the caller.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("no file attached under multipart field `{0}`")]
    MissingFile(String),

    #[error("upload processing failed: {0:#}")]
    Processing(anyhow::Error),

    #[error("ask failed: {0:#}")]
    Ask(anyhow::Error),
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            RelayError::MissingFile(field) => {
                log::warn!("Upload rejected: no file in field '{}'", field);
                (StatusCode::BAD_REQUEST, NO_FILE_UPLOADED)
            }
            RelayError::Processing(e) => {
                log::error!("UPLOAD ERROR: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, PROCESSING_FAILED)
            }
            RelayError::Ask(e) => {
                log::error!("ASK ERROR: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, ASK_FAILED)
            }
        };

        (status, Json(StatusPayload::error(message))).into_response()
    }
}
