use anyhow::Context;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use serde_json::Value;

use crate::error::RelayError;
use crate::AppState;

/// Persist the uploaded PDF, hand its absolute path to the RAG service and
/// relay the service's answer.
pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, RelayError> {
    let field_name = state.config.upload_field.as_str();

    let mut multipart = multipart.map_err(|e| {
        log::warn!("Upload is not a multipart form: {}", e);
        RelayError::MissingFile(field_name.to_string())
    })?;

    // Only the first file part under the configured name is used.
    let mut upload = loop {
        let field = multipart
            .next_field()
            .await
            .context("malformed multipart body")
            .map_err(RelayError::Processing)?;

        match field {
            // A part without a filename is a plain form value, not a file.
            Some(field) if field.name() == Some(field_name) && field.file_name().is_some() => {
                break state
                    .scratch
                    .persist(field)
                    .await
                    .map_err(RelayError::Processing)?;
            }
            Some(_) => continue,
            None => return Err(RelayError::MissingFile(field_name.to_string())),
        }
    };

    if state.config.retain_uploads {
        upload.retain();
    }

    let result = state.rag.process(upload.path()).await;
    upload.discard();

    let data = result.map_err(RelayError::Processing)?;
    log::info!("RAG service processed upload: {}", data);

    Ok(Json(data))
}
