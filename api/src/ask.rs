use anyhow::Context;
use axum::{
    body::Bytes,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap},
    Json,
};
use serde_json::{json, Value};

use crate::error::RelayError;
use crate::AppState;

/// Forward the question body to the RAG service untouched and relay its
/// answer. Bodies not declared as JSON, and empty ones, are sent on as `{}`.
pub async fn ask(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, RelayError> {
    let question: Value = if !is_json(&headers) || body.iter().all(u8::is_ascii_whitespace) {
        json!({})
    } else {
        serde_json::from_slice(&body)
            .context("ask body is not valid JSON")
            .map_err(RelayError::Ask)?
    };

    let data = state.rag.ask(&question).await.map_err(RelayError::Ask)?;
    log::info!("RAG service answered: {}", data);

    Ok(Json(data))
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|essence| essence.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}
