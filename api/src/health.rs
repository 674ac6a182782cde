use axum::Json;

use crate::status_payload::StatusPayload;

pub async fn health() -> Json<StatusPayload> {
    Json(StatusPayload::ok("Backend server running"))
}
