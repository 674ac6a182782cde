use serde::{Deserialize, Serialize};

/// The `{status, message}` body the relay produces on its own, as opposed to
/// payloads relayed from the RAG service.
#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct StatusPayload {
    pub status: String,
    pub message: String,
}

impl StatusPayload {
    pub fn ok(message: &str) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.to_string(),
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            status: "error".to_string(),
            message: message.to_string(),
        }
    }
}
