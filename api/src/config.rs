use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime settings for the relay server.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Port the HTTP server listens on (default: 4000)
    pub port: u16,

    /// Base URL of the RAG service (default: "http://localhost:5000")
    pub rag_service_url: String,

    /// Scratch directory for uploaded files (default: "uploads")
    pub upload_dir: PathBuf,

    /// Multipart field carrying the uploaded file (default: "pdf")
    pub upload_field: String,

    /// Keep scratch files after they were handed to the RAG service (default: false)
    pub retain_uploads: bool,

    /// Request body cap for uploads; `None` leaves bodies unbounded
    pub max_upload_bytes: Option<usize>,

    /// Timeout for calls to the RAG service; `None` waits indefinitely
    pub rag_timeout: Option<Duration>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            port: 4000,
            rag_service_url: "http://localhost:5000".to_string(),
            upload_dir: PathBuf::from("uploads"),
            upload_field: "pdf".to_string(),
            retain_uploads: false,
            max_upload_bytes: None,
            rag_timeout: None,
        }
    }
}

impl RelayConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. Missing or
    /// unparsable values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();

        Self {
            port: lookup("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.port),

            rag_service_url: lookup("RAG_SERVICE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(default.rag_service_url),

            upload_dir: lookup("UPLOAD_DIR")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(default.upload_dir),

            upload_field: lookup("UPLOAD_FIELD")
                .filter(|v| !v.is_empty())
                .unwrap_or(default.upload_field),

            retain_uploads: lookup("RETAIN_UPLOADS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(default.retain_uploads),

            max_upload_bytes: lookup("MAX_UPLOAD_BYTES")
                .and_then(|v| v.parse().ok())
                .or(default.max_upload_bytes),

            rag_timeout: lookup("RAG_TIMEOUT_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .or(default.rag_timeout),
        }
    }

    pub fn process_url(&self) -> String {
        format!("{}/process", self.rag_service_url)
    }

    pub fn ask_url(&self) -> String {
        format!("{}/ask", self.rag_service_url)
    }
}
