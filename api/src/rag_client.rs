use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

use crate::config::RelayConfig;

#[derive(Debug, Serialize)]
struct ProcessRequest<'a> {
    #[serde(rename = "filePath")]
    file_path: &'a str,
}

/// HTTP client for the external RAG service. Responses are returned as raw
/// JSON; the relay never interprets them.
#[derive(Debug, Clone)]
pub struct RagClient {
    client: Client,
    process_url: String,
    ask_url: String,
}

impl RagClient {
    pub fn new(config: &RelayConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.rag_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("failed to build RAG service client")?;

        Ok(Self {
            client,
            process_url: config.process_url(),
            ask_url: config.ask_url(),
        })
    }

    /// Ask the service to ingest the file at `file_path`.
    pub async fn process(&self, file_path: &Path) -> Result<Value> {
        let file_path = file_path
            .to_str()
            .context("upload path is not valid UTF-8")?;
        let request = ProcessRequest { file_path };

        let response = self
            .client
            .post(&self.process_url)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("POST {} failed", self.process_url))?;

        Self::relay_json(response).await
    }

    /// Forward a question body as-is.
    pub async fn ask(&self, body: &Value) -> Result<Value> {
        let response = self
            .client
            .post(&self.ask_url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("POST {} failed", self.ask_url))?;

        Self::relay_json(response).await
    }

    async fn relay_json(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "RAG service returned {}: {}",
                status,
                error_text
            ));
        }

        response
            .json::<Value>()
            .await
            .context("RAG service returned a non-JSON body")
    }
}
