use crate::models::*;
use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

/// Multipart field the relay reads the PDF from.
pub const UPLOAD_FIELD: &str = "pdf";

/// Client for the relay's `/`, `/upload` and `/ask` routes.
#[derive(Debug, Clone)]
pub struct RelayClient {
    client: Client,
    base_url: String,
}

impl RelayClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build().context("failed to build HTTP client")?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health(&self) -> Result<Value> {
        let response = self
            .client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .context("relay is unreachable")?;

        Self::decode(response).await
    }

    pub async fn upload_pdf(&self, path: &Path) -> Result<ProcessReport> {
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload.pdf".to_string());

        log::info!("Uploading {} ({} bytes)", file_name, data.len());

        let part = Part::bytes(data)
            .file_name(file_name)
            .mime_str("application/pdf")?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let response = self
            .client
            .post(format!("{}/upload", self.base_url))
            .multipart(form)
            .send()
            .await
            .context("upload request failed")?;

        Self::decode(response).await
    }

    pub async fn ask(&self, request: &AskRequest) -> Result<AskReply> {
        let response = self
            .client
            .post(format!("{}/ask", self.base_url))
            .json(request)
            .send()
            .await
            .context("ask request failed")?;

        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<Value>(&error_text)
                .ok()
                .and_then(|v| v["message"].as_str().map(str::to_string))
                .unwrap_or(error_text);
            return Err(anyhow::anyhow!("relay returned {}: {}", status, message));
        }

        response
            .json::<T>()
            .await
            .context("relay returned an unexpected body")
    }
}
