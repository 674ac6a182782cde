use anyhow::{Context, Result};
use axum::extract::multipart::Field;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Local directory where uploads are parked while the RAG service reads them.
#[derive(Debug, Clone)]
pub struct ScratchDir {
    root: PathBuf,
}

impl ScratchDir {
    /// Create the directory if needed and pin it to an absolute path.
    pub async fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .await
            .with_context(|| format!("failed to create upload dir {}", dir.display()))?;
        let root = fs::canonicalize(dir)
            .await
            .with_context(|| format!("failed to resolve upload dir {}", dir.display()))?;

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Stream a multipart field to a freshly named file. The file is removed
    /// when the returned handle is dropped unless it was retained.
    pub async fn persist(&self, mut field: Field<'_>) -> Result<ScratchFile> {
        let original_name = field.file_name().unwrap_or("unnamed").to_string();
        let name = Uuid::new_v4().simple().to_string();
        let (file, guard) = tempfile::Builder::new()
            .prefix(&name)
            .rand_bytes(0)
            .tempfile_in(&self.root)
            .with_context(|| format!("failed to create scratch file in {}", self.root.display()))?
            .into_parts();

        let scratch = ScratchFile {
            path: guard.to_path_buf(),
            guard: Some(guard),
        };
        let mut file = fs::File::from_std(file);

        let mut written = 0usize;
        while let Some(chunk) = field.chunk().await.context("failed to read upload body")? {
            file.write_all(&chunk).await?;
            written += chunk.len();
        }
        file.flush().await?;

        log::info!(
            "Stored upload '{}' ({} bytes) at {}",
            original_name,
            written,
            scratch.path.display()
        );
        Ok(scratch)
    }
}

/// One persisted upload, addressed by absolute path. Dropping it deletes the
/// file, so an abandoned request does not leave it behind.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
    guard: Option<TempPath>,
}

impl ScratchFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Detach the file from the handle so it outlives the request.
    pub fn retain(&mut self) {
        if let Some(guard) = self.guard.take() {
            if let Err(e) = guard.keep() {
                log::warn!("Failed to retain scratch file {}: {}", self.path.display(), e);
            }
        }
    }

    pub fn discard(mut self) {
        if let Some(guard) = self.guard.take() {
            if let Err(e) = guard.close() {
                log::warn!("Failed to remove scratch file {}: {}", self.path.display(), e);
            }
        }
    }
}
