//! Local staging of inbound upload bodies
//!
//! An upload body is streamed to a temporary file before any processing.
//! Staging paths carry a per-request random token next to the video id,
//! so two concurrent uploads of the same video never share a local path;
//! collision avoidance at the object-store level is the key policy's job.

use common::error::{AppError, AppResult, IngestStage};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::warn;
use uuid::Uuid;

/// Remove a local artifact, swallowing failures.
///
/// Removal failures do not affect correctness of the served system, only
/// disk hygiene, so they are logged and never surfaced.
pub(crate) fn remove_best_effort(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "failed to remove local artifact");
        }
    }
}

/// A staged upload body on local disk
///
/// Created once the caller starts streaming the body in; the backing file
/// is removed best-effort when this value drops, so a dropped request
/// (client disconnect included) still cleans up after itself.
pub struct StagedUpload {
    path: PathBuf,
    file: Option<File>,
    bytes_written: u64,
    limit: u64,
}

impl StagedUpload {
    /// Create the staging file for one upload request
    ///
    /// The path is `<tmp_dir>/<video_id>-<request_token>.upload`; the
    /// token makes it unique per request.
    pub async fn create(tmp_dir: &Path, video_id: Uuid, limit: u64) -> AppResult<Self> {
        tokio::fs::create_dir_all(tmp_dir).await.map_err(|e| {
            AppError::storage(
                IngestStage::Staging,
                format!("failed to create staging dir: {}", e),
            )
        })?;

        let path = tmp_dir.join(format!("{}-{}.upload", video_id, Uuid::new_v4()));
        let file = File::create(&path).await.map_err(|e| {
            AppError::storage(
                IngestStage::Staging,
                format!("failed to create staging file: {}", e),
            )
        })?;

        Ok(Self {
            path,
            file: Some(file),
            bytes_written: 0,
            limit,
        })
    }

    /// Append one chunk of the upload body
    ///
    /// Rejects the request as soon as the size cap is crossed, before the
    /// rest of the body is buffered.
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> AppResult<()> {
        if self.bytes_written + chunk.len() as u64 > self.limit {
            return Err(AppError::BadRequest(format!(
                "video exceeds the {} byte limit",
                self.limit
            )));
        }

        let file = self.file.as_mut().ok_or_else(|| {
            AppError::storage(IngestStage::Staging, "staging file already finished")
        })?;

        file.write_all(chunk).await.map_err(|e| {
            AppError::storage(IngestStage::Staging, format!("failed to write upload: {}", e))
        })?;

        self.bytes_written += chunk.len() as u64;
        Ok(())
    }

    /// Flush and close the staging file once the body is fully received
    pub async fn finish(&mut self) -> AppResult<()> {
        if let Some(mut file) = self.file.take() {
            file.flush().await.map_err(|e| {
                AppError::storage(IngestStage::Staging, format!("failed to flush upload: {}", e))
            })?;
        }
        Ok(())
    }

    /// Path of the staged file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes received so far
    pub fn len(&self) -> u64 {
        self.bytes_written
    }

    pub fn is_empty(&self) -> bool {
        self.bytes_written == 0
    }
}

impl Drop for StagedUpload {
    fn drop(&mut self) {
        // Close the handle before unlinking.
        self.file.take();
        remove_best_effort(&self.path);
    }
}

/// Best-effort removal guard for a predicted artifact path
///
/// Used for the rewrite output: the path is known before the tool runs,
/// so a partial output left by a failed or cancelled rewrite is still
/// removed.
pub(crate) struct ArtifactGuard {
    path: PathBuf,
}

impl ArtifactGuard {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Drop for ArtifactGuard {
    fn drop(&mut self) {
        remove_best_effort(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn stages_bytes_to_a_unique_path() {
        let dir = TempDir::new().unwrap();
        let id = Uuid::new_v4();

        let mut first = StagedUpload::create(dir.path(), id, 1024).await.unwrap();
        let second = StagedUpload::create(dir.path(), id, 1024).await.unwrap();
        assert_ne!(first.path(), second.path());

        first.write_chunk(b"hello ").await.unwrap();
        first.write_chunk(b"world").await.unwrap();
        first.finish().await.unwrap();

        let contents = std::fs::read(first.path()).unwrap();
        assert_eq!(contents, b"hello world");
        assert_eq!(first.len(), 11);
    }

    #[tokio::test]
    async fn rejects_bytes_past_the_cap() {
        let dir = TempDir::new().unwrap();
        let mut staged = StagedUpload::create(dir.path(), Uuid::new_v4(), 8)
            .await
            .unwrap();

        // Exactly at the cap is accepted.
        staged.write_chunk(b"12345678").await.unwrap();

        // One byte past the cap is rejected.
        let err = staged.write_chunk(b"9").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn removes_file_on_drop() {
        let dir = TempDir::new().unwrap();
        let path;
        {
            let mut staged = StagedUpload::create(dir.path(), Uuid::new_v4(), 64)
                .await
                .unwrap();
            staged.write_chunk(b"data").await.unwrap();
            path = staged.path().to_path_buf();
            assert!(path.exists());
        }
        assert!(!path.exists());
    }
}
