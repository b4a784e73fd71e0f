//! Fast-start container rewriting via ffmpeg
//!
//! Relocates the MP4 index atom to the front of the file so playback can
//! begin before the full file downloads. Streams are copied bit-exact;
//! this is a container operation, not a transcode.

use crate::process::ProcessRunner;
use common::error::{AppError, AppResult, IngestStage};
use std::path::{Path, PathBuf};
use tracing::info;

/// Rewrites local media files for progressive playback
pub struct FastStartRewriter;

impl FastStartRewriter {
    /// Output path for a given input, derived deterministically so a
    /// caller can predict it and clean it up even after a crash
    /// mid-pipeline.
    pub fn output_path(input: &Path) -> PathBuf {
        input.with_extension("faststart.mp4")
    }

    /// Produce a playback-optimized copy of `input` without re-encoding
    ///
    /// Fails with the tool's diagnostic text if ffmpeg exits non-zero.
    pub async fn rewrite(input: &Path) -> AppResult<PathBuf> {
        let output = Self::output_path(input);
        let input_str = input.to_string_lossy();
        let output_str = output.to_string_lossy();

        info!(input = %input_str, output = %output_str, "rewriting container for fast start");

        let result = ProcessRunner::run(
            "ffmpeg",
            [
                "-y",
                "-i",
                input_str.as_ref(),
                "-movflags",
                "+faststart",
                "-map_metadata",
                "0",
                "-c",
                "copy",
                "-f",
                "mp4",
                output_str.as_ref(),
            ],
        )
        .await
        .map_err(|e| {
            AppError::tool(IngestStage::Rewrite, format!("failed to run ffmpeg: {}", e))
        })?;

        if !result.success() {
            return Err(AppError::tool(
                IngestStage::Rewrite,
                format!("ffmpeg exited with {}: {}", result.status, result.stderr.trim()),
            ));
        }

        Ok(output)
    }
}
