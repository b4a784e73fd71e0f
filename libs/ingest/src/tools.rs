//! Media tool capability seam
//!
//! The pipeline talks to its external tools through this trait so either
//! tool can be swapped (for a pure-library rewriter, or fakes in tests)
//! without touching the pipeline state machine.

use crate::faststart::FastStartRewriter;
use crate::probe::{Dimensions, GeometryProbe};
use async_trait::async_trait;
use common::error::AppResult;
use std::path::{Path, PathBuf};

/// Probing and rewriting capabilities over a local media file
#[async_trait]
pub trait MediaTools: Send + Sync {
    /// Extract the first video stream's dimensions
    async fn probe(&self, input: &Path) -> AppResult<Dimensions>;

    /// Predict the rewrite output path for `input` without running anything
    fn rewritten_path(&self, input: &Path) -> PathBuf;

    /// Produce a fast-start copy of `input`, returning its path
    async fn rewrite(&self, input: &Path) -> AppResult<PathBuf>;
}

/// The production implementation: ffprobe + ffmpeg subprocesses
pub struct FfmpegTools;

#[async_trait]
impl MediaTools for FfmpegTools {
    async fn probe(&self, input: &Path) -> AppResult<Dimensions> {
        GeometryProbe::probe(input).await
    }

    fn rewritten_path(&self, input: &Path) -> PathBuf {
        FastStartRewriter::output_path(input)
    }

    async fn rewrite(&self, input: &Path) -> AppResult<PathBuf> {
        FastStartRewriter::rewrite(input).await
    }
}
