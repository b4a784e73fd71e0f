//! Application state shared across handlers

use ingest::{IngestionPipeline, VideoStore};
use std::sync::Arc;

use crate::middleware::JwtVerifier;
use crate::thumbnails::ThumbnailStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub videos: Arc<dyn VideoStore>,
    pub pipeline: Arc<IngestionPipeline>,
    pub thumbnails: Arc<dyn ThumbnailStore>,
    pub jwt: JwtVerifier,
}
