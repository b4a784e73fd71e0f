//! Video record model and the record-store seam

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::AppResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A video record as held by the record store
///
/// `playback_url` stays `None` until an ingestion commits successfully;
/// it is never set to a partially uploaded or unverified location. The
/// pipeline mutates a transient copy of this struct and hands it back to
/// the store through a single update call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub playback_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Record store for video metadata
///
/// Single-row semantics are assumed atomic; no transactions are exposed.
/// Updates are last-writer-wins, no optimistic concurrency token.
#[async_trait]
pub trait VideoStore: Send + Sync {
    /// Fetch a record by id
    async fn get(&self, id: Uuid) -> AppResult<Option<VideoRecord>>;

    /// Replace the stored row with `record`
    async fn update(&self, record: &VideoRecord) -> AppResult<()>;
}
