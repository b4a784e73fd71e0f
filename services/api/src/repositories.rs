//! Video repository for database operations

use async_trait::async_trait;
use chrono::Utc;
use common::error::{AppError, AppResult, IngestStage};
use ingest::record::{VideoRecord, VideoStore};
use sqlx::{PgPool, Row};
use uuid::Uuid;

/// Video repository for database operations
#[derive(Clone)]
pub struct VideoRepository {
    pool: PgPool,
}

impl VideoRepository {
    /// Create a new video repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a video record by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Option<VideoRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, title, description, playback_url, thumbnail_url,
                   created_at, updated_at
            FROM videos
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::storage(IngestStage::Lookup, format!("failed to fetch video: {}", e))
        })?;

        match row {
            Some(row) => {
                let record = VideoRecord {
                    id: row.get("id"),
                    user_id: row.get("user_id"),
                    title: row.get("title"),
                    description: row.get("description"),
                    playback_url: row.get("playback_url"),
                    thumbnail_url: row.get("thumbnail_url"),
                    created_at: row.get("created_at"),
                    updated_at: row.get("updated_at"),
                };
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Replace the mutable fields of a stored video record
    pub async fn update_record(&self, record: &VideoRecord) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE videos
            SET title = $2, description = $3, playback_url = $4,
                thumbnail_url = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(record.id)
        .bind(&record.title)
        .bind(&record.description)
        .bind(&record.playback_url)
        .bind(&record.thumbnail_url)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::storage(IngestStage::Commit, format!("failed to update video: {}", e))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }
}

#[async_trait]
impl VideoStore for VideoRepository {
    async fn get(&self, id: Uuid) -> AppResult<Option<VideoRecord>> {
        self.get_by_id(id).await
    }

    async fn update(&self, record: &VideoRecord) -> AppResult<()> {
        self.update_record(record).await
    }
}
