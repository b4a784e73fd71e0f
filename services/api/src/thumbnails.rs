//! Thumbnail storage backends
//!
//! Simple key→blob stores behind an injected abstraction. The disk
//! variant is the production choice; the memory variant is explicitly
//! ephemeral — its contents live as long as the process and are lost on
//! restart.

use async_trait::async_trait;
use common::config::{AppConfig, ThumbnailStoreKind};
use common::error::{AppError, AppResult, IngestStage};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A stored thumbnail blob with its media type
#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub bytes: Vec<u8>,
    pub media_type: String,
}

/// Key→blob store for video thumbnails
#[async_trait]
pub trait ThumbnailStore: Send + Sync {
    /// Store a thumbnail, returning the URL it is served at
    async fn put(&self, video_id: Uuid, bytes: Vec<u8>, media_type: &str) -> AppResult<String>;

    /// Fetch a thumbnail by video id
    async fn get(&self, video_id: Uuid) -> AppResult<Option<Thumbnail>>;
}

/// URL path a stored thumbnail is served back at
fn thumbnail_url(video_id: Uuid) -> String {
    format!("/videos/{}/thumbnail", video_id)
}

/// File extension for an accepted thumbnail media type
fn extension_for(media_type: &str) -> AppResult<&'static str> {
    match media_type {
        "image/jpeg" => Ok("jpg"),
        "image/png" => Ok("png"),
        other => Err(AppError::BadRequest(format!(
            "unsupported thumbnail type: {}",
            other
        ))),
    }
}

fn media_type_for(extension: &str) -> Option<&'static str> {
    match extension {
        "jpg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        _ => None,
    }
}

/// Disk-backed thumbnail store: one file per video, the extension
/// encoding the media type.
pub struct DiskThumbnailStore {
    dir: PathBuf,
}

impl DiskThumbnailStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, video_id: Uuid, extension: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", video_id, extension))
    }
}

#[async_trait]
impl ThumbnailStore for DiskThumbnailStore {
    async fn put(&self, video_id: Uuid, bytes: Vec<u8>, media_type: &str) -> AppResult<String> {
        let extension = extension_for(media_type)?;

        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            AppError::storage(
                IngestStage::Thumbnail,
                format!("failed to create thumbnail dir: {}", e),
            )
        })?;

        // Drop the other variant so a re-upload with a new type does not
        // leave two candidates behind.
        for ext in ["jpg", "png"] {
            if ext != extension {
                let _ = tokio::fs::remove_file(self.path_for(video_id, ext)).await;
            }
        }

        let path = self.path_for(video_id, extension);
        tokio::fs::write(&path, bytes).await.map_err(|e| {
            AppError::storage(
                IngestStage::Thumbnail,
                format!("failed to write thumbnail: {}", e),
            )
        })?;

        Ok(thumbnail_url(video_id))
    }

    async fn get(&self, video_id: Uuid) -> AppResult<Option<Thumbnail>> {
        for ext in ["jpg", "png"] {
            let path = self.path_for(video_id, ext);
            match tokio::fs::read(&path).await {
                Ok(bytes) => {
                    let media_type = media_type_for(ext).unwrap_or("application/octet-stream");
                    return Ok(Some(Thumbnail {
                        bytes,
                        media_type: media_type.to_string(),
                    }));
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(AppError::storage(
                        IngestStage::Thumbnail,
                        format!("failed to read thumbnail: {}", e),
                    ));
                }
            }
        }

        Ok(None)
    }
}

/// Process-memory thumbnail store.
///
/// Non-durable: contents are scoped to the process lifetime and lost on
/// restart. Only suitable when ephemeral thumbnails are acceptable.
#[derive(Default)]
pub struct MemoryThumbnailStore {
    blobs: RwLock<HashMap<Uuid, Thumbnail>>,
}

#[async_trait]
impl ThumbnailStore for MemoryThumbnailStore {
    async fn put(&self, video_id: Uuid, bytes: Vec<u8>, media_type: &str) -> AppResult<String> {
        extension_for(media_type)?;

        self.blobs.write().await.insert(
            video_id,
            Thumbnail {
                bytes,
                media_type: media_type.to_string(),
            },
        );

        Ok(thumbnail_url(video_id))
    }

    async fn get(&self, video_id: Uuid) -> AppResult<Option<Thumbnail>> {
        Ok(self.blobs.read().await.get(&video_id).cloned())
    }
}

/// Build the configured thumbnail store
pub fn store_for(config: &AppConfig) -> Arc<dyn ThumbnailStore> {
    match config.thumbnail_store {
        ThumbnailStoreKind::Disk => Arc::new(DiskThumbnailStore::new(config.thumbnail_dir.clone())),
        ThumbnailStoreKind::Memory => Arc::new(MemoryThumbnailStore::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn memory_store_round_trips_a_blob() {
        let store = MemoryThumbnailStore::default();
        let id = Uuid::new_v4();

        let url = store
            .put(id, vec![1, 2, 3], "image/png")
            .await
            .expect("put failed");
        assert_eq!(url, format!("/videos/{}/thumbnail", id));

        let thumb = store.get(id).await.unwrap().expect("expected thumbnail");
        assert_eq!(thumb.bytes, vec![1, 2, 3]);
        assert_eq!(thumb.media_type, "image/png");
    }

    #[tokio::test]
    async fn memory_store_misses_unknown_ids() {
        let store = MemoryThumbnailStore::default();
        assert!(store.get(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn disk_store_round_trips_a_blob() {
        let dir = TempDir::new().unwrap();
        let store = DiskThumbnailStore::new(dir.path().to_path_buf());
        let id = Uuid::new_v4();

        store
            .put(id, vec![0xff, 0xd8], "image/jpeg")
            .await
            .expect("put failed");

        let thumb = store.get(id).await.unwrap().expect("expected thumbnail");
        assert_eq!(thumb.bytes, vec![0xff, 0xd8]);
        assert_eq!(thumb.media_type, "image/jpeg");
    }

    #[tokio::test]
    async fn disk_store_replaces_the_old_variant_on_type_change() {
        let dir = TempDir::new().unwrap();
        let store = DiskThumbnailStore::new(dir.path().to_path_buf());
        let id = Uuid::new_v4();

        store.put(id, vec![1], "image/jpeg").await.unwrap();
        store.put(id, vec![2], "image/png").await.unwrap();

        let thumb = store.get(id).await.unwrap().expect("expected thumbnail");
        assert_eq!(thumb.bytes, vec![2]);
        assert_eq!(thumb.media_type, "image/png");
    }

    #[tokio::test]
    async fn disk_failures_carry_the_thumbnail_stage() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();

        // The store dir path is an existing file, so the write must fail
        // and must not be reported as an ingestion-stage failure.
        let store = DiskThumbnailStore::new(blocker);
        let err = store
            .put(Uuid::new_v4(), vec![1], "image/jpeg")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Storage {
                stage: IngestStage::Thumbnail,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn stores_reject_unsupported_types() {
        let store = MemoryThumbnailStore::default();
        let result = store.put(Uuid::new_v4(), vec![1], "image/gif").await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
