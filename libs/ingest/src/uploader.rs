//! Object-store upload of local playback assets

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use common::error::{AppError, AppResult, IngestStage};
use std::path::Path;
use tracing::info;

/// Durable key→object storage for playback assets
///
/// A put either stores the complete object or none of it; per-key
/// atomicity is the store's own guarantee, this seam adds nothing beyond
/// a single put call. Rollback, if any, is the pipeline's responsibility.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload the file's full current contents under exactly `key`,
    /// returning the public URL the object is durably readable at.
    async fn put(&self, key: &str, local_path: &Path, content_type: &str) -> AppResult<String>;
}

/// S3-backed object store
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    region: String,
}

impl S3ObjectStore {
    pub fn new(client: Client, bucket: String, region: String) -> Self {
        Self {
            client,
            bucket,
            region,
        }
    }

    /// Public URL of an object: a pure function of bucket, region and key
    pub fn public_url(&self, key: &str) -> String {
        public_url(&self.bucket, &self.region, key)
    }
}

/// Deterministic public URL for an S3 object
pub fn public_url(bucket: &str, region: &str, key: &str) -> String {
    format!("https://{}.s3.{}.amazonaws.com/{}", bucket, region, key)
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, key: &str, local_path: &Path, content_type: &str) -> AppResult<String> {
        info!(bucket = %self.bucket, key, "uploading playback asset to S3");

        let body = ByteStream::from_path(local_path).await.map_err(|e| {
            AppError::storage(
                IngestStage::Upload,
                format!("failed to open {}: {}", local_path.display(), e),
            )
        })?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                AppError::storage(IngestStage::Upload, format!("S3 put_object failed: {}", e))
            })?;

        Ok(self.public_url(key))
    }
}
