//! The ingestion pipeline
//!
//! One ingestion runs per upload request, strictly sequential:
//! stage → probe → rewrite → upload → commit. The commit is the only
//! point at which externally visible state changes; everything before it
//! is invisible outside this process. Local artifacts are removed
//! best-effort on every terminal outcome.

use crate::keys::AssetKeyPolicy;
use crate::record::{VideoRecord, VideoStore};
use crate::staging::{ArtifactGuard, StagedUpload};
use crate::tools::MediaTools;
use crate::uploader::ObjectStore;
use common::error::AppResult;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex as StdMutex, Weak};
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

/// Per-video commit locks.
///
/// Entries are held weakly and pruned on every acquire, so the map stays
/// bounded by the number of in-flight ingestions rather than growing by
/// one entry per video ever ingested.
struct CommitLocks {
    inner: StdMutex<HashMap<Uuid, Weak<Mutex<()>>>>,
}

impl CommitLocks {
    fn new() -> Self {
        Self {
            inner: StdMutex::new(HashMap::new()),
        }
    }

    /// Get the lock for `video_id`, creating it if no request holds one
    fn acquire(&self, video_id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        locks.retain(|_, weak| weak.strong_count() > 0);

        if let Some(existing) = locks.get(&video_id).and_then(Weak::upgrade) {
            return existing;
        }

        let lock = Arc::new(Mutex::new(()));
        locks.insert(video_id, Arc::downgrade(&lock));
        lock
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

/// Orchestrates a single video ingestion from staged bytes to a committed
/// playback URL.
///
/// Holds no per-request state; concurrent ingestions share only the
/// record store, the object store and the per-video commit locks.
pub struct IngestionPipeline {
    tools: Arc<dyn MediaTools>,
    objects: Arc<dyn ObjectStore>,
    records: Arc<dyn VideoStore>,
    keys: Arc<dyn AssetKeyPolicy>,
    tmp_dir: PathBuf,
    // Staging paths are unique per request, so concurrent uploads of the
    // same video cannot corrupt each other's bytes; these locks serialize
    // only their commit steps so final-URL writes do not race.
    commit_locks: CommitLocks,
}

impl IngestionPipeline {
    pub fn new(
        tools: Arc<dyn MediaTools>,
        objects: Arc<dyn ObjectStore>,
        records: Arc<dyn VideoStore>,
        keys: Arc<dyn AssetKeyPolicy>,
        tmp_dir: PathBuf,
    ) -> Self {
        Self {
            tools,
            objects,
            records,
            keys,
            tmp_dir,
            commit_locks: CommitLocks::new(),
        }
    }

    /// Open a staging file for one upload request
    ///
    /// Callers must have already checked ownership and the declared media
    /// type, so no temporary file is created for a rejected request.
    pub async fn begin_staging(&self, video_id: Uuid, limit: u64) -> AppResult<StagedUpload> {
        StagedUpload::create(&self.tmp_dir, video_id, limit).await
    }

    /// Run a fully staged upload through probe, rewrite, upload and commit
    ///
    /// On success the returned record carries the new playback URL and has
    /// been handed to the record store. On any failure the error names the
    /// stage that aborted the ingestion. Both local artifacts are removed
    /// on every path; a commit failure leaves the already-uploaded object
    /// orphaned at its derived key, which is accepted and not reconciled
    /// here.
    pub async fn ingest(
        &self,
        mut record: VideoRecord,
        media_type: &str,
        staged: StagedUpload,
    ) -> AppResult<VideoRecord> {
        // `staged` and the rewrite guard clean up on drop, so every exit
        // below, including cancellation, releases both local artifacts.
        let _rewrite_guard = ArtifactGuard::new(self.tools.rewritten_path(staged.path()));

        info!(video_id = %record.id, bytes = staged.len(), "ingestion staged");

        let dimensions = self.tools.probe(staged.path()).await?;
        let geometry = dimensions.classify();
        info!(
            video_id = %record.id,
            width = dimensions.width,
            height = dimensions.height,
            %geometry,
            "ingestion probed"
        );

        let rewritten = self.tools.rewrite(staged.path()).await?;
        info!(video_id = %record.id, "ingestion rewritten");

        let key = self.keys.derive_key(record.id, media_type, geometry)?;
        let url = self.objects.put(&key, &rewritten, media_type).await?;
        info!(video_id = %record.id, key, "ingestion uploaded");

        let lock = self.commit_locks.acquire(record.id);
        let _guard = lock.lock().await;

        record.playback_url = Some(url);
        self.records.update(&record).await?;
        info!(video_id = %record.id, "ingestion committed");

        Ok(record)
    }
}
