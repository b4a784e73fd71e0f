//! Video ingestion library for the clipdeck application
//!
//! Accepts an uploaded video file, determines its geometry, rewrites the
//! container for fast-start playback, uploads the result to object
//! storage under a collision-resistant key and commits the playback URL
//! to the owning record. Temporary local resources are released on every
//! path.

pub mod faststart;
pub mod keys;
pub mod pipeline;
pub mod probe;
pub mod process;
pub mod record;
pub mod staging;
pub mod tools;
pub mod uploader;

pub use keys::{AssetKeyPolicy, OrientationKeyPolicy, RandomKeyPolicy, policy_for};
pub use pipeline::IngestionPipeline;
pub use probe::{Dimensions, Geometry};
pub use record::{VideoRecord, VideoStore};
pub use staging::StagedUpload;
pub use tools::{FfmpegTools, MediaTools};
pub use uploader::{ObjectStore, S3ObjectStore, public_url};
