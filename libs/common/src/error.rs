//! Custom error types shared across services
//!
//! This module defines the application-wide error taxonomy used by the
//! ingestion pipeline and the API service, plus database-specific errors
//! for connection pool management.

use sqlx::Error as SqlxError;
use std::fmt;
use thiserror::Error;

/// Operation during which a tool or storage failure occurred
///
/// Most variants are stages of the video ingestion pipeline; `Thumbnail`
/// tags failures of the thumbnail store, which sits outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStage {
    /// Record-store lookup, before any temporary file exists
    Lookup,
    /// Writing the upload body to local temporary storage
    Staging,
    /// Geometry probe of the staged file
    Probe,
    /// Fast-start container rewrite
    Rewrite,
    /// Object-store upload of the rewritten artifact
    Upload,
    /// Record-store update with the new playback URL
    Commit,
    /// Thumbnail store read or write
    Thumbnail,
}

impl fmt::Display for IngestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IngestStage::Lookup => "lookup",
            IngestStage::Staging => "staging",
            IngestStage::Probe => "probe",
            IngestStage::Rewrite => "rewrite",
            IngestStage::Upload => "upload",
            IngestStage::Commit => "commit",
            IngestStage::Thumbnail => "thumbnail",
        };
        write!(f, "{}", name)
    }
}

/// Application error taxonomy
///
/// `BadRequest`, `Unauthorized`, `Forbidden` and `NotFound` are detected
/// before any temporary file is created and surface directly with no retry.
/// `Tool` and `Storage` abort an ingestion at the stage they carry; neither
/// is retried automatically.
#[derive(Error, Debug)]
pub enum AppError {
    /// Client input malformed: size, type, missing field, missing id
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing or invalid bearer token
    #[error("unauthorized")]
    Unauthorized,

    /// Caller is not the owning user
    #[error("forbidden")]
    Forbidden,

    /// Record does not exist
    #[error("not found")]
    NotFound,

    /// A media tool subprocess exited non-zero or produced unparsable output
    #[error("{stage} tool failure: {message}")]
    Tool { stage: IngestStage, message: String },

    /// An object-store, record-store or local storage call failed
    #[error("{stage} storage failure: {message}")]
    Storage { stage: IngestStage, message: String },
}

impl AppError {
    /// Build a tool failure for the given stage
    pub fn tool(stage: IngestStage, message: impl Into<String>) -> Self {
        AppError::Tool {
            stage,
            message: message.into(),
        }
    }

    /// Build a storage failure for the given stage
    pub fn storage(stage: IngestStage, message: impl Into<String>) -> Self {
        AppError::Storage {
            stage,
            message: message.into(),
        }
    }
}

/// Type alias for results carrying an [`AppError`]
pub type AppResult<T> = Result<T, AppError>;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_display_matches_pipeline_names() {
        assert_eq!(IngestStage::Staging.to_string(), "staging");
        assert_eq!(IngestStage::Commit.to_string(), "commit");
    }

    #[test]
    fn tool_error_carries_stage_and_message() {
        let err = AppError::tool(IngestStage::Probe, "no video stream");
        assert_eq!(err.to_string(), "probe tool failure: no video stream");
    }

    #[test]
    fn thumbnail_store_failures_are_not_tagged_with_pipeline_stages() {
        let err = AppError::storage(IngestStage::Thumbnail, "disk full");
        assert_eq!(err.to_string(), "thumbnail storage failure: disk full");
    }
}
