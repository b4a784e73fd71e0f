//! Service configuration loaded from environment variables

use std::env;
use std::path::PathBuf;

/// Accepted container type for video uploads
pub const VIDEO_MP4: &str = "video/mp4";

/// Hard cap on an uploaded video body: 1 GiB
pub const MAX_VIDEO_BYTES: u64 = 1024 * 1024 * 1024;

/// Hard cap on an uploaded thumbnail: 5 MiB
pub const MAX_THUMBNAIL_BYTES: u64 = 5 * 1024 * 1024;

/// Storage-key derivation strategy for playback assets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPolicyKind {
    /// `<geometry>/<video_id>.mp4`, grouped by orientation
    Orientation,
    /// Urlsafe-base64 of 32 random bytes plus a type-derived extension
    Random,
}

/// Thumbnail storage backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailStoreKind {
    /// File per video under a configured directory
    Disk,
    /// Process-memory map; ephemeral, lost on restart
    Memory,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// S3 bucket holding playback assets
    pub s3_bucket: String,
    /// S3 region, part of the public URL
    pub s3_region: String,
    /// Directory for staged uploads and rewritten artifacts
    pub tmp_dir: PathBuf,
    /// Active storage-key strategy
    pub key_policy: KeyPolicyKind,
    /// Active thumbnail backend
    pub thumbnail_store: ThumbnailStoreKind,
    /// Directory for the disk thumbnail backend
    pub thumbnail_dir: PathBuf,
    /// HMAC secret for verifying bearer tokens
    pub jwt_secret: String,
    /// Listen address for the HTTP server
    pub bind_addr: String,
}

impl AppConfig {
    /// Create a new AppConfig from environment variables
    ///
    /// # Environment Variables
    /// - `MEDIA_BUCKET_NAME`: S3 bucket for playback assets (default: `media-bucket`)
    /// - `AWS_REGION`: S3 region (default: `us-east-1`)
    /// - `TMP_DIR`: staging directory (default: `/tmp/clipdeck`)
    /// - `KEY_POLICY`: `orientation` or `random` (default: `orientation`)
    /// - `THUMBNAIL_STORE`: `disk` or `memory` (default: `disk`)
    /// - `THUMBNAIL_DIR`: directory for the disk backend (default: `/var/lib/clipdeck/thumbnails`)
    /// - `JWT_SECRET`: HMAC secret for token verification (required)
    /// - `BIND_ADDR`: listen address (default: `0.0.0.0:3000`)
    pub fn from_env() -> Result<Self, String> {
        let s3_bucket =
            env::var("MEDIA_BUCKET_NAME").unwrap_or_else(|_| "media-bucket".to_string());
        let s3_region = env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string());

        let tmp_dir = env::var("TMP_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp/clipdeck"));

        let key_policy = match env::var("KEY_POLICY").as_deref() {
            Ok("random") => KeyPolicyKind::Random,
            Ok("orientation") | Err(_) => KeyPolicyKind::Orientation,
            Ok(other) => return Err(format!("Unknown KEY_POLICY: {}", other)),
        };

        let thumbnail_store = match env::var("THUMBNAIL_STORE").as_deref() {
            Ok("memory") => ThumbnailStoreKind::Memory,
            Ok("disk") | Err(_) => ThumbnailStoreKind::Disk,
            Ok(other) => return Err(format!("Unknown THUMBNAIL_STORE: {}", other)),
        };

        let thumbnail_dir = env::var("THUMBNAIL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/var/lib/clipdeck/thumbnails"));

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| "JWT_SECRET environment variable not set".to_string())?;

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        Ok(Self {
            s3_bucket,
            s3_region,
            tmp_dir,
            key_policy,
            thumbnail_store,
            thumbnail_dir,
            jwt_secret,
            bind_addr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_config_defaults() {
        unsafe {
            env::set_var("JWT_SECRET", "test-secret");
            env::remove_var("KEY_POLICY");
            env::remove_var("THUMBNAIL_STORE");
        }

        let config = AppConfig::from_env().expect("Failed to create config");
        assert_eq!(config.key_policy, KeyPolicyKind::Orientation);
        assert_eq!(config.thumbnail_store, ThumbnailStoreKind::Disk);
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
    }

    #[test]
    #[serial]
    fn test_config_requires_jwt_secret() {
        unsafe {
            env::remove_var("JWT_SECRET");
        }

        assert!(AppConfig::from_env().is_err());
    }

    #[test]
    #[serial]
    fn test_config_random_key_policy() {
        unsafe {
            env::set_var("JWT_SECRET", "test-secret");
            env::set_var("KEY_POLICY", "random");
        }

        let config = AppConfig::from_env().expect("Failed to create config");
        assert_eq!(config.key_policy, KeyPolicyKind::Random);

        unsafe {
            env::remove_var("KEY_POLICY");
        }
    }
}
