//! Storage-key derivation for playback assets
//!
//! Two interchangeable strategies exist; the active one is a configuration
//! choice, not a per-request choice. A derived key is stable once chosen
//! and becomes part of the persisted playback URL.

use crate::probe::Geometry;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use common::config::{KeyPolicyKind, VIDEO_MP4};
use common::error::{AppError, AppResult};
use rand::RngCore;
use std::sync::Arc;
use uuid::Uuid;

/// Derives the object-store key for an uploaded playback asset
pub trait AssetKeyPolicy: Send + Sync {
    fn derive_key(&self, video_id: Uuid, media_type: &str, geometry: Geometry)
    -> AppResult<String>;
}

/// Map a declared media type to a key extension
///
/// Only `video/mp4` is accepted; anything else is a bad request.
pub fn extension_for(media_type: &str) -> AppResult<&'static str> {
    match media_type {
        VIDEO_MP4 => Ok(".mp4"),
        other => Err(AppError::BadRequest(format!(
            "unsupported media type: {}",
            other
        ))),
    }
}

/// `<geometry>/<video_id>.mp4` — groups playback files by orientation.
///
/// Human-inspectable, but a re-upload of the same video derives the same
/// key and overwrites the previous object. That overwrite is intentional.
pub struct OrientationKeyPolicy;

impl AssetKeyPolicy for OrientationKeyPolicy {
    fn derive_key(
        &self,
        video_id: Uuid,
        media_type: &str,
        geometry: Geometry,
    ) -> AppResult<String> {
        extension_for(media_type)?;
        Ok(format!("{}/{}.mp4", geometry, video_id))
    }
}

/// Urlsafe-base64 of 32 random bytes plus a type-derived extension.
///
/// No collisions and not enumerable, at the cost of losing the orientation
/// grouping.
pub struct RandomKeyPolicy;

impl AssetKeyPolicy for RandomKeyPolicy {
    fn derive_key(
        &self,
        _video_id: Uuid,
        media_type: &str,
        _geometry: Geometry,
    ) -> AppResult<String> {
        let ext = extension_for(media_type)?;

        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);

        Ok(format!("{}{}", URL_SAFE_NO_PAD.encode(bytes), ext))
    }
}

/// Build the configured key policy
pub fn policy_for(kind: KeyPolicyKind) -> Arc<dyn AssetKeyPolicy> {
    match kind {
        KeyPolicyKind::Orientation => Arc::new(OrientationKeyPolicy),
        KeyPolicyKind::Random => Arc::new(RandomKeyPolicy),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orientation_key_is_prefixed_by_geometry() {
        let id = Uuid::new_v4();
        let key = OrientationKeyPolicy
            .derive_key(id, VIDEO_MP4, Geometry::Landscape)
            .expect("expected key");

        assert_eq!(key, format!("landscape/{}.mp4", id));
    }

    #[test]
    fn orientation_key_is_stable_for_same_inputs() {
        let id = Uuid::new_v4();
        let first = OrientationKeyPolicy
            .derive_key(id, VIDEO_MP4, Geometry::Portrait)
            .unwrap();
        let second = OrientationKeyPolicy
            .derive_key(id, VIDEO_MP4, Geometry::Portrait)
            .unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn random_key_has_expected_shape() {
        let key = RandomKeyPolicy
            .derive_key(Uuid::new_v4(), VIDEO_MP4, Geometry::Other)
            .expect("expected key");

        // 32 bytes in unpadded urlsafe base64 is 43 characters.
        assert!(key.ends_with(".mp4"));
        let stem = key.trim_end_matches(".mp4");
        assert_eq!(stem.len(), 43);
        assert!(
            stem.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn random_keys_do_not_collide() {
        let id = Uuid::new_v4();
        let first = RandomKeyPolicy
            .derive_key(id, VIDEO_MP4, Geometry::Other)
            .unwrap();
        let second = RandomKeyPolicy
            .derive_key(id, VIDEO_MP4, Geometry::Other)
            .unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn rejects_unsupported_media_type() {
        let result = RandomKeyPolicy.derive_key(Uuid::new_v4(), "video/quicktime", Geometry::Other);

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
