//! Video geometry probing via ffprobe
//!
//! Extracts the first video stream's width and height from a local file
//! and classifies its orientation.

use crate::process::ProcessRunner;
use common::error::{AppError, AppResult, IngestStage};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::info;

/// Orientation classification of a video frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Geometry {
    Landscape,
    Portrait,
    Other,
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Geometry::Landscape => "landscape",
            Geometry::Portrait => "portrait",
            Geometry::Other => "other",
        };
        write!(f, "{}", name)
    }
}

/// Probed dimensions of the first video stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: i64,
    pub height: i64,
}

impl Dimensions {
    /// Classify the frame orientation from the width/height ratio
    pub fn classify(&self) -> Geometry {
        classify_ratio(self.width as f64 / self.height as f64)
    }
}

/// Tolerance band around the canonical 16:9 and 9:16 ratios.
///
/// Absorbs rounding in common resolutions (1920x1080, 1080x1920); exact
/// ratio matching would reject real-world files. The comparison is
/// strictly `<`: a ratio exactly at the band edge classifies as other.
const RATIO_TOLERANCE: f64 = 0.1;

/// Classify a width/height ratio as landscape, portrait or other
pub fn classify_ratio(ratio: f64) -> Geometry {
    if (ratio - 16.0 / 9.0).abs() < RATIO_TOLERANCE {
        Geometry::Landscape
    } else if (ratio - 9.0 / 16.0).abs() < RATIO_TOLERANCE {
        Geometry::Portrait
    } else {
        Geometry::Other
    }
}

/// Probes local media files with ffprobe
pub struct GeometryProbe;

impl GeometryProbe {
    /// Extract the first video stream's dimensions from a local file
    ///
    /// Fails if ffprobe exits non-zero, if its output is not parsable JSON,
    /// or if the file reports zero video streams. No retry; a probe failure
    /// aborts the ingestion.
    pub async fn probe(path: &Path) -> AppResult<Dimensions> {
        let path_str = path.to_string_lossy();
        info!(path = %path_str, "probing video geometry");

        let output = ProcessRunner::run(
            "ffprobe",
            [
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_streams",
                path_str.as_ref(),
            ],
        )
        .await
        .map_err(|e| AppError::tool(IngestStage::Probe, format!("failed to run ffprobe: {}", e)))?;

        if !output.success() {
            return Err(AppError::tool(
                IngestStage::Probe,
                format!("ffprobe exited with {}: {}", output.status, output.stderr.trim()),
            ));
        }

        let data: serde_json::Value = serde_json::from_str(&output.stdout).map_err(|e| {
            AppError::tool(IngestStage::Probe, format!("unparsable ffprobe output: {}", e))
        })?;

        parse_probe_output(&data)
    }
}

/// Pull width/height of the first video stream out of ffprobe JSON
fn parse_probe_output(data: &serde_json::Value) -> AppResult<Dimensions> {
    let streams = data
        .get("streams")
        .and_then(|v| v.as_array())
        .ok_or_else(|| AppError::tool(IngestStage::Probe, "no streams in ffprobe output"))?;

    for stream in streams {
        let codec_type = stream.get("codec_type").and_then(|v| v.as_str());
        if codec_type != Some("video") {
            continue;
        }

        let width = stream.get("width").and_then(|v| v.as_i64());
        let height = stream.get("height").and_then(|v| v.as_i64());

        return match (width, height) {
            (Some(width), Some(height)) if width > 0 && height > 0 => {
                Ok(Dimensions { width, height })
            }
            _ => Err(AppError::tool(
                IngestStage::Probe,
                "video stream reports no usable dimensions",
            )),
        };
    }

    Err(AppError::tool(IngestStage::Probe, "no video stream found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classifies_common_resolutions() {
        assert_eq!(
            Dimensions { width: 1920, height: 1080 }.classify(),
            Geometry::Landscape
        );
        assert_eq!(
            Dimensions { width: 1280, height: 720 }.classify(),
            Geometry::Landscape
        );
        assert_eq!(
            Dimensions { width: 1080, height: 1920 }.classify(),
            Geometry::Portrait
        );
        assert_eq!(
            Dimensions { width: 640, height: 480 }.classify(),
            Geometry::Other
        );
        assert_eq!(
            Dimensions { width: 1000, height: 1000 }.classify(),
            Geometry::Other
        );
    }

    #[test]
    fn classification_is_deterministic() {
        let dims = Dimensions { width: 1920, height: 1080 };
        let first = dims.classify();
        for _ in 0..10 {
            assert_eq!(dims.classify(), first);
        }
    }

    #[test]
    fn tolerance_band_is_strict() {
        // 16/9 - 0.1 rounds to a ratio whose distance from 16/9 is not
        // strictly below the tolerance, so it must classify as other.
        assert_eq!(classify_ratio(16.0 / 9.0 - 0.1), Geometry::Other);
        // Just inside the band on either side.
        assert_eq!(classify_ratio(16.0 / 9.0 - 0.09), Geometry::Landscape);
        assert_eq!(classify_ratio(16.0 / 9.0 + 0.09), Geometry::Landscape);
        assert_eq!(classify_ratio(9.0 / 16.0 + 0.09), Geometry::Portrait);
        // Well outside.
        assert_eq!(classify_ratio(16.0 / 9.0 + 0.11), Geometry::Other);
    }

    #[test]
    fn parses_first_video_stream() {
        let data = json!({
            "streams": [
                { "codec_type": "audio", "codec_name": "aac" },
                { "codec_type": "video", "width": 1280, "height": 720 },
                { "codec_type": "video", "width": 320, "height": 240 }
            ]
        });

        let dims = parse_probe_output(&data).expect("expected dimensions");
        assert_eq!(dims, Dimensions { width: 1280, height: 720 });
    }

    #[test]
    fn rejects_output_without_video_streams() {
        let data = json!({
            "streams": [
                { "codec_type": "audio", "codec_name": "aac" }
            ]
        });

        assert!(parse_probe_output(&data).is_err());
    }

    #[test]
    fn rejects_output_without_streams_key() {
        let data = json!({ "format": { "format_name": "mov,mp4" } });
        assert!(parse_probe_output(&data).is_err());
    }

    #[test]
    fn rejects_video_stream_without_dimensions() {
        let data = json!({
            "streams": [
                { "codec_type": "video", "codec_name": "h264" }
            ]
        });

        assert!(parse_probe_output(&data).is_err());
    }
}
