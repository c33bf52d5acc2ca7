//! Metadata probing through the external media tooling (ffprobe).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Intrinsic properties read from a container header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoProperties {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub duration_seconds: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("failed to launch ffprobe: {0}")]
    Launch(#[from] std::io::Error),

    #[error("ffprobe failed for {path}")]
    Failed { path: PathBuf },

    #[error("ffprobe timed out for {path}")]
    Timeout { path: PathBuf },

    #[error("unusable probe output for {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },
}

/// Boundary to the media collaborator that reads container headers.
///
/// A trait so the registry can be exercised against a stub in tests without
/// real video files on disk.
#[async_trait]
pub trait MediaProber: Send + Sync {
    async fn probe(&self, path: &Path) -> Result<VideoProperties, ProbeError>;
}

/// Production prober shelling out to ffprobe
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    timeout: Duration,
}

impl FfprobeProber {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl MediaProber for FfprobeProber {
    async fn probe(&self, path: &Path) -> Result<VideoProperties, ProbeError> {
        let command = tokio::process::Command::new("ffprobe")
            .args(["-v", "quiet", "-print_format", "json", "-show_format", "-show_streams"])
            .arg(path)
            .output();

        let output = tokio::time::timeout(self.timeout, command)
            .await
            .map_err(|_| ProbeError::Timeout { path: path.to_path_buf() })??;

        if !output.status.success() {
            return Err(ProbeError::Failed { path: path.to_path_buf() });
        }

        let data: serde_json::Value =
            serde_json::from_slice(&output.stdout).map_err(|e| ProbeError::Malformed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let malformed = |reason: &str| ProbeError::Malformed {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };

        let streams = data["streams"]
            .as_array()
            .ok_or_else(|| malformed("no streams section"))?;

        let video_stream = streams
            .iter()
            .find(|s| s["codec_type"] == "video")
            .ok_or_else(|| malformed("no video stream"))?;

        let width = video_stream["width"].as_u64().unwrap_or(0) as u32;
        let height = video_stream["height"].as_u64().unwrap_or(0) as u32;
        if width == 0 || height == 0 {
            return Err(malformed("missing frame size"));
        }

        let fps = video_stream["r_frame_rate"]
            .as_str()
            .and_then(parse_frame_rate)
            .ok_or_else(|| malformed("missing frame rate"))?;

        let duration_seconds: f64 = data["format"]["duration"]
            .as_str()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| malformed("missing duration"))?;

        debug!(
            "📹 Probed {}: {}x{}, {:.1}fps, {:.1}s",
            path.display(),
            width,
            height,
            fps,
            duration_seconds
        );

        Ok(VideoProperties {
            width,
            height,
            fps,
            duration_seconds,
        })
    }
}

/// ffprobe reports frame rate as a rational, e.g. "30000/1001"
fn parse_frame_rate(raw: &str) -> Option<f64> {
    match raw.split_once('/') {
        Some((numerator, denominator)) => {
            let numerator: f64 = numerator.parse().ok()?;
            let denominator: f64 = denominator.parse().ok()?;
            if denominator == 0.0 {
                return None;
            }
            Some(numerator / denominator)
        }
        None => raw.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frame_rate() {
        assert_eq!(parse_frame_rate("30/1"), Some(30.0));
        assert_eq!(parse_frame_rate("25"), Some(25.0));
        assert_eq!(parse_frame_rate("30000/0"), None);
        assert_eq!(parse_frame_rate("abc"), None);

        let ntsc = parse_frame_rate("30000/1001").unwrap();
        assert!((ntsc - 29.97).abs() < 0.01);
    }

    #[tokio::test]
    async fn test_probe_missing_file_fails() {
        let prober = FfprobeProber::new(Duration::from_secs(5));
        let result = prober.probe(Path::new("/nonexistent/clip.mp4")).await;
        assert!(result.is_err());
    }
}
