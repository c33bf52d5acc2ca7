//! Merge orchestration: turning a validated selection into an ffmpeg
//! concatenation run.

use crate::config::EncodingConfig;
use crate::naming::NamingConvention;
use crate::registry::ClipRecord;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error("failed to prepare concat list: {0}")]
    List(std::io::Error),

    #[error("failed to launch ffmpeg: {0}")]
    Launch(std::io::Error),

    #[error("ffmpeg timed out after {0:?}")]
    Timeout(Duration),

    #[error("ffmpeg failed: {stderr}")]
    EncodeFailed { stderr: String },
}

/// Ordered concatenation request derived from a selection
#[derive(Debug, Clone)]
pub struct MergePlan {
    /// Input files in playback order
    pub inputs: Vec<PathBuf>,

    /// Generated output file name (not path)
    pub output_name: String,
}

impl MergePlan {
    /// Build a plan from an already validated selection. The selection
    /// engine guarantees at least two clips, all from one group.
    pub fn new(naming: &NamingConvention, clips: &[&ClipRecord]) -> Option<Self> {
        let first = clips.first()?;
        let last = clips.last()?;

        let output_name = naming.merged_name(
            &first.course_name,
            &first.video_type,
            first.recorded_at,
            last.recorded_at,
        );

        Some(Self {
            inputs: clips.iter().map(|clip| clip.file_path.clone()).collect(),
            output_name,
        })
    }
}

/// Concatenates clips via the ffmpeg concat demuxer
#[derive(Debug, Clone)]
pub struct FfmpegConcatenator {
    timeout: Duration,
}

impl FfmpegConcatenator {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Run the concatenation. Input order is preserved exactly. A failure
    /// aborts this merge only; the caller's registry stays valid for retry.
    pub async fn concatenate(
        &self,
        inputs: &[PathBuf],
        output_path: &Path,
        encoding: &EncodingConfig,
    ) -> Result<(), MergeError> {
        let list_dir = tempfile::tempdir().map_err(MergeError::List)?;
        let list_path = list_dir.path().join("concat.txt");

        let mut list_content = String::new();
        for input in inputs {
            let absolute = tokio::fs::canonicalize(input)
                .await
                .map_err(MergeError::List)?;
            list_content.push_str(&format!(
                "file '{}'\n",
                escape_concat_path(&absolute.to_string_lossy())
            ));
        }
        tokio::fs::write(&list_path, &list_content)
            .await
            .map_err(MergeError::List)?;

        info!(
            "🎬 Merging {} clips into {}",
            inputs.len(),
            output_path.display()
        );

        let mut command = tokio::process::Command::new("ffmpeg");
        command
            .args(&encoding.extra_args)
            .arg("-y")
            .args(["-f", "concat", "-safe", "0", "-i"])
            .arg(&list_path)
            .args(["-c:v", &encoding.video_codec])
            .args(["-b:v", &encoding.video_bitrate])
            .args(["-c:a", &encoding.audio_codec])
            .arg(output_path);

        let run = async {
            command.output().await.map_err(MergeError::Launch)
        };
        let output = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|_| MergeError::Timeout(self.timeout))??;

        if !output.status.success() {
            return Err(MergeError::EncodeFailed {
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        info!("✅ Merged file saved as {}", output_path.display());
        Ok(())
    }
}

/// The concat demuxer list quotes paths with single quotes
fn escape_concat_path(path: &str) -> String {
    path.replace('\'', r"'\''")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::naming::NameKind;
    use chrono::NaiveDate;

    fn clip(name: &str, day: u32) -> ClipRecord {
        ClipRecord {
            file_path: PathBuf::from(name),
            room_id: Some("39c0c30a65e657b95037".to_string()),
            course_name: "Beginner".to_string(),
            video_type: "phrasal_verbs".to_string(),
            video_size: (1280, 720),
            fps: 30.0,
            duration_seconds: 600.0,
            file_size_bytes: 1_000_000,
            recorded_at: NaiveDate::from_ymd_opt(2024, 5, day)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            name_kind: NameKind::RawCapture,
        }
    }

    #[test]
    fn test_merge_plan_name_and_order() {
        let config = Config::default();
        let naming = NamingConvention::new(&config.naming, &config.scan.media_extension);

        let first = clip("a.mp4", 11);
        let middle = clip("b.mp4", 20);
        let last = clip("c.mp4", 28);
        let selection = vec![&first, &middle, &last];

        let plan = MergePlan::new(&naming, &selection).unwrap();
        assert_eq!(
            plan.output_name,
            "kclip_Beginner_phrasal_verbs_240511_240528_merged.mp4"
        );
        assert_eq!(
            plan.inputs,
            vec![
                PathBuf::from("a.mp4"),
                PathBuf::from("b.mp4"),
                PathBuf::from("c.mp4")
            ]
        );
    }

    #[test]
    fn test_empty_selection_has_no_plan() {
        let config = Config::default();
        let naming = NamingConvention::new(&config.naming, &config.scan.media_extension);
        assert!(MergePlan::new(&naming, &[]).is_none());
    }

    #[test]
    fn test_escape_concat_path() {
        assert_eq!(escape_concat_path("/tmp/clip.mp4"), "/tmp/clip.mp4");
        assert_eq!(
            escape_concat_path("/tmp/it's.mp4"),
            r"/tmp/it'\''s.mp4"
        );
    }
}
