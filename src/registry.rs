//! Clip registry: classification, sorting and grouping of a directory of
//! recording fragments.

use crate::naming::{NameKind, NamingConvention, ParseOutcome};
use crate::probe::MediaProber;
use crate::resolver::TypeResolver;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Canonical record for one classified recording fragment.
///
/// Immutable after construction; group membership is derived, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClipRecord {
    pub file_path: PathBuf,

    /// Absent for files that no longer carry the capture name
    pub room_id: Option<String>,

    pub course_name: String,
    pub video_type: String,

    /// Frame size as probed (width, height)
    pub video_size: (u32, u32),

    pub fps: f64,
    pub duration_seconds: f64,
    pub file_size_bytes: u64,

    /// Derived from the filename, not file mtime
    pub recorded_at: NaiveDateTime,

    pub name_kind: NameKind,
}

impl ClipRecord {
    pub fn file_name(&self) -> String {
        self.file_path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string()
    }
}

/// One course/lesson-type partition of the registry, a borrowed view over
/// the registry's sorted records
#[derive(Debug, Clone)]
pub struct Group<'a> {
    pub course_name: &'a str,
    pub video_type: &'a str,
    pub clips: Vec<&'a ClipRecord>,
}

impl<'a> Group<'a> {
    pub fn key(&self) -> String {
        format!("{}/{}", self.course_name, self.video_type)
    }
}

/// Sorted collection of every classified clip in a directory
#[derive(Debug, Clone, Default)]
pub struct ClipRegistry {
    records: Vec<ClipRecord>,
}

impl ClipRegistry {
    /// Scan a directory and classify every media file in it.
    ///
    /// A single unreadable or oddly named file is skipped with a log line;
    /// it never aborts the rest of the scan. Merged outputs are excluded so
    /// they are never re-classified.
    pub async fn build(
        directory: &Path,
        naming: &NamingConvention,
        resolver: &TypeResolver,
        prober: &dyn MediaProber,
    ) -> std::io::Result<Self> {
        let mut records = Vec::new();
        let mut entries = tokio::fs::read_dir(directory).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            match entry.file_type().await {
                Ok(file_type) if file_type.is_file() => {}
                Ok(_) => continue,
                Err(e) => {
                    warn!("⚠️ Skipping unreadable directory entry {}: {}", path.display(), e);
                    continue;
                }
            }

            let file_name = match path.file_name().and_then(|s| s.to_str()) {
                Some(name) => name.to_string(),
                None => continue,
            };

            if !naming.has_media_extension(&file_name) {
                continue;
            }

            let identity = match naming.parse(&file_name) {
                ParseOutcome::Identity(identity) => identity,
                ParseOutcome::Merged => {
                    debug!("⏭️ Skipping merged output: {}", file_name);
                    continue;
                }
                ParseOutcome::Unrecognized => {
                    warn!("⏭️ Skipping unrecognized file name: {}", file_name);
                    continue;
                }
            };

            let properties = match prober.probe(&path).await {
                Ok(properties) => properties,
                Err(e) => {
                    warn!("⚠️ Skipping unreadable file: {}", e);
                    continue;
                }
            };

            let file_size_bytes = match tokio::fs::metadata(&path).await {
                Ok(metadata) => metadata.len(),
                Err(e) => {
                    warn!("⚠️ Skipping {}: {}", file_name, e);
                    continue;
                }
            };

            let video_size = (properties.width, properties.height);
            let (course_name, video_type) = match (&identity.course_name, &identity.video_type)
            {
                // renamed files carry resolved labels in the name
                (Some(course), Some(video_type)) => (course.clone(), video_type.clone()),
                _ => {
                    let room_id = identity.room_id.as_deref().unwrap_or("");
                    (
                        resolver.course_name(room_id),
                        resolver.video_type(room_id, video_size),
                    )
                }
            };

            records.push(ClipRecord {
                file_path: path,
                room_id: identity.room_id,
                course_name,
                video_type,
                video_size,
                fps: properties.fps,
                duration_seconds: properties.duration_seconds,
                file_size_bytes,
                recorded_at: identity.recorded_at,
                name_kind: identity.name_kind,
            });
        }

        // Stable sort: equal timestamps keep directory-listing order
        records.sort_by(|a, b| {
            (&a.course_name, &a.video_type, a.recorded_at)
                .cmp(&(&b.course_name, &b.video_type, b.recorded_at))
        });

        info!("🗂️ Registry built: {} clips", records.len());
        Ok(Self { records })
    }

    pub fn records(&self) -> &[ClipRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Partition the sorted records by `(course_name, video_type)`.
    ///
    /// The registry order already clusters records by that key, so this is a
    /// single pass with no re-sort, and each group's clips stay sorted by
    /// `recorded_at` ascending.
    pub fn groups(&self) -> Vec<Group<'_>> {
        let mut groups: Vec<Group<'_>> = Vec::new();

        for record in &self.records {
            match groups.last_mut() {
                Some(group)
                    if group.course_name == record.course_name
                        && group.video_type == record.video_type =>
                {
                    group.clips.push(record);
                }
                _ => groups.push(Group {
                    course_name: &record.course_name,
                    video_type: &record.video_type,
                    clips: vec![record],
                }),
            }
        }

        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::probe::{ProbeError, VideoProperties};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use tempfile::TempDir;

    /// Probe stub keyed by file name; unknown names behave like corrupt files
    struct StubProber {
        by_name: HashMap<String, VideoProperties>,
    }

    impl StubProber {
        fn new(entries: &[(&str, (u32, u32))]) -> Self {
            let by_name = entries
                .iter()
                .map(|(name, (width, height))| {
                    (
                        name.to_string(),
                        VideoProperties {
                            width: *width,
                            height: *height,
                            fps: 30.0,
                            duration_seconds: 540.0,
                        },
                    )
                })
                .collect();
            Self { by_name }
        }
    }

    #[async_trait]
    impl MediaProber for StubProber {
        async fn probe(&self, path: &Path) -> Result<VideoProperties, ProbeError> {
            let name = path.file_name().unwrap().to_str().unwrap();
            self.by_name
                .get(name)
                .cloned()
                .ok_or_else(|| ProbeError::Failed { path: path.to_path_buf() })
        }
    }

    fn harness() -> (NamingConvention, TypeResolver) {
        let config = Config::default();
        (
            NamingConvention::new(&config.naming, &config.scan.media_extension),
            TypeResolver::from_config(&config.rooms),
        )
    }

    async fn touch(dir: &TempDir, name: &str) {
        tokio::fs::write(dir.path().join(name), b"stub").await.unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_file_is_skipped_not_fatal() {
        let dir = TempDir::new().unwrap();
        let early = "rooms_39c0c30a65e657b95037_videos_video-1715323325540.webm.mp4";
        let late = "rooms_39c0c30a65e657b95037_videos_video-1715323925540.webm.mp4";
        let corrupt = "rooms_39c0c30a65e657b95037_videos_video-1715320000000.webm.mp4";
        touch(&dir, early).await;
        touch(&dir, late).await;
        touch(&dir, corrupt).await;

        let (naming, resolver) = harness();
        let prober = StubProber::new(&[(early, (1280, 720)), (late, (1280, 720))]);

        let registry = ClipRegistry::build(dir.path(), &naming, &resolver, &prober)
            .await
            .unwrap();

        assert_eq!(registry.len(), 2);
        let groups = registry.groups();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].course_name, "Beginner");
        assert_eq!(groups[0].video_type, "phrasal_verbs");
        assert_eq!(groups[0].clips.len(), 2);
    }

    #[tokio::test]
    async fn test_merged_and_unrecognized_files_excluded() {
        let dir = TempDir::new().unwrap();
        let capture = "rooms_39c0c30a65e657b95037_videos_video-1715323325540.webm.mp4";
        touch(&dir, capture).await;
        touch(&dir, "kclip_Beginner_phrasal_verbs_240511_240613_merged.mp4").await;
        touch(&dir, "holiday_footage.mp4").await;
        touch(&dir, "notes.txt").await;

        let (naming, resolver) = harness();
        let prober = StubProber::new(&[(capture, (1280, 720))]);

        let registry = ClipRegistry::build(dir.path(), &naming, &resolver, &prober)
            .await
            .unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.records()[0].name_kind, NameKind::RawCapture);
    }

    #[tokio::test]
    async fn test_records_sorted_and_grouped() {
        let dir = TempDir::new().unwrap();
        // two rooms, one renamed file that joins the Beginner group
        let beginner_late = "rooms_39c0c30a65e657b95037_videos_video-1715325208026.webm.mp4";
        let beginner_early = "rooms_39c0c30a65e657b95037_videos_video-1715323325540.webm.mp4";
        let intermediate = "rooms_7d21aa0cf4b2e09c1833_videos_video-1715323571196.webm.mp4";
        let renamed = "kvid_Beginner_phrasal_verbs_2401020900.mp4";
        for name in [beginner_late, beginner_early, intermediate, renamed] {
            touch(&dir, name).await;
        }

        let (naming, resolver) = harness();
        let prober = StubProber::new(&[
            (beginner_late, (1280, 720)),
            (beginner_early, (1280, 720)),
            (intermediate, (640, 480)),
            (renamed, (1280, 720)),
        ]);

        let registry = ClipRegistry::build(dir.path(), &naming, &resolver, &prober)
            .await
            .unwrap();

        assert_eq!(registry.len(), 4);

        let groups = registry.groups();
        assert_eq!(groups.len(), 2);

        let beginner = &groups[0];
        assert_eq!(beginner.key(), "Beginner/phrasal_verbs");
        assert_eq!(beginner.clips.len(), 3);
        // renamed clip from January sorts before the May captures
        assert_eq!(beginner.clips[0].name_kind, NameKind::RenamedCanonical);
        assert!(beginner
            .clips
            .windows(2)
            .all(|pair| pair[0].recorded_at <= pair[1].recorded_at));

        assert_eq!(groups[1].key(), "Intermediate/idioms");
    }

    #[tokio::test]
    async fn test_unknown_room_still_classified() {
        let dir = TempDir::new().unwrap();
        let stray = "rooms_0011aabbccddeeff2233_videos_video-1715323325540.webm.mp4";
        touch(&dir, stray).await;

        let (naming, resolver) = harness();
        let prober = StubProber::new(&[(stray, (1280, 720))]);

        let registry = ClipRegistry::build(dir.path(), &naming, &resolver, &prober)
            .await
            .unwrap();

        assert_eq!(registry.len(), 1);
        let record = &registry.records()[0];
        assert_eq!(record.course_name, "Unknown");
        assert_eq!(record.video_type, "Unknown");
        assert_eq!(record.room_id.as_deref(), Some("0011aabbccddeeff2233"));
    }
}
