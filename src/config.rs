use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Configuration for ClipMaster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory scan settings
    pub scan: ScanConfig,

    /// Filename convention settings
    pub naming: NamingConfig,

    /// Selection limits
    pub selection: SelectionConfig,

    /// Encoding options passed to the merge step
    pub encoding: EncodingConfig,

    /// Known recording rooms and their size tables
    pub rooms: Vec<RoomConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Media file extension considered by the scan (without dot)
    pub media_extension: String,

    /// Timeout for a single ffprobe invocation (seconds)
    pub probe_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamingConfig {
    /// Prefix of raw capture downloads (`rooms_<id>_videos_video-<millis>.webm.mp4`)
    pub capture_prefix: String,

    /// Prefix of files already renamed to the canonical convention
    pub renamed_prefix: String,

    /// Prefix of merged output files; these are never re-classified
    pub merged_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Maximum number of clips accepted in one merge selection
    pub max_clips: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodingConfig {
    /// Video codec for the merged output
    pub video_codec: String,

    /// Video bitrate for the merged output
    pub video_bitrate: String,

    /// Audio codec for the merged output
    pub audio_codec: String,

    /// Extra arguments prepended to the ffmpeg invocation (e.g. hwaccel flags)
    pub extra_args: Vec<String>,

    /// Timeout for the whole concatenation run (seconds)
    pub merge_timeout_secs: u64,
}

/// A known recording room and its versioned frame-size table.
///
/// The capture pipeline changed encoder settings several times without
/// changing lesson semantics, so multiple sizes may map to the same label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Room identifier as it appears in raw capture filenames
    pub room_id: String,

    /// Course taught in this room
    pub course_name: String,

    /// Frame-size to lesson-type mappings, oldest first
    pub video_types: Vec<SizeRule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizeRule {
    pub width: u32,
    pub height: u32,
    pub label: String,
}

impl Config {
    /// Load configuration from file, falling back through known locations
    pub fn load() -> Result<Self> {
        let config_paths = [
            "clipmaster.toml",
            "config/clipmaster.toml",
            "~/.config/clipmaster/config.toml",
        ];

        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str::<Config>(&config_str) {
                    Ok(config) => {
                        tracing::info!("📄 Loaded configuration from: {}", path);
                        return Ok(config.with_env_overrides());
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        Err(anyhow!("No configuration file found"))
    }

    /// Apply environment variable overrides
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(max) = std::env::var("CLIPMASTER_MAX_CLIPS") {
            if let Ok(max) = max.parse() {
                self.selection.max_clips = max;
            }
        }

        if let Ok(ext) = std::env::var("CLIPMASTER_MEDIA_EXT") {
            self.scan.media_extension = ext.trim_start_matches('.').to_string();
        }

        if let Ok(timeout) = std::env::var("CLIPMASTER_PROBE_TIMEOUT") {
            if let Ok(timeout) = timeout.parse() {
                self.scan.probe_timeout_secs = timeout;
            }
        }

        self
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path);
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.scan.media_extension.is_empty() {
            return Err(anyhow!("media_extension must not be empty"));
        }

        if self.selection.max_clips < 2 {
            return Err(anyhow!("max_clips must be at least 2"));
        }

        let prefixes = [
            &self.naming.capture_prefix,
            &self.naming.renamed_prefix,
            &self.naming.merged_prefix,
        ];
        for prefix in prefixes {
            if prefix.is_empty() || prefix.contains('_') {
                return Err(anyhow!("naming prefixes must be non-empty and underscore-free"));
            }
        }

        for room in &self.rooms {
            if room.room_id.is_empty() {
                return Err(anyhow!("room_id must not be empty"));
            }
            if room.course_name.is_empty() {
                return Err(anyhow!("course_name must not be empty for room {}", room.room_id));
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scan: ScanConfig {
                media_extension: "mp4".to_string(),
                probe_timeout_secs: 30,
            },
            naming: NamingConfig {
                capture_prefix: "rooms".to_string(),
                renamed_prefix: "kvid".to_string(),
                merged_prefix: "kclip".to_string(),
            },
            selection: SelectionConfig { max_clips: 100 },
            encoding: EncodingConfig {
                video_codec: "libx264".to_string(),
                video_bitrate: "4000k".to_string(),
                audio_codec: "aac".to_string(),
                extra_args: vec![],
                merge_timeout_secs: 3600,
            },
            rooms: vec![
                RoomConfig {
                    room_id: "39c0c30a65e657b95037".to_string(),
                    course_name: "Beginner".to_string(),
                    video_types: vec![
                        // 2023 pipeline captured at 640x480, upgraded twice since
                        SizeRule { width: 640, height: 480, label: "phrasal_verbs".to_string() },
                        SizeRule { width: 1280, height: 720, label: "phrasal_verbs".to_string() },
                        SizeRule { width: 1920, height: 1080, label: "free_talking".to_string() },
                    ],
                },
                RoomConfig {
                    room_id: "7d21aa0cf4b2e09c1833".to_string(),
                    course_name: "Intermediate".to_string(),
                    video_types: vec![
                        SizeRule { width: 640, height: 480, label: "idioms".to_string() },
                        SizeRule { width: 1280, height: 720, label: "idioms".to_string() },
                        SizeRule { width: 1920, height: 1080, label: "news_talk".to_string() },
                    ],
                },
            ],
        }
    }
}
