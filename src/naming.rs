//! Filename conventions: parsing the historical naming generations and
//! generating canonical/merged output names.

use crate::config::NamingConfig;
use chrono::{DateTime, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Which naming generation a file belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NameKind {
    /// As downloaded from the recording platform
    RawCapture,

    /// Already renamed to the canonical convention
    RenamedCanonical,

    /// Output of a previous merge; never re-classified
    MergedOutput,

    /// None of the known patterns
    Unrecognized,
}

/// Identity fields extracted from a file name
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedIdentity {
    pub name_kind: NameKind,

    /// Present for raw captures only
    pub room_id: Option<String>,

    /// Present for renamed files, where the label is stored in the name
    pub course_name: Option<String>,
    pub video_type: Option<String>,

    /// Recording time derived from the name, not file mtime
    pub recorded_at: NaiveDateTime,
}

/// Result of matching a file name against the known patterns
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Identity(ParsedIdentity),
    Merged,
    Unrecognized,
}

/// Parser and generator for the project's filename conventions
#[derive(Debug, Clone)]
pub struct NamingConvention {
    capture_pattern: Regex,
    renamed_prefix: String,
    merged_prefix: String,
    extension: String,
}

impl NamingConvention {
    pub fn new(config: &NamingConfig, media_extension: &str) -> Self {
        let extension = media_extension.to_lowercase();
        // rooms_<roomId>_videos_video-<unixMillis>.<container>.<container>
        // Prefixes are matched exactly; the extension tail is case-insensitive
        // to agree with the extension gate.
        let capture_pattern = Regex::new(&format!(
            r"^{}_([A-Za-z0-9]+)_videos_video-(\d+)\.[A-Za-z0-9]+\.(?i:{})$",
            regex::escape(&config.capture_prefix),
            regex::escape(&extension),
        ))
        .expect("capture pattern is built from escaped literals");

        Self {
            capture_pattern,
            renamed_prefix: config.renamed_prefix.clone(),
            merged_prefix: config.merged_prefix.clone(),
            extension,
        }
    }

    /// Whether the file carries the recognized media extension
    pub fn has_media_extension(&self, file_name: &str) -> bool {
        file_name
            .to_lowercase()
            .ends_with(&format!(".{}", self.extension))
    }

    /// Match a file name against the known patterns, first match wins:
    /// renamed-canonical, raw-capture, merged-output, then unrecognized.
    pub fn parse(&self, file_name: &str) -> ParseOutcome {
        if !self.has_media_extension(file_name) {
            return ParseOutcome::Unrecognized;
        }

        if let Some(identity) = self.parse_renamed(file_name) {
            return ParseOutcome::Identity(identity);
        }

        if let Some(identity) = self.parse_capture(file_name) {
            return ParseOutcome::Identity(identity);
        }

        if file_name.starts_with(&format!("{}_", self.merged_prefix)) {
            return ParseOutcome::Merged;
        }

        ParseOutcome::Unrecognized
    }

    /// `<renamed-prefix>_<course>_<type...>_<yymmddHHMM>.<ext>`
    ///
    /// The type label may itself contain underscores, so everything between
    /// the course field and the trailing 10-digit stamp belongs to it.
    fn parse_renamed(&self, file_name: &str) -> Option<ParsedIdentity> {
        let stem = &file_name[..file_name.len() - self.extension.len() - 1];
        let parts: Vec<&str> = stem.split('_').collect();

        if parts.len() < 4 || parts[0] != self.renamed_prefix {
            return None;
        }

        let stamp = parts[parts.len() - 1];
        if stamp.len() != 10 || !stamp.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let recorded_at = NaiveDateTime::parse_from_str(stamp, "%y%m%d%H%M").ok()?;

        let course_name = parts[1];
        let video_type = parts[2..parts.len() - 1].join("_");
        if course_name.is_empty() || video_type.is_empty() {
            return None;
        }

        Some(ParsedIdentity {
            name_kind: NameKind::RenamedCanonical,
            room_id: None,
            course_name: Some(course_name.to_string()),
            video_type: Some(video_type),
            recorded_at,
        })
    }

    /// `<capture-prefix>_<roomId>_videos_video-<unixMillis>.<container>.<ext>`
    fn parse_capture(&self, file_name: &str) -> Option<ParsedIdentity> {
        let captures = self.capture_pattern.captures(file_name)?;
        let room_id = captures.get(1)?.as_str().to_string();
        let millis: i64 = captures.get(2)?.as_str().parse().ok()?;
        let recorded_at = DateTime::from_timestamp_millis(millis)?.naive_utc();

        Some(ParsedIdentity {
            name_kind: NameKind::RawCapture,
            room_id: Some(room_id),
            course_name: None,
            video_type: None,
            recorded_at,
        })
    }

    /// Output name for a merged file, reproduced bit-exact for compatibility:
    /// `<merged-prefix>_<course>_<type>_<first:yymmdd>_<last:yymmdd>_merged.<ext>`
    pub fn merged_name(
        &self,
        course_name: &str,
        video_type: &str,
        first: NaiveDateTime,
        last: NaiveDateTime,
    ) -> String {
        format!(
            "{}_{}_{}_{}_{}_merged.{}",
            self.merged_prefix,
            course_name,
            video_type,
            first.format("%y%m%d"),
            last.format("%y%m%d"),
            self.extension,
        )
    }

    /// Canonical name produced by the rename operation:
    /// `<renamed-prefix>_<course>_<type>_<yymmddHHMM>.<ext>`
    pub fn renamed_name(
        &self,
        course_name: &str,
        video_type: &str,
        recorded_at: NaiveDateTime,
    ) -> String {
        format!(
            "{}_{}_{}_{}.{}",
            self.renamed_prefix,
            course_name,
            video_type,
            recorded_at.format("%y%m%d%H%M"),
            self.extension,
        )
    }
}
