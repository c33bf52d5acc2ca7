//! ClipMaster
//!
//! Classifies downloaded classroom-recording fragments by course, lesson
//! type and recording time, then merges operator-selected date ranges into
//! single files via ffmpeg.

pub mod config;
pub mod datetime;
pub mod export;
pub mod menu;
pub mod merge;
pub mod naming;
pub mod probe;
pub mod registry;
pub mod rename;
pub mod resolver;
pub mod selection;

// Re-export main types for easy access
pub use crate::config::Config;
pub use crate::merge::{FfmpegConcatenator, MergeError, MergePlan};
pub use crate::naming::{NameKind, NamingConvention, ParseOutcome, ParsedIdentity};
pub use crate::probe::{FfprobeProber, MediaProber, ProbeError, VideoProperties};
pub use crate::registry::{ClipRecord, ClipRegistry, Group};
pub use crate::rename::RenameReport;
pub use crate::resolver::TypeResolver;
pub use crate::selection::SelectionError;
