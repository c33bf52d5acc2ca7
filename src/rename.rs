//! Renaming raw captures to the canonical convention.

use crate::naming::{NameKind, NamingConvention};
use crate::registry::ClipRegistry;
use crate::resolver::UNKNOWN_LABEL;
use tracing::{info, warn};

/// Per-file outcomes of one rename pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenameReport {
    pub renamed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Rename every raw capture in the registry to
/// `<renamed-prefix>_<course>_<type>_<yymmddHHmm>.<ext>`.
///
/// Clips that are already canonical, merged, or still unresolvable
/// ("Unknown" labels) are left alone so a later run with updated size
/// tables can pick them up. Must not run while a registry build is
/// scanning the same directory; the caller sequences the two. The registry
/// is stale after a successful pass and must be rebuilt.
pub async fn rename_to_canonical(
    registry: &ClipRegistry,
    naming: &NamingConvention,
) -> RenameReport {
    let mut report = RenameReport::default();

    for record in registry.records() {
        if record.name_kind != NameKind::RawCapture
            || record.course_name == UNKNOWN_LABEL
            || record.video_type == UNKNOWN_LABEL
        {
            report.skipped += 1;
            continue;
        }

        let new_name = naming.renamed_name(
            &record.course_name,
            &record.video_type,
            record.recorded_at,
        );
        let target = record
            .file_path
            .parent()
            .map(|dir| dir.join(&new_name))
            .unwrap_or_else(|| new_name.clone().into());

        if target.exists() {
            warn!("⏭️ Not renaming {}: {} already exists", record.file_name(), new_name);
            report.skipped += 1;
            continue;
        }

        match tokio::fs::rename(&record.file_path, &target).await {
            Ok(()) => {
                info!("🏷️ Renamed {} -> {}", record.file_name(), new_name);
                report.renamed += 1;
            }
            Err(e) => {
                warn!("⚠️ Failed to rename {}: {}", record.file_name(), e);
                report.failed += 1;
            }
        }
    }

    report
}
