//! CSV export of the registry.

use crate::registry::ClipRegistry;
use std::path::Path;
use tracing::info;

const HEADER: &str = "file_name,room_id,course_name,video_type,width,height,fps,duration_seconds,file_size_bytes,recorded_at,name_kind";

/// Write one row per registry record. Returns the number of rows written.
pub async fn write_csv(registry: &ClipRegistry, path: &Path) -> std::io::Result<usize> {
    let mut content = String::from(HEADER);
    content.push('\n');

    for record in registry.records() {
        let row = [
            record.file_name(),
            record.room_id.clone().unwrap_or_default(),
            record.course_name.clone(),
            record.video_type.clone(),
            record.video_size.0.to_string(),
            record.video_size.1.to_string(),
            format!("{:.3}", record.fps),
            format!("{:.3}", record.duration_seconds),
            record.file_size_bytes.to_string(),
            record.recorded_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            format!("{:?}", record.name_kind),
        ];
        let row: Vec<String> = row.iter().map(|field| escape_field(field)).collect();
        content.push_str(&row.join(","));
        content.push('\n');
    }

    tokio::fs::write(path, &content).await?;
    info!("📊 Exported {} rows to {}", registry.len(), path.display());
    Ok(registry.len())
}

fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
