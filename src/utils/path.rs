//! Output path helpers

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::domain::errors::DomainError;
use crate::domain::model::OutputFormat;

/// Timestamped output file name, unique to the millisecond
pub fn merged_file_name(format: OutputFormat, at: DateTime<Local>) -> String {
    format!(
        "merged_{}.{}",
        at.format("%Y%m%d_%H%M%S_%3f"),
        format.extension()
    )
}

/// Destination for a merge: the explicit path, or a timestamped file in
/// `output_dir`. The parent directory is created either way.
pub async fn resolve_output_path(
    explicit: Option<&Path>,
    output_dir: &Path,
    format: OutputFormat,
) -> Result<PathBuf, DomainError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => output_dir.join(merged_file_name(format, Local::now())),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| DomainError::io("Failed to create output directory", e))?;
    }
    Ok(path)
}
