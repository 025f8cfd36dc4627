//! Filmstrip frames sampled uniformly across a clip
//!
//! One encoder run writes the whole numbered sequence; spawning per frame
//! dominates runtime at higher frame counts.

use std::path::{Path, PathBuf};

use tracing::info;

use super::{data_uri, discard_scratch, PreviewGenerator};
use crate::domain::errors::DomainError;
use crate::domain::model::FrameProgress;
use crate::domain::rules::PreviewRules;
use crate::engine::progress::ProgressSink;

/// Filmstrip frame size in pixels
pub const FRAME_WIDTH: u32 = 80;
pub const FRAME_HEIGHT: u32 = 45;

const FRAME_PATTERN: &str = "frame_%04d.jpg";
const FRAME_EXTENSION: &str = "jpg";

impl PreviewGenerator {
    pub fn filmstrip_args(source: &Path, frame_count: u32, fps: f64, pattern: &Path) -> Vec<String> {
        vec![
            "-hide_banner".to_string(),
            "-i".to_string(),
            source.to_string_lossy().into_owned(),
            "-vf".to_string(),
            format!("fps={:.6},scale={}:{}", fps, FRAME_WIDTH, FRAME_HEIGHT),
            "-frames:v".to_string(),
            frame_count.to_string(),
            "-q:v".to_string(),
            "5".to_string(),
            "-y".to_string(),
            pattern.to_string_lossy().into_owned(),
        ]
    }

    /// Ordered JPEG data URIs; length is `clamp(min(requested, floor(duration)), 5, 20)`
    /// unless the encoder produced fewer frames
    pub async fn filmstrip(
        &self,
        source: &Path,
        duration_seconds: f64,
        requested_count: u32,
        progress: &ProgressSink<FrameProgress>,
    ) -> Result<Vec<String>, DomainError> {
        let frame_count = PreviewRules::filmstrip_frame_count(requested_count, duration_seconds);
        let fps = PreviewRules::filmstrip_sample_rate(frame_count, duration_seconds);

        let scratch = self.scratch_dir("filmstrip_").await?;
        let pattern = scratch.path().join(FRAME_PATTERN);

        self.run_to_exit(
            "filmstrip",
            &Self::filmstrip_args(source, frame_count, fps, &pattern),
            Some((progress, frame_count)),
        )
        .await?;

        let frames = read_frames(scratch.path(), frame_count as usize).await;
        discard_scratch(scratch, "filmstrip");
        let frames = frames?;

        if frames.is_empty() {
            return Err(DomainError::PreviewUnavailable {
                operation: "filmstrip",
                reason: "encoder wrote no frames".to_string(),
            });
        }

        info!(
            source = %source.display(),
            frames = frames.len(),
            fps,
            "Filmstrip generated"
        );
        Ok(frames)
    }
}

/// Numbered frames in file-name order, cut to `limit`
async fn read_frames(dir: &Path, limit: usize) -> Result<Vec<String>, DomainError> {
    let read_err = |e: std::io::Error| DomainError::PreviewUnavailable {
        operation: "filmstrip",
        reason: format!("failed to read frames: {}", e),
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(read_err)?;
    let mut paths: Vec<PathBuf> = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(read_err)? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some(FRAME_EXTENSION) {
            paths.push(path);
        }
    }
    // Zero-padded numbering makes lexicographic order the frame order
    paths.sort();
    paths.truncate(limit);

    let mut frames = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = tokio::fs::read(&path).await.map_err(read_err)?;
        frames.push(data_uri(&bytes, "image/jpeg"));
    }
    Ok(frames)
}
