//! Media inspection through the encoder's information-only mode

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::domain::errors::DomainError;
use crate::domain::model::MediaDescriptor;
use crate::ports::ProcessPort;
use crate::streams::{self, read_all_text};

/// Answers "what is this file?" by scraping the encoder's diagnostics
pub struct MediaProbe {
    process: Arc<dyn ProcessPort>,
    ffmpeg_path: PathBuf,
}

impl MediaProbe {
    pub fn new(process: Arc<dyn ProcessPort>, ffmpeg_path: impl Into<PathBuf>) -> Self {
        Self {
            process,
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    /// Arguments for an information-only run (no output file)
    pub fn probe_args(path: &Path) -> Vec<String> {
        vec![
            "-hide_banner".to_string(),
            "-i".to_string(),
            path.to_string_lossy().into_owned(),
        ]
    }

    /// Probe one file.
    ///
    /// Missing metadata never fails the probe; only an unavailable encoder, an
    /// unreadable file, or completely empty diagnostics do.
    pub async fn probe(&self, path: &Path) -> Result<MediaDescriptor, DomainError> {
        info!(path = %path.display(), "Probing media file");

        let mut handle = self
            .process
            .spawn(&self.ffmpeg_path, &Self::probe_args(path))
            .await?;

        let text = match handle.take_stderr() {
            Some(stderr) => read_all_text(stderr)
                .await
                .map_err(|e| DomainError::io("Failed to read probe diagnostics", e))?,
            None => String::new(),
        };
        // Information-only runs exit non-zero because no output is named
        let exit = handle.wait().await?;
        debug!(path = %path.display(), code = ?exit.code, "Probe process finished");

        let size_bytes = tokio::fs::metadata(path)
            .await
            .map_err(|e| DomainError::SourceInaccessible {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
            .len();

        let descriptor = Self::describe(path, &text, size_bytes)?;
        info!(
            path = %path.display(),
            duration = descriptor.duration_seconds,
            resolution = %descriptor.resolution(),
            codec = %descriptor.codec_name,
            "Media file probed"
        );
        Ok(descriptor)
    }

    /// Apply every extractor once to the accumulated diagnostic text
    pub fn describe(
        path: &Path,
        text: &str,
        size_bytes: u64,
    ) -> Result<MediaDescriptor, DomainError> {
        if text.trim().is_empty() {
            return Err(DomainError::ParseFailure {
                path: path.to_path_buf(),
                reason: "encoder produced no diagnostic output".to_string(),
            });
        }

        let (width, height) = streams::parse_resolution(text).unwrap_or((0, 0));
        Ok(MediaDescriptor {
            path: path.to_string_lossy().into_owned(),
            duration_seconds: streams::parse_duration(text).unwrap_or(0.0),
            width,
            height,
            codec_name: streams::parse_codec(text)
                .unwrap_or_else(|| MediaDescriptor::UNKNOWN_CODEC.to_string()),
            frame_rate: streams::parse_frame_rate(text).unwrap_or(0.0),
            size_bytes,
        })
    }

    /// Probe several files concurrently; each result stands on its own
    pub async fn probe_many(
        &self,
        paths: &[PathBuf],
    ) -> Vec<Result<MediaDescriptor, DomainError>> {
        let results = join_all(paths.iter().map(|path| self.probe(path))).await;
        for (path, result) in paths.iter().zip(&results) {
            if let Err(e) = result {
                warn!(path = %path.display(), error = %e, "Probe failed");
            }
        }
        results
    }
}
