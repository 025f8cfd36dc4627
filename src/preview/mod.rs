//! Preview asset generation
//!
//! Thumbnails, filmstrips and waveform envelopes are derived through the
//! encoder. Image work happens in uniquely named scratch directories that are
//! removed on every exit path; waveform samples arrive over stdout.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tempfile::TempDir;
use tracing::{debug, warn};

use crate::domain::errors::DomainError;
use crate::domain::model::{FrameProgress, MediaDescriptor, PreviewBundle};
use crate::domain::rules::PreviewRules;
use crate::engine::progress::ProgressSink;
use crate::ports::{ProcessExit, ProcessHandle, ProcessPort};
use crate::streams::{DiagnosticLines, DiagnosticTail};

pub mod filmstrip;
pub mod thumbnail;
pub mod waveform;

pub use waveform::peak_envelope;

/// Settings the preview generator needs
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewSettings {
    pub ffmpeg_path: PathBuf,
    /// Parent of every per-invocation scratch directory
    pub scratch_directory: PathBuf,
    /// Filmstrip length requested by `bundle`
    pub filmstrip_frames: u32,
}

/// Produces thumbnails, filmstrips and waveform envelopes
pub struct PreviewGenerator {
    process: Arc<dyn ProcessPort>,
    settings: PreviewSettings,
}

impl PreviewGenerator {
    pub fn new(process: Arc<dyn ProcessPort>, settings: PreviewSettings) -> Self {
        Self { process, settings }
    }

    pub fn settings(&self) -> &PreviewSettings {
        &self.settings
    }

    /// Thumbnail, filmstrip and waveform for an already probed file
    pub async fn bundle(&self, descriptor: &MediaDescriptor) -> Result<PreviewBundle, DomainError> {
        let path = Path::new(&descriptor.path);
        let duration = descriptor.duration_seconds;

        let thumbnail = self
            .thumbnail(path, PreviewRules::thumbnail_offset(duration))
            .await?;
        let filmstrip = self
            .filmstrip(
                path,
                duration,
                self.settings.filmstrip_frames,
                &ProgressSink::disabled(),
            )
            .await?;
        let waveform = self.waveform(path).await?;

        Ok(PreviewBundle {
            thumbnail,
            filmstrip,
            waveform,
        })
    }

    /// Fresh, uniquely named scratch directory under the configured root
    async fn scratch_dir(&self, prefix: &str) -> Result<TempDir, DomainError> {
        tokio::fs::create_dir_all(&self.settings.scratch_directory)
            .await
            .map_err(|e| DomainError::io("Failed to create scratch directory", e))?;
        tempfile::Builder::new()
            .prefix(prefix)
            .tempdir_in(&self.settings.scratch_directory)
            .map_err(|e| DomainError::io("Failed to create scratch directory", e))
    }

    /// Spawn the encoder and drain its diagnostics until exit.
    ///
    /// Every frame counter seen is forwarded to `frames` (clamped to `total_frames`).
    async fn run_to_exit(
        &self,
        operation: &'static str,
        args: &[String],
        frames: Option<(&ProgressSink<FrameProgress>, u32)>,
    ) -> Result<(), DomainError> {
        let mut handle = self.process.spawn(&self.settings.ffmpeg_path, args).await?;
        let tail = drain_diagnostics(handle.as_mut(), frames).await;
        let exit = handle.wait().await?;
        debug!(operation, code = ?exit.code, "Preview process finished");

        if !exit.success() {
            return Err(DomainError::PreviewUnavailable {
                operation,
                reason: failure_reason(&exit, &tail),
            });
        }
        Ok(())
    }
}

async fn drain_diagnostics(
    handle: &mut dyn ProcessHandle,
    frames: Option<(&ProgressSink<FrameProgress>, u32)>,
) -> DiagnosticTail {
    let mut tail = DiagnosticTail::default();
    let Some(stderr) = handle.take_stderr() else {
        return tail;
    };

    let mut lines = DiagnosticLines::new(stderr);
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if let Some((sink, total)) = frames {
                    if let Some(current) = crate::streams::parse_frame_counter(&line) {
                        let current = u32::try_from(current).unwrap_or(u32::MAX).min(total);
                        sink.emit(FrameProgress { current, total });
                    }
                }
                tail.push(&line);
            }
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "Stopped reading encoder diagnostics");
                break;
            }
        }
    }
    tail
}

fn failure_reason(exit: &ProcessExit, tail: &DiagnosticTail) -> String {
    let code = exit
        .code
        .map_or_else(|| "signal".to_string(), |c| c.to_string());
    match tail.last() {
        Some(line) => format!("encoder exited with {}: {}", code, line),
        None => format!("encoder exited with {}", code),
    }
}

/// Remove a scratch directory; failures are logged, never returned
fn discard_scratch(dir: TempDir, operation: &str) {
    let path = dir.path().to_path_buf();
    if let Err(e) = dir.close() {
        warn!(operation, path = %path.display(), error = %e, "Failed to remove scratch directory");
    }
}

/// `data:<mime>;base64,<payload>`
pub fn data_uri(bytes: &[u8], mime: &str) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Seconds formatted for the encoder's `-ss` option
fn seconds_arg(seconds: f64) -> String {
    format!("{:.3}", seconds.max(0.0))
}
