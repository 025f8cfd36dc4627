//! Merge engine module

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::model::OutputFormat;

pub mod command;
pub mod merger;
pub mod progress;
pub mod registry;

pub use merger::MergeEngine;
pub use progress::ProgressSink;
pub use registry::JobRegistry;

/// Encoder configuration for merge jobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderSettings {
    /// Encoder executable
    pub ffmpeg_path: PathBuf,
    /// Video encoder override; per-format default when `None`
    pub video_codec: Option<String>,
    /// Audio encoder override; per-format default when `None`
    pub audio_codec: Option<String>,
    /// CRF quality setting
    pub crf: u8,
    /// Encoding preset
    pub preset: String,
    pub audio_bitrate: String,
    /// Where outputs without an explicit path are written
    pub output_directory: PathBuf,
}

impl EncoderSettings {
    /// (video, audio) encoders for `format`, overrides first
    pub fn codecs_for(&self, format: OutputFormat) -> (String, String) {
        let (video, audio) = format.default_codecs();
        (
            self.video_codec.clone().unwrap_or_else(|| video.to_string()),
            self.audio_codec.clone().unwrap_or_else(|| audio.to_string()),
        )
    }
}
