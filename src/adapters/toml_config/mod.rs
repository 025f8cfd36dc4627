// TOML config adapter - Configuration file loading and validation

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::EncoderSettings;
use crate::error::{ReelmuxError, ReelmuxResult};
use crate::preview::PreviewSettings;

/// File name looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "reelmux.toml";

/// Complete configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ReelmuxConfig {
    pub encoder: EncoderSection,
    pub output: OutputSection,
    pub preview: PreviewSection,
    pub logging: LoggingSection,
}

/// `[encoder]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderSection {
    pub ffmpeg_path: PathBuf,
    /// Overrides the per-format default video encoder
    pub video_codec: Option<String>,
    /// Overrides the per-format default audio encoder
    pub audio_codec: Option<String>,
    pub crf: u8,
    pub preset: String,
    pub audio_bitrate: String,
}

impl Default for EncoderSection {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            video_codec: None,
            audio_codec: None,
            crf: 23,
            preset: "medium".to_string(),
            audio_bitrate: "192k".to_string(),
        }
    }
}

/// `[output]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub directory: PathBuf,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            directory: std::env::temp_dir().join("reelmux").join("output"),
        }
    }
}

/// `[preview]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewSection {
    pub scratch_directory: PathBuf,
    pub filmstrip_frames: u32,
}

impl Default for PreviewSection {
    fn default() -> Self {
        Self {
            scratch_directory: std::env::temp_dir().join("reelmux").join("scratch"),
            filmstrip_frames: 10,
        }
    }
}

/// `[logging]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Pretty,
    /// JSON format for structured logging
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Invalid log format: {}. Valid formats: pretty, json", s)),
        }
    }
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl ReelmuxConfig {
    /// Check value ranges
    pub fn validate(&self) -> ReelmuxResult<()> {
        if self.encoder.ffmpeg_path.as_os_str().is_empty() {
            return Err(ReelmuxError::InvalidConfig {
                message: "encoder.ffmpeg_path cannot be empty".to_string(),
            });
        }
        if self.encoder.crf > 51 {
            return Err(ReelmuxError::InvalidConfig {
                message: format!("encoder.crf cannot exceed 51, got {}", self.encoder.crf),
            });
        }
        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ReelmuxError::InvalidConfig {
                message: format!(
                    "Invalid log level: {}. Valid levels: trace, debug, info, warn, error",
                    self.logging.level
                ),
            });
        }
        Ok(())
    }

    pub fn encoder_settings(&self) -> EncoderSettings {
        EncoderSettings {
            ffmpeg_path: self.encoder.ffmpeg_path.clone(),
            video_codec: self.encoder.video_codec.clone(),
            audio_codec: self.encoder.audio_codec.clone(),
            crf: self.encoder.crf,
            preset: self.encoder.preset.clone(),
            audio_bitrate: self.encoder.audio_bitrate.clone(),
            output_directory: self.output.directory.clone(),
        }
    }

    pub fn preview_settings(&self) -> PreviewSettings {
        PreviewSettings {
            ffmpeg_path: self.encoder.ffmpeg_path.clone(),
            scratch_directory: self.preview.scratch_directory.clone(),
            filmstrip_frames: self.preview.filmstrip_frames,
        }
    }
}

/// TOML configuration adapter
pub struct TomlConfigAdapter;

impl TomlConfigAdapter {
    /// Parse configuration from TOML text; missing keys keep their defaults
    pub fn parse(content: &str, origin: &Path) -> ReelmuxResult<ReelmuxConfig> {
        toml::from_str(content).map_err(|source| ReelmuxError::ConfigParse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Load configuration from a file
    pub async fn load(path: &Path) -> ReelmuxResult<ReelmuxConfig> {
        debug!(path = %path.display(), "Reading config file");
        let content = tokio::fs::read_to_string(path).await?;
        Self::parse(&content, path)
    }

    /// Serialize configuration to TOML text
    pub fn render(config: &ReelmuxConfig) -> ReelmuxResult<String> {
        Ok(toml::to_string_pretty(config)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ReelmuxConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.encoder.ffmpeg_path, PathBuf::from("ffmpeg"));
        assert_eq!(config.preview.filmstrip_frames, 10);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = TomlConfigAdapter::parse(
            "[encoder]\ncrf = 18\n\n[logging]\nformat = \"json\"\n",
            Path::new("inline.toml"),
        )
        .unwrap();
        assert_eq!(config.encoder.crf, 18);
        assert_eq!(config.encoder.preset, "medium");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_error_names_file() {
        let err = TomlConfigAdapter::parse("[encoder\n", Path::new("broken.toml")).unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ReelmuxConfig::default();
        config.encoder.crf = 60;
        assert!(config.validate().is_err());

        let mut config = ReelmuxConfig::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_render_round_trips() {
        let config = ReelmuxConfig::default();
        let text = TomlConfigAdapter::render(&config).unwrap();
        let parsed = TomlConfigAdapter::parse(&text, Path::new("rendered.toml")).unwrap();
        assert_eq!(parsed, config);
    }
}
