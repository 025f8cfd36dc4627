//! Configuration initialization and hierarchy management

use std::path::{Path, PathBuf};

use crate::adapters::toml_config::{LogFormat, ReelmuxConfig, DEFAULT_CONFIG_FILE};
use crate::adapters::TomlConfigAdapter;
use crate::error::{ReelmuxError, ReelmuxResult};

pub const ENV_FFMPEG: &str = "REELMUX_FFMPEG";
pub const ENV_OUTPUT_DIR: &str = "REELMUX_OUTPUT_DIR";
pub const ENV_SCRATCH_DIR: &str = "REELMUX_SCRATCH_DIR";
pub const ENV_LOG_LEVEL: &str = "REELMUX_LOG_LEVEL";

/// Values given on the command line; `None` leaves the lower layers in place
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_file: Option<PathBuf>,
    pub ffmpeg_path: Option<PathBuf>,
    pub output_directory: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

/// Resolved configuration and the file it was read from, if any
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: ReelmuxConfig,
    pub source: Option<PathBuf>,
}

/// Initialize configuration hierarchy following precedence: CLI > Env > File > Defaults
pub async fn initialize_configuration_hierarchy(
    overrides: &CliOverrides,
) -> ReelmuxResult<LoadedConfig> {
    let (mut config, source) = load_config_file(overrides.config_file.as_deref()).await?;
    apply_environment(&mut config, |key| std::env::var(key).ok());
    apply_cli_overrides(&mut config, overrides);
    config.validate()?;
    Ok(LoadedConfig { config, source })
}

/// An explicit file must exist; the default file is optional
async fn load_config_file(
    explicit: Option<&Path>,
) -> ReelmuxResult<(ReelmuxConfig, Option<PathBuf>)> {
    if let Some(path) = explicit {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(ReelmuxError::InvalidConfig {
                message: format!("config file not found: {}", path.display()),
            });
        }
        let config = TomlConfigAdapter::load(path).await?;
        return Ok((config, Some(path.to_path_buf())));
    }

    let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
    if tokio::fs::try_exists(&default_path).await.unwrap_or(false) {
        let config = TomlConfigAdapter::load(&default_path).await?;
        return Ok((config, Some(default_path)));
    }
    Ok((ReelmuxConfig::default(), None))
}

/// Apply `REELMUX_*` variables; empty values are ignored
pub fn apply_environment<F>(config: &mut ReelmuxConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(value) = var(ENV_FFMPEG) {
        config.encoder.ffmpeg_path = PathBuf::from(value);
    }
    if let Some(value) = var(ENV_OUTPUT_DIR) {
        config.output.directory = PathBuf::from(value);
    }
    if let Some(value) = var(ENV_SCRATCH_DIR) {
        config.preview.scratch_directory = PathBuf::from(value);
    }
    if let Some(value) = var(ENV_LOG_LEVEL) {
        config.logging.level = value;
    }
}

pub fn apply_cli_overrides(config: &mut ReelmuxConfig, overrides: &CliOverrides) {
    if let Some(path) = &overrides.ffmpeg_path {
        config.encoder.ffmpeg_path = path.clone();
    }
    if let Some(dir) = &overrides.output_directory {
        config.output.directory = dir.clone();
    }
    if let Some(level) = &overrides.log_level {
        config.logging.level = level.clone();
    }
    if let Some(format) = overrides.log_format {
        config.logging.format = format;
    }
}
