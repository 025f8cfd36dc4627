//! CLI module for Reelmux
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::adapters::toml_config::LogFormat;
use crate::config_initialization::CliOverrides;

pub mod args;
pub mod commands;

pub use args::{FilmstripArgs, MergeArgs, PreviewArgs, ProbeArgs, ThumbnailArgs, WaveformArgs};

/// Reelmux media orchestration
///
/// Probes media files, renders preview assets and merges trimmed clips by
/// driving an external encoder process.
#[derive(Parser, Debug)]
#[command(name = "reelmux")]
#[command(about = "Reelmux - probe, preview and merge media clips")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Configuration file (default: ./reelmux.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Encoder executable
    #[arg(long, global = true)]
    pub ffmpeg: Option<PathBuf>,

    /// Logging level
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log output format (pretty or json)
    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect one or more media files
    Probe(ProbeArgs),
    /// Render a single-frame thumbnail
    Thumbnail(ThumbnailArgs),
    /// Render frames sampled across a file
    Filmstrip(FilmstripArgs),
    /// Extract a peak-amplitude waveform
    Waveform(WaveformArgs),
    /// Probe a file and render its full preview bundle
    Preview(PreviewArgs),
    /// Concatenate trimmed clips into one output file
    Merge(MergeArgs),
}

impl Cli {
    /// Configuration values carried by global and command flags
    pub fn overrides(&self) -> CliOverrides {
        let output_directory = match &self.command {
            Commands::Merge(args) => args.output_dir.clone(),
            _ => None,
        };
        CliOverrides {
            config_file: self.config.clone(),
            ffmpeg_path: self.ffmpeg.clone(),
            output_directory,
            log_level: self.log_level.clone(),
            log_format: self.log_format,
        }
    }
}
