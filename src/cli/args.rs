//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

use crate::domain::model::{ClipRequest, OutputFormat};

/// Arguments for the probe command
#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Media files to inspect (probed concurrently)
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the thumbnail command
#[derive(Args, Debug)]
pub struct ThumbnailArgs {
    /// Input media file
    pub input: PathBuf,

    /// Position in seconds (default: derived from the file's duration)
    #[arg(long)]
    pub at: Option<f64>,
}

/// Arguments for the filmstrip command
#[derive(Args, Debug)]
pub struct FilmstripArgs {
    /// Input media file
    pub input: PathBuf,

    /// Requested frame count (clamped to 5-20)
    #[arg(long)]
    pub count: Option<u32>,

    /// Source duration in seconds (probed when omitted)
    #[arg(long)]
    pub duration: Option<f64>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the waveform command
#[derive(Args, Debug)]
pub struct WaveformArgs {
    /// Input media file
    pub input: PathBuf,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the preview command
#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Input media file
    pub input: PathBuf,
}

/// Arguments for the merge command
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Clip as PATH, PATH@START:END, PATH@START: or PATH@:END (seconds); repeat in order
    #[arg(long = "clip", required = true, value_parser = ClipRequest::parse_spec)]
    pub clips: Vec<ClipRequest>,

    /// Output container format
    #[arg(long, default_value = "mp4")]
    pub format: OutputFormat,

    /// Output file path (default: timestamped file in the output directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory for generated output names
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Job identifier (default: generated)
    #[arg(long)]
    pub job_id: Option<String>,

    /// Emit progress events as JSON lines
    #[arg(long)]
    pub json: bool,
}
