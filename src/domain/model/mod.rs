// Domain models - Core types and data structures

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Fact sheet about one input file, as reported by the encoder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaDescriptor {
    /// Path the descriptor was probed from
    pub path: String,
    /// Duration in seconds (0 if unknown)
    pub duration_seconds: f64,
    /// Width in pixels (0 if undetected)
    pub width: u32,
    /// Height in pixels (0 if undetected)
    pub height: u32,
    /// Video codec name ("unknown" if undetected)
    pub codec_name: String,
    /// Frames per second (0 if undetected)
    pub frame_rate: f64,
    /// File size in bytes
    pub size_bytes: u64,
}

impl MediaDescriptor {
    /// Descriptor with every field at its "unknown" default
    pub fn unknown(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            duration_seconds: 0.0,
            width: 0,
            height: 0,
            codec_name: MediaDescriptor::UNKNOWN_CODEC.to_string(),
            frame_rate: 0.0,
            size_bytes: 0,
        }
    }

    pub const UNKNOWN_CODEC: &'static str = "unknown";

    /// True when the encoder reported a video resolution
    pub fn has_video(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Resolution formatted as WxH
    pub fn resolution(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

/// One merge input: a source file with optional absolute trim positions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipRequest {
    pub source_path: PathBuf,
    /// Start position within the source, in seconds
    pub trim_start: Option<f64>,
    /// End position within the source, in seconds (a position, not a length)
    pub trim_end: Option<f64>,
}

impl ClipRequest {
    /// Untrimmed clip
    pub fn new(source_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            trim_start: None,
            trim_end: None,
        }
    }

    pub fn with_trim_start(mut self, seconds: f64) -> Self {
        self.trim_start = Some(seconds);
        self
    }

    pub fn with_trim_end(mut self, seconds: f64) -> Self {
        self.trim_end = Some(seconds);
        self
    }

    /// Parse `PATH`, `PATH@START:END`, `PATH@START:` or `PATH@:END`.
    ///
    /// A suffix after the last `@` is only a trim range when it has that shape;
    /// anything else (`me@host/clip.mp4`) is part of the path.
    pub fn parse_spec(spec: &str) -> Result<Self, String> {
        let (path, trim_start, trim_end) = match spec.rsplit_once('@') {
            Some((path, range)) => match parse_trim_range(range) {
                Some((start, end)) => (path, start, end),
                None => (spec, None, None),
            },
            None => (spec, None, None),
        };
        if path.trim().is_empty() {
            return Err(format!("missing clip path in '{}'", spec));
        }

        Ok(Self {
            source_path: PathBuf::from(path),
            trim_start,
            trim_end,
        })
    }

    pub fn source(&self) -> &Path {
        &self.source_path
    }
}

/// `START:END` with either side optional; `None` when `range` is not shaped like that
fn parse_trim_range(range: &str) -> Option<(Option<f64>, Option<f64>)> {
    let (start, end) = range.split_once(':')?;
    let bound = |value: &str| -> Option<Option<f64>> {
        let value = value.trim();
        if value.is_empty() {
            return Some(None);
        }
        value.parse::<f64>().ok().filter(|v| v.is_finite()).map(Some)
    };
    Some((bound(start)?, bound(end)?))
}

/// Opaque job identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for JobId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Container formats a merge may produce
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Mp4,
    Mkv,
    Avi,
    Mov,
    Webm,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 5] = [
        OutputFormat::Mp4,
        OutputFormat::Mkv,
        OutputFormat::Avi,
        OutputFormat::Mov,
        OutputFormat::Webm,
    ];

    /// File extension without the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Mp4 => "mp4",
            OutputFormat::Mkv => "mkv",
            OutputFormat::Avi => "avi",
            OutputFormat::Mov => "mov",
            OutputFormat::Webm => "webm",
        }
    }

    /// Default (video, audio) encoder names for this container
    pub fn default_codecs(&self) -> (&'static str, &'static str) {
        match self {
            OutputFormat::Webm => ("libvpx-vp9", "libopus"),
            _ => ("libx264", "aac"),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().trim_start_matches('.').to_lowercase();
        OutputFormat::ALL
            .into_iter()
            .find(|format| format.extension() == wanted)
            .ok_or_else(|| {
                format!(
                    "Invalid output format: {}. Valid formats: mp4, mkv, avi, mov, webm",
                    s
                )
            })
    }
}

/// A unit of merge work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeJob {
    pub job_id: JobId,
    pub clips: Vec<ClipRequest>,
    pub output_format: OutputFormat,
    /// Explicit destination; synthesized in the output directory when absent
    pub output_path: Option<PathBuf>,
}

impl MergeJob {
    /// Job with a generated identifier
    pub fn new(clips: Vec<ClipRequest>, output_format: OutputFormat) -> Self {
        Self {
            job_id: JobId::generate(),
            clips,
            output_format,
            output_path: None,
        }
    }

    pub fn with_job_id(mut self, job_id: impl Into<JobId>) -> Self {
        self.job_id = job_id.into();
        self
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }
}

/// Lifecycle of a merge job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeState {
    Validating,
    Analyzing,
    Processing,
    Complete,
    Failed,
    Cancelled,
}

/// State carried by a progress event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressState {
    Analyzing,
    Processing,
    Complete,
    Error,
}

/// Point-in-time report for one job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub job_id: JobId,
    /// 0.0 - 100.0
    pub percent: f64,
    pub state: ProgressState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_multiplier: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ProgressEvent {
    pub fn analyzing(job_id: &JobId) -> Self {
        Self {
            job_id: job_id.clone(),
            percent: 0.0,
            state: ProgressState::Analyzing,
            speed_multiplier: None,
            output_path: None,
            error_message: None,
        }
    }

    pub fn processing(job_id: &JobId, percent: f64, speed_multiplier: Option<f64>) -> Self {
        Self {
            job_id: job_id.clone(),
            percent,
            state: ProgressState::Processing,
            speed_multiplier,
            output_path: None,
            error_message: None,
        }
    }

    pub fn complete(job_id: &JobId, output_path: &Path) -> Self {
        Self {
            job_id: job_id.clone(),
            percent: 100.0,
            state: ProgressState::Complete,
            speed_multiplier: None,
            output_path: Some(output_path.to_path_buf()),
            error_message: None,
        }
    }

    /// Error event; `percent` keeps the last reported value
    pub fn error(job_id: &JobId, percent: f64, message: impl Into<String>) -> Self {
        Self {
            job_id: job_id.clone(),
            percent,
            state: ProgressState::Error,
            speed_multiplier: None,
            output_path: None,
            error_message: Some(message.into()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, ProgressState::Complete | ProgressState::Error)
    }
}

/// Filmstrip extraction progress: frames written so far out of the expected total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameProgress {
    pub current: u32,
    pub total: u32,
}

/// Derived preview assets for one source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewBundle {
    /// Data URI of a single small frame
    pub thumbnail: String,
    /// Data URIs sampled uniformly across the clip, in time order
    pub filmstrip: Vec<String>,
    /// Peak amplitudes in [0, 1], one per 10 ms of audio
    pub waveform: Vec<f32>,
}
