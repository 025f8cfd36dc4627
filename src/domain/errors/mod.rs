// Domain errors - Failure kinds surfaced by probe, preview and merge operations

use std::path::PathBuf;

use thiserror::Error;

/// Domain-specific error types
#[derive(Error, Debug)]
pub enum DomainError {
    /// Encoder binary missing or could not be started
    #[error("Encoder process unavailable ({program}): {reason}")]
    ProcessUnavailable { program: String, reason: String },

    /// A merge clip points at a file that does not exist
    #[error("Clip source not found: {}", path.display())]
    ClipNotFound { path: PathBuf },

    /// A merge was requested without any clips
    #[error("Merge requires at least one input clip")]
    NoInputClips,

    /// Trim bounds rejected during validation
    #[error("Invalid trim for {}: {reason}", path.display())]
    InvalidTrim { path: PathBuf, reason: String },

    /// Thumbnail, filmstrip or waveform generation failed
    #[error("Preview unavailable ({operation}): {reason}")]
    PreviewUnavailable {
        operation: &'static str,
        reason: String,
    },

    /// Concatenation process exited unsuccessfully
    #[error("Merge failed with exit code {}: {message}", exit_code.map_or_else(|| "none".to_string(), |c| c.to_string()))]
    MergeFailed {
        exit_code: Option<i32>,
        message: String,
    },

    /// Probe output could not be interpreted at all
    #[error("Could not interpret probe output for {}: {reason}", path.display())]
    ParseFailure { path: PathBuf, reason: String },

    /// Source file could not be read during probing
    #[error("Source inaccessible {}: {reason}", path.display())]
    SourceInaccessible { path: PathBuf, reason: String },

    /// A merge with the same job id is still running
    #[error("Job {job_id} is already running")]
    JobAlreadyRunning { job_id: String },

    /// Job was cancelled before it reached a terminal state
    #[error("Job {job_id} was cancelled")]
    Cancelled { job_id: String },

    /// Scratch or output I/O failure
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl DomainError {
    /// Wrap an I/O error with a short description of what was being attempted
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        DomainError::Io {
            context: context.into(),
            source,
        }
    }

    /// Whether the failure means the encoder itself cannot be used
    pub fn is_process_unavailable(&self) -> bool {
        matches!(self, DomainError::ProcessUnavailable { .. })
    }
}
