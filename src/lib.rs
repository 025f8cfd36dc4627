//! Reelmux Library
//!
//! Orchestrates an external encoder process to inspect media files, derive
//! preview assets (thumbnails, filmstrips, waveform envelopes) and concatenate
//! trimmed clips with streamed progress and cancellation.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod error;
pub mod ports;
pub mod preview;
pub mod probe;
pub mod streams;
pub mod utils;

// Re-export commonly used types
pub use app::{AppContainer, DefaultAppContainer};
pub use domain::errors::DomainError;
pub use domain::model::{
    ClipRequest, JobId, MediaDescriptor, MergeJob, OutputFormat, PreviewBundle, ProgressEvent,
    ProgressState,
};
pub use engine::{JobRegistry, MergeEngine, ProgressSink};
pub use error::{ReelmuxError, ReelmuxResult};
pub use preview::PreviewGenerator;
pub use probe::MediaProbe;
