//! Error handling module for Reelmux

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::errors::DomainError;

/// Application-level error type
#[derive(Error, Debug)]
pub enum ReelmuxError {
    /// Configuration value rejected
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Configuration file could not be parsed
    #[error("Failed to parse config file {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Configuration could not be serialized
    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Logging subscriber could not be installed
    #[error("Failed to initialize logging: {message}")]
    LoggingInit { message: String },

    /// Probe, preview or merge failure
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for Reelmux operations
pub type ReelmuxResult<T> = std::result::Result<T, ReelmuxError>;
