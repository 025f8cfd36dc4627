// Tracing log adapter - Structured logging using tracing crate

use tracing_subscriber::EnvFilter;

use crate::adapters::toml_config::LogFormat;
use crate::error::{ReelmuxError, ReelmuxResult};

/// Build the filter: `RUST_LOG` wins, otherwise `level` for this crate
pub fn build_filter(level: &str) -> ReelmuxResult<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(format!("reelmux={0},{0}", level.to_lowercase())).map_err(|e| {
        ReelmuxError::LoggingInit {
            message: format!("invalid log level '{}': {}", level, e),
        }
    })
}

/// Install the global subscriber. Writes to stderr so stdout stays clean for
/// JSON command output. A subscriber that is already installed is kept.
pub fn init_logging(level: &str, format: LogFormat) -> ReelmuxResult<()> {
    let filter = build_filter(level)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    if let Err(e) = installed {
        tracing::debug!("Logging already initialized: {}", e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_repeatable() {
        assert!(init_logging("debug", LogFormat::Pretty).is_ok());
        assert!(init_logging("info", LogFormat::Json).is_ok());
    }
}
