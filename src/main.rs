//! Reelmux
//!
//! Command-line front end for probing media files, rendering preview assets
//! and merging trimmed clips through an external encoder.
//!
//! # Usage
//!
//! ```bash
//! reelmux probe intro.mp4 talk.mov --json
//! reelmux preview talk.mov
//! reelmux merge --clip intro.mp4 --clip talk.mov@12.5:95 --format mkv
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use reelmux::adapters::init_logging;
use reelmux::app::DefaultAppContainer;
use reelmux::cli::{commands, Cli};
use reelmux::config_initialization::initialize_configuration_hierarchy;

/// Main entry point for the Reelmux CLI application
#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    let loaded = initialize_configuration_hierarchy(&cli.overrides())
        .await
        .context("Failed to load configuration")?;
    init_logging(&loaded.config.logging.level, loaded.config.logging.format)?;

    match &loaded.source {
        Some(path) => info!("Configuration loaded from {}", path.display()),
        None => info!("Using default configuration"),
    }

    let container = DefaultAppContainer::new(loaded.config);
    container
        .verify_encoder()
        .await
        .context("Encoder is not available")?;

    commands::execute(cli.command, &container).await
}
