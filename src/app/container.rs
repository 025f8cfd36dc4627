use std::sync::Arc;

use tracing::{info, warn};

use crate::adapters::toml_config::ReelmuxConfig;
use crate::adapters::TokioProcessAdapter;
use crate::domain::errors::DomainError;
use crate::engine::{JobRegistry, MergeEngine};
use crate::ports::ProcessPort;
use crate::preview::PreviewGenerator;
use crate::probe::MediaProbe;
use crate::streams::read_all_text;

pub trait AppContainer: Send + Sync {
    fn probe(&self) -> Arc<MediaProbe>;
    fn previews(&self) -> Arc<PreviewGenerator>;
    fn merger(&self) -> Arc<MergeEngine>;
    fn registry(&self) -> Arc<JobRegistry>;
}

/// Wires the orchestration components around one process port and one job registry
pub struct DefaultAppContainer {
    config: ReelmuxConfig,
    process: Arc<dyn ProcessPort>,
    probe: Arc<MediaProbe>,
    previews: Arc<PreviewGenerator>,
    merger: Arc<MergeEngine>,
    registry: Arc<JobRegistry>,
}

impl DefaultAppContainer {
    /// Container backed by real child processes
    pub fn new(config: ReelmuxConfig) -> Self {
        Self::with_process(config, Arc::new(TokioProcessAdapter::new()))
    }

    /// Container around an injected process port
    pub fn with_process(config: ReelmuxConfig, process: Arc<dyn ProcessPort>) -> Self {
        let registry = Arc::new(JobRegistry::new());
        let probe = Arc::new(MediaProbe::new(
            Arc::clone(&process),
            config.encoder.ffmpeg_path.clone(),
        ));
        let previews = Arc::new(PreviewGenerator::new(
            Arc::clone(&process),
            config.preview_settings(),
        ));
        let merger = Arc::new(MergeEngine::new(
            Arc::clone(&process),
            Arc::clone(&probe),
            Arc::clone(&registry),
            config.encoder_settings(),
        ));

        Self {
            config,
            process,
            probe,
            previews,
            merger,
            registry,
        }
    }

    pub fn config(&self) -> &ReelmuxConfig {
        &self.config
    }

    /// Confirm the encoder can be started; returns its version banner line
    pub async fn verify_encoder(&self) -> Result<String, DomainError> {
        let program = &self.config.encoder.ffmpeg_path;
        let mut handle = self
            .process
            .spawn(program, &["-version".to_string()])
            .await?;

        let banner = match handle.take_stdout() {
            Some(stdout) => read_all_text(stdout).await.unwrap_or_else(|e| {
                warn!(error = %e, "Failed to read encoder version output");
                String::new()
            }),
            None => String::new(),
        };
        let exit = handle.wait().await?;
        if !exit.success() {
            return Err(DomainError::ProcessUnavailable {
                program: program.display().to_string(),
                reason: format!("version check exited with {:?}", exit.code),
            });
        }

        let version = banner.lines().next().unwrap_or_default().trim().to_string();
        info!(program = %program.display(), version = %version, "Encoder available");
        Ok(version)
    }
}

impl AppContainer for DefaultAppContainer {
    fn probe(&self) -> Arc<MediaProbe> {
        Arc::clone(&self.probe)
    }

    fn previews(&self) -> Arc<PreviewGenerator> {
        Arc::clone(&self.previews)
    }

    fn merger(&self) -> Arc<MergeEngine> {
        Arc::clone(&self.merger)
    }

    fn registry(&self) -> Arc<JobRegistry> {
        Arc::clone(&self.registry)
    }
}
