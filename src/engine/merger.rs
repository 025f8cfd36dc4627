//! Multi-clip merge state machine
//!
//! `Validating -> Analyzing -> Processing -> {Complete | Failed}`, with
//! `Cancelled` reachable from `Processing` only. Validation failures return
//! before any process is spawned and never appear as progress events.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, error, info, warn};

use super::command::merge_args;
use super::progress::ProgressSink;
use super::registry::JobRegistry;
use super::EncoderSettings;
use crate::domain::errors::DomainError;
use crate::domain::model::{JobId, MediaDescriptor, MergeJob, MergeState, ProgressEvent};
use crate::domain::rules::MergeRules;
use crate::ports::{KillSwitch, ProcessExit, ProcessHandle, ProcessPort};
use crate::probe::MediaProbe;
use crate::streams::{self, DiagnosticLines, DiagnosticTail};
use crate::utils::path::resolve_output_path;

/// Runs merge jobs and routes cancel requests to them
pub struct MergeEngine {
    process: Arc<dyn ProcessPort>,
    probe: Arc<MediaProbe>,
    registry: Arc<JobRegistry>,
    settings: EncoderSettings,
}

/// A started encoder process, registered under its job id
struct Launched {
    handle: Box<dyn ProcessHandle>,
    switch: KillSwitch,
    output_path: PathBuf,
    total_seconds: f64,
}

/// Percent tracking for one running job
struct ProgressTracker {
    total_seconds: f64,
    last_time: Option<f64>,
    last_percent: f64,
    pending_speed: Option<f64>,
}

impl ProgressTracker {
    fn new(total_seconds: f64) -> Self {
        Self {
            total_seconds,
            last_time: None,
            last_percent: 0.0,
            pending_speed: None,
        }
    }

    /// Event for a diagnostic line, if it carries a new position
    fn observe(&mut self, job_id: &JobId, line: &str) -> Option<ProgressEvent> {
        if let Some(speed) = streams::parse_speed_multiplier(line) {
            self.pending_speed = Some(speed);
        }
        let time = streams::parse_current_time(line)?;
        if self.last_time == Some(time) {
            return None;
        }
        self.last_time = Some(time);

        // Percent never moves backwards within one job
        let percent = MergeRules::progress_percent(time, self.total_seconds).max(self.last_percent);
        self.last_percent = percent;
        Some(ProgressEvent::processing(
            job_id,
            percent,
            self.pending_speed.take(),
        ))
    }
}

impl MergeEngine {
    pub fn new(
        process: Arc<dyn ProcessPort>,
        probe: Arc<MediaProbe>,
        registry: Arc<JobRegistry>,
        settings: EncoderSettings,
    ) -> Self {
        Self {
            process,
            probe,
            registry,
            settings,
        }
    }

    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.registry
    }

    pub fn settings(&self) -> &EncoderSettings {
        &self.settings
    }

    /// Terminate a running job. Unknown or finished ids are a silent no-op.
    pub fn cancel(&self, job_id: &JobId) -> bool {
        self.registry.cancel(job_id)
    }

    /// Run `job` to completion, streaming progress into `progress`.
    ///
    /// Resolves to the written output path.
    pub async fn merge(
        &self,
        job: MergeJob,
        progress: ProgressSink<ProgressEvent>,
    ) -> Result<PathBuf, DomainError> {
        let job_id = job.job_id.clone();
        info!(job_id = %job_id, clips = job.clips.len(), format = %job.output_format, "Starting merge");

        transition(&job_id, MergeState::Validating);
        self.validate(&job).await?;

        transition(&job_id, MergeState::Analyzing);
        progress.emit(ProgressEvent::analyzing(&job_id));
        let Launched {
            mut handle,
            switch,
            output_path,
            total_seconds,
        } = match self.launch(&job).await {
            Ok(launched) => launched,
            Err(e) => return Err(fail(&job_id, &progress, 0.0, e)),
        };

        transition(&job_id, MergeState::Processing);
        let (tracker, tail) =
            drain_progress(handle.as_mut(), &job_id, &switch, total_seconds, &progress).await;
        let waited = handle.wait().await;
        self.registry.deregister(&job_id, &switch);

        let exit = match waited {
            Ok(exit) => exit,
            Err(e) => return Err(fail(&job_id, &progress, tracker.last_percent, e)),
        };

        if switch.is_tripped() {
            transition(&job_id, MergeState::Cancelled);
            remove_partial_output(&output_path).await;
            info!(job_id = %job_id, "Merge cancelled");
            return Err(DomainError::Cancelled {
                job_id: job_id.to_string(),
            });
        }

        if exit.success() {
            transition(&job_id, MergeState::Complete);
            progress.emit(ProgressEvent::complete(&job_id, &output_path));
            info!(job_id = %job_id, output = %output_path.display(), "Merge complete");
            return Ok(output_path);
        }

        transition(&job_id, MergeState::Failed);
        let message = failure_message(&exit, &tail);
        error!(job_id = %job_id, code = ?exit.code, message = %message, "Merge failed");
        progress.emit(ProgressEvent::error(&job_id, tracker.last_percent, message.clone()));
        Err(DomainError::MergeFailed {
            exit_code: exit.code,
            message,
        })
    }

    async fn validate(&self, job: &MergeJob) -> Result<(), DomainError> {
        if job.clips.is_empty() {
            return Err(DomainError::NoInputClips);
        }
        if self.registry.is_running(&job.job_id) {
            return Err(DomainError::JobAlreadyRunning {
                job_id: job.job_id.to_string(),
            });
        }
        for clip in &job.clips {
            MergeRules::validate_trim(clip)?;
        }
        for clip in &job.clips {
            let exists = tokio::fs::try_exists(&clip.source_path)
                .await
                .unwrap_or(false);
            if !exists {
                return Err(DomainError::ClipNotFound {
                    path: clip.source_path.clone(),
                });
            }
        }
        Ok(())
    }

    /// Probe the sources, pick the output path and start the encoder under `job`'s id
    async fn launch(&self, job: &MergeJob) -> Result<Launched, DomainError> {
        let descriptors = self.analyze(job).await?;
        let total_seconds = MergeRules::total_duration(&job.clips, &descriptors);
        debug!(job_id = %job.job_id, total_seconds, "Total output duration computed");

        let output_path = resolve_output_path(
            job.output_path.as_deref(),
            &self.settings.output_directory,
            job.output_format,
        )
        .await?;
        let args = merge_args(&job.clips, job.output_format, &self.settings, &output_path);
        debug!(job_id = %job.job_id, args = ?args, "Merge command built");

        let mut handle = self.process.spawn(&self.settings.ffmpeg_path, &args).await?;
        let switch = handle.kill_switch();
        if let Err(e) = self.registry.register(job.job_id.clone(), switch.clone()) {
            // Lost a race with another merge using the same id
            switch.terminate();
            if let Err(wait_err) = handle.wait().await {
                warn!(job_id = %job.job_id, error = %wait_err, "Failed to reap refused encoder");
            }
            return Err(e);
        }

        Ok(Launched {
            handle,
            switch,
            output_path,
            total_seconds,
        })
    }

    /// Probe every source concurrently.
    ///
    /// An unavailable encoder aborts the merge. Any other probe failure only
    /// costs that clip its contribution to the progress denominator.
    async fn analyze(&self, job: &MergeJob) -> Result<Vec<MediaDescriptor>, DomainError> {
        let results = join_all(job.clips.iter().map(|clip| self.probe.probe(clip.source()))).await;

        let mut descriptors = Vec::with_capacity(results.len());
        for (clip, result) in job.clips.iter().zip(results) {
            match result {
                Ok(descriptor) => descriptors.push(descriptor),
                Err(e) if e.is_process_unavailable() => return Err(e),
                Err(e) => {
                    warn!(
                        job_id = %job.job_id,
                        path = %clip.source_path.display(),
                        error = %e,
                        "Probe failed, duration unknown"
                    );
                    descriptors.push(MediaDescriptor::unknown(
                        clip.source_path.to_string_lossy(),
                    ));
                }
            }
        }
        Ok(descriptors)
    }
}

fn transition(job_id: &JobId, state: MergeState) {
    debug!(job_id = %job_id, state = ?state, "Merge state");
}

/// Report a runtime failure on the event stream and hand the error back
fn fail(
    job_id: &JobId,
    progress: &ProgressSink<ProgressEvent>,
    percent: f64,
    error: DomainError,
) -> DomainError {
    transition(job_id, MergeState::Failed);
    error!(job_id = %job_id, error = %error, "Merge failed");
    progress.emit(ProgressEvent::error(job_id, percent, error.to_string()));
    error
}

/// Scan the encoder's diagnostics until the stream closes or the kill switch trips.
///
/// Nothing is emitted once the switch has tripped, even for lines already buffered.
async fn drain_progress(
    handle: &mut dyn ProcessHandle,
    job_id: &JobId,
    switch: &KillSwitch,
    total_seconds: f64,
    progress: &ProgressSink<ProgressEvent>,
) -> (ProgressTracker, DiagnosticTail) {
    let mut tracker = ProgressTracker::new(total_seconds);
    let mut tail = DiagnosticTail::default();
    let Some(stderr) = handle.take_stderr() else {
        return (tracker, tail);
    };

    let mut lines = DiagnosticLines::new(stderr);
    loop {
        let next = tokio::select! {
            next = lines.next_line() => next,
            _ = switch.tripped() => break,
        };
        match next {
            Ok(Some(line)) => {
                tail.push(&line);
                if switch.is_tripped() {
                    break;
                }
                if let Some(event) = tracker.observe(job_id, &line) {
                    progress.emit(event);
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!(job_id = %job_id, error = %e, "Stopped reading encoder diagnostics");
                break;
            }
        }
    }
    (tracker, tail)
}

fn failure_message(exit: &ProcessExit, tail: &DiagnosticTail) -> String {
    match (exit.code, tail.last()) {
        (Some(code), Some(line)) => format!("Encoder exited with code {}: {}", code, line),
        (Some(code), None) => format!("Encoder exited with code {}", code),
        (None, Some(line)) => format!("Encoder terminated by signal: {}", line),
        (None, None) => "Encoder terminated by signal".to_string(),
    }
}

/// Best-effort removal of a cancelled job's output
async fn remove_partial_output(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "Removed partial output"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove partial output"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_attaches_speed_and_stays_monotonic() {
        let id = JobId::new("j");
        let mut tracker = ProgressTracker::new(20.0);

        assert!(tracker.observe(&id, "Press [q] to stop").is_none());

        let first = tracker
            .observe(&id, "frame=  50 fps=25 time=00:00:05.00 bitrate=N/A speed=2.5x")
            .unwrap();
        assert_eq!(first.percent, 25.0);
        assert_eq!(first.speed_multiplier, Some(2.5));

        // A repeated position yields nothing
        assert!(tracker.observe(&id, "time=00:00:05.00").is_none());

        let regressed = tracker.observe(&id, "time=00:00:02.00").unwrap();
        assert_eq!(regressed.percent, 25.0);
        assert_eq!(regressed.speed_multiplier, None);

        let past_end = tracker.observe(&id, "time=00:00:30.00 speed=3x").unwrap();
        assert_eq!(past_end.percent, 100.0);
    }

    #[test]
    fn test_tracker_unknown_total_reports_zero() {
        let id = JobId::new("j");
        let mut tracker = ProgressTracker::new(0.0);
        let event = tracker.observe(&id, "time=00:00:05.00").unwrap();
        assert_eq!(event.percent, 0.0);
    }

    #[test]
    fn test_failure_message() {
        let mut tail = DiagnosticTail::default();
        tail.push("Conversion failed!");
        let exit = ProcessExit { code: Some(1), terminated: false };
        assert_eq!(
            failure_message(&exit, &tail),
            "Encoder exited with code 1: Conversion failed!"
        );
        let killed = ProcessExit { code: None, terminated: false };
        assert_eq!(
            failure_message(&killed, &DiagnosticTail::default()),
            "Encoder terminated by signal"
        );
    }
}
