//! Encoder process adapter
//!
//! Runs the external encoder through `tokio::process`, piping both output
//! streams so callers can scrape diagnostics and read raw payloads.

use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::{Child, Command};
use tracing::debug;

use crate::domain::errors::*;
use crate::ports::*;

/// tokio-backed process runner
#[derive(Debug, Clone, Default)]
pub struct TokioProcessAdapter;

impl TokioProcessAdapter {
    /// Create new process adapter
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessPort for TokioProcessAdapter {
    async fn spawn(
        &self,
        program: &Path,
        args: &[String],
    ) -> Result<Box<dyn ProcessHandle>, DomainError> {
        debug!(program = %program.display(), args = ?args, "Spawning encoder process");

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DomainError::ProcessUnavailable {
                program: program.display().to_string(),
                reason: match e.kind() {
                    ErrorKind::NotFound => "executable not found".to_string(),
                    ErrorKind::PermissionDenied => "permission denied".to_string(),
                    _ => e.to_string(),
                },
            })?;

        Ok(Box::new(TokioProcess {
            child,
            kill_switch: KillSwitch::new(),
        }))
    }
}

/// Child process plus its terminate handle
struct TokioProcess {
    child: Child,
    kill_switch: KillSwitch,
}

#[async_trait]
impl ProcessHandle for TokioProcess {
    fn take_stderr(&mut self) -> Option<OutputStream> {
        self.child
            .stderr
            .take()
            .map(|stream| Box::new(stream) as OutputStream)
    }

    fn take_stdout(&mut self) -> Option<OutputStream> {
        self.child
            .stdout
            .take()
            .map(|stream| Box::new(stream) as OutputStream)
    }

    fn kill_switch(&self) -> KillSwitch {
        self.kill_switch.clone()
    }

    async fn wait(&mut self) -> Result<ProcessExit, DomainError> {
        let status = tokio::select! {
            status = self.child.wait() => status,
            _ = self.kill_switch.tripped() => {
                // Fails only when the child already exited, which is fine
                if let Err(e) = self.child.start_kill() {
                    debug!(error = %e, "Kill request found process already gone");
                }
                self.child.wait().await
            }
        }
        .map_err(|e| DomainError::io("Failed to wait for encoder process", e))?;

        Ok(ProcessExit {
            code: status.code(),
            terminated: self.kill_switch.is_tripped(),
        })
    }
}
