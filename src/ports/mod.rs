// Ports - Interface definitions (contracts)

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::AsyncRead;
use tokio::sync::Notify;

use crate::domain::errors::*;

/// Raw byte stream from a child process pipe
pub type OutputStream = Box<dyn AsyncRead + Send + Unpin>;

/// Port for launching the external encoder
#[async_trait]
pub trait ProcessPort: Send + Sync {
    /// Start `program` with `args`.
    ///
    /// A program that cannot be started (missing binary, permission denied)
    /// fails with [`DomainError::ProcessUnavailable`].
    async fn spawn(&self, program: &Path, args: &[String])
        -> Result<Box<dyn ProcessHandle>, DomainError>;
}

/// A running external process
#[async_trait]
pub trait ProcessHandle: Send {
    /// Diagnostic (standard error) stream; `None` once taken
    fn take_stderr(&mut self) -> Option<OutputStream>;

    /// Standard output stream; `None` once taken
    fn take_stdout(&mut self) -> Option<OutputStream>;

    /// Handle that can terminate this process from elsewhere
    fn kill_switch(&self) -> KillSwitch;

    /// Wait for the process to exit, honouring the kill switch
    async fn wait(&mut self) -> Result<ProcessExit, DomainError>;
}

/// How a process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    /// Exit code; `None` when killed by a signal
    pub code: Option<i32>,
    /// Whether termination was requested through the kill switch
    pub terminated: bool,
}

impl ProcessExit {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Cloneable, idempotent terminate request for one process.
///
/// Tripping the switch after the process already exited is a no-op.
#[derive(Debug, Clone, Default)]
pub struct KillSwitch {
    inner: Arc<KillState>,
}

#[derive(Debug, Default)]
struct KillState {
    tripped: AtomicBool,
    notify: Notify,
}

impl KillSwitch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request termination
    pub fn terminate(&self) {
        if !self.inner.tripped.swap(true, Ordering::SeqCst) {
            // Wake every current waiter, and leave a permit for one arriving late
            self.inner.notify.notify_waiters();
            self.inner.notify.notify_one();
        }
    }

    pub fn is_tripped(&self) -> bool {
        self.inner.tripped.load(Ordering::SeqCst)
    }

    /// Whether both handles control the same process
    pub fn same_as(&self, other: &KillSwitch) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Resolves once termination has been requested
    pub async fn tripped(&self) {
        if self.is_tripped() {
            return;
        }
        // The stored permit covers a trip between the check and the await
        self.inner.notify.notified().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_kill_switch_resolves_after_trip() {
        let switch = KillSwitch::new();
        let remote = switch.clone();

        let waiter = tokio::spawn(async move {
            switch.tripped().await;
            switch.is_tripped()
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        remote.terminate();
        assert!(waiter.await.unwrap());
    }

    #[tokio::test]
    async fn test_kill_switch_trip_before_wait() {
        let switch = KillSwitch::new();
        switch.terminate();
        switch.terminate();
        tokio::time::timeout(Duration::from_secs(1), switch.tripped())
            .await
            .expect("already-tripped switch must resolve immediately");
    }

    #[test]
    fn test_kill_switch_identity() {
        let switch = KillSwitch::new();
        assert!(switch.same_as(&switch.clone()));
        assert!(!switch.same_as(&KillSwitch::new()));
    }

    #[test]
    fn test_process_exit_success() {
        assert!(ProcessExit { code: Some(0), terminated: false }.success());
        assert!(!ProcessExit { code: Some(1), terminated: false }.success());
        assert!(!ProcessExit { code: None, terminated: true }.success());
    }
}
