//! Registry of running merge jobs
//!
//! Maps a job id to the kill switch of its encoder process so a cancel request
//! can arrive from any task. Entries exist only while the process runs.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info};

use crate::domain::errors::DomainError;
use crate::domain::model::JobId;
use crate::ports::KillSwitch;

/// Shared job id -> running process table
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: Mutex<HashMap<JobId, KillSwitch>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<JobId, KillSwitch>> {
        // Entries are plain data; a panicked holder cannot leave them half-written
        self.jobs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Track a running job.
    ///
    /// Fails with [`DomainError::JobAlreadyRunning`] when another process is
    /// already registered under `job_id`; the existing entry is left untouched.
    pub fn register(&self, job_id: JobId, switch: KillSwitch) -> Result<(), DomainError> {
        match self.lock().entry(job_id) {
            Entry::Occupied(entry) => Err(DomainError::JobAlreadyRunning {
                job_id: entry.key().to_string(),
            }),
            Entry::Vacant(entry) => {
                debug!(job_id = %entry.key(), "Registering job");
                entry.insert(switch);
                Ok(())
            }
        }
    }

    /// Forget a job once its process has exited.
    ///
    /// Only the entry holding `switch` is removed.
    pub fn deregister(&self, job_id: &JobId, switch: &KillSwitch) {
        let mut jobs = self.lock();
        if jobs.get(job_id).is_some_and(|held| held.same_as(switch)) {
            jobs.remove(job_id);
            debug!(job_id = %job_id, "Job deregistered");
        }
    }

    /// Request termination of a running job.
    ///
    /// Returns `false` (and does nothing) when no such job is running.
    pub fn cancel(&self, job_id: &JobId) -> bool {
        let switch = self.lock().get(job_id).cloned();
        match switch {
            Some(switch) => {
                info!(job_id = %job_id, "Cancelling job");
                switch.terminate();
                true
            }
            None => {
                debug!(job_id = %job_id, "Cancel requested for unknown job");
                false
            }
        }
    }

    pub fn is_running(&self, job_id: &JobId) -> bool {
        self.lock().contains_key(job_id)
    }
}
