use super::job::BackgroundJob;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Errors raised at registration time. Both are fatal: the process should
/// refuse to start rather than run with a broken job table.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("a job named '{0}' is already registered")]
    DuplicateJob(String),
}

/// Process-wide table of registered jobs.
///
/// Jobs are registered once at startup and never mutated afterwards;
/// reconfiguration requires a restart. Iteration follows registration
/// order so startup logging is deterministic.
#[derive(Default)]
pub struct JobRegistry {
    jobs: Vec<Arc<dyn BackgroundJob>>,
    names: HashSet<&'static str>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job, rejecting duplicate ids.
    pub fn register(&mut self, job: Arc<dyn BackgroundJob>) -> Result<(), RegistryError> {
        if !self.names.insert(job.id()) {
            return Err(RegistryError::DuplicateJob(job.id().to_string()));
        }
        info!(
            "Registered job: {} ({}) - {}",
            job.id(),
            job.schedule().cron_schedule(),
            job.description()
        );
        self.jobs.push(job);
        Ok(())
    }

    /// All registered jobs, in registration order.
    pub fn jobs(&self) -> &[Arc<dyn BackgroundJob>] {
        &self.jobs
    }

    pub fn get(&self, job_id: &str) -> Option<&Arc<dyn BackgroundJob>> {
        self.jobs.iter().find(|job| job.id() == job_id)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
