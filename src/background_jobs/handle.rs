use super::job::JobRunResult;
use super::registry::JobRegistry;
use super::scheduler::SharedJobState;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Point-in-time view of a registered job for observation surfaces.
#[derive(Debug, Clone, Serialize)]
pub struct JobSnapshot {
    pub id: String,
    pub name: String,
    pub description: String,
    /// The job's cron expression.
    pub schedule: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub startup_run_secs: Option<u64>,
    pub is_running: bool,
    /// RFC3339 timestamps.
    pub last_run_at: Option<String>,
    pub last_result: Option<JobRunResult>,
    pub next_due_at: Option<String>,
}

/// Read-only handle for observing the scheduler from outside the loop.
#[derive(Clone)]
pub struct SchedulerHandle {
    registry: Arc<JobRegistry>,
    shared_state: Arc<RwLock<SharedJobState>>,
}

impl SchedulerHandle {
    pub(crate) fn new(
        registry: Arc<JobRegistry>,
        shared_state: Arc<RwLock<SharedJobState>>,
    ) -> Self {
        Self {
            registry,
            shared_state,
        }
    }

    /// Snapshots of all registered jobs, in registration order.
    pub async fn list_jobs(&self) -> Vec<JobSnapshot> {
        let state = self.shared_state.read().await;
        self.registry
            .jobs()
            .iter()
            .map(|job| Self::snapshot(job.as_ref(), &state))
            .collect()
    }

    /// Snapshot of a specific job.
    pub async fn job(&self, job_id: &str) -> Option<JobSnapshot> {
        let state = self.shared_state.read().await;
        self.registry
            .get(job_id)
            .map(|job| Self::snapshot(job.as_ref(), &state))
    }

    /// Check if a job is currently running.
    pub async fn is_job_running(&self, job_id: &str) -> bool {
        let state = self.shared_state.read().await;
        state
            .records
            .get(job_id)
            .map(|record| record.is_running)
            .unwrap_or(false)
    }

    /// Check if a job with the given id is registered.
    pub fn job_exists(&self, job_id: &str) -> bool {
        self.registry.get(job_id).is_some()
    }

    fn snapshot(job: &dyn super::job::BackgroundJob, state: &SharedJobState) -> JobSnapshot {
        let record = state.records.get(job.id());
        JobSnapshot {
            id: job.id().to_string(),
            name: job.name().to_string(),
            description: job.description().to_string(),
            schedule: job.schedule().cron_schedule().expression().to_string(),
            startup_run_secs: job.schedule().startup_run().map(|d| d.as_secs()),
            is_running: record.map(|r| r.is_running).unwrap_or(false),
            last_run_at: record
                .and_then(|r| r.last_run_at)
                .map(|at| at.to_rfc3339()),
            last_result: record.and_then(|r| r.last_result.clone()),
            next_due_at: record
                .and_then(|r| r.next_due_at)
                .map(|at| at.to_rfc3339()),
        }
    }
}
