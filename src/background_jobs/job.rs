use super::context::JobContext;
use super::schedule::{CronSchedule, ScheduleError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::time::Duration;
use thiserror::Error;

/// When a job runs: a recurring cron schedule, optionally combined with a
/// one-time run shortly after the scheduler starts.
#[derive(Debug, Clone)]
pub struct JobSchedule {
    cron: CronSchedule,
    startup_run: Option<Duration>,
}

impl JobSchedule {
    /// Build a schedule from a 5-field cron expression, evaluated in UTC.
    pub fn cron(expression: &str) -> Result<Self, ScheduleError> {
        Ok(Self {
            cron: CronSchedule::parse(expression)?,
            startup_run: None,
        })
    }

    /// Also run once, `delay` after the scheduler starts.
    pub fn with_startup_run(mut self, delay: Duration) -> Self {
        self.startup_run = Some(delay);
        self
    }

    pub fn cron_schedule(&self) -> &CronSchedule {
        &self.cron
    }

    /// The startup-run delay, if the job wants a run after process start.
    pub fn startup_run(&self) -> Option<Duration> {
        self.startup_run
    }

    /// Next recurring due instant strictly after `after`.
    pub fn next_due_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.cron.next_after(after)
    }
}

/// Errors that can occur during job execution.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
    #[error("job was cancelled")]
    Cancelled,
    #[error("job timed out")]
    Timeout,
}

/// Trait for background jobs.
///
/// Jobs execute as asynchronous tasks spawned by the scheduler. A job
/// never overlaps with itself; distinct jobs may run concurrently.
#[async_trait]
pub trait BackgroundJob: Send + Sync {
    /// Unique identifier for this job.
    fn id(&self) -> &'static str;

    /// Human-readable name for this job.
    fn name(&self) -> &'static str;

    /// Description of what this job does.
    fn description(&self) -> &'static str;

    /// When this job should be scheduled to run.
    fn schedule(&self) -> &JobSchedule;

    /// Upper bound on a single invocation. Expiry is recorded as a
    /// failure; the job runs again on its next due tick.
    fn timeout(&self) -> Option<Duration> {
        None
    }

    /// Execute the job, returning a JSON summary of what it did.
    ///
    /// Implementations should periodically check `ctx.is_cancelled()`
    /// during long-running operations and return early with
    /// `JobError::Cancelled` if true.
    async fn execute(&self, ctx: &JobContext) -> Result<JsonValue, JobError>;
}

/// Outcome of the most recent run of a job.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobRunResult {
    Success { summary: JsonValue },
    Failure { error: String },
}

impl JobRunResult {
    pub fn is_success(&self) -> bool {
        matches!(self, JobRunResult::Success { .. })
    }
}

/// Per-job execution state. In-memory only: one record per registered
/// job, created when the scheduler starts and mutated on every run.
#[derive(Debug, Clone, Default)]
pub struct JobExecutionRecord {
    /// True for the duration of an active invocation. At most one
    /// invocation per job id exists at any instant.
    pub is_running: bool,
    pub last_run_at: Option<DateTime<Utc>>,
    pub last_result: Option<JobRunResult>,
    /// The recurring due instant the poll loop compares against,
    /// recomputed after every completed run.
    pub next_due_at: Option<DateTime<Utc>>,
}
