use super::context::JobContext;
use super::handle::SchedulerHandle;
use super::job::{BackgroundJob, JobError, JobExecutionRecord, JobRunResult};
use super::registry::JobRegistry;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// How long shutdown waits for still-running jobs before giving up.
const SHUTDOWN_WAIT: Duration = Duration::from_secs(30);

/// What caused a run attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunTrigger {
    /// The job's recurring schedule came due.
    Schedule,
    /// The one-time run after process start.
    Startup,
}

impl RunTrigger {
    fn as_str(&self) -> &'static str {
        match self {
            RunTrigger::Schedule => "schedule",
            RunTrigger::Startup => "startup",
        }
    }
}

/// A request to attempt one run of a job.
///
/// Both the poll tick and the startup timers enqueue these into one
/// channel drained by the scheduler loop, which applies the per-job
/// gate. An attempt against a running job is skipped, never queued.
struct RunRequest {
    job_id: &'static str,
    trigger: RunTrigger,
}

/// State shared between the scheduler loop, the per-run executor tasks
/// and the read-only handle.
#[derive(Default)]
pub struct SharedJobState {
    /// Execution record per registered job id.
    pub records: HashMap<&'static str, JobExecutionRecord>,
}

/// Manages background job scheduling and execution.
///
/// A single coordinating loop per process: polls on a fixed cadence,
/// evaluates due-ness per job against its recorded next-due instant, and
/// runs each due job as an independent task. Jobs may interleave with
/// each other but never with themselves.
pub struct JobScheduler {
    registry: Arc<JobRegistry>,

    /// Shared state also visible to SchedulerHandle and executor tasks.
    shared_state: Arc<RwLock<SharedJobState>>,

    /// Task handles for runs that have been spawned and not yet reaped.
    running_handles: HashMap<&'static str, JoinHandle<()>>,

    run_tx: mpsc::Sender<RunRequest>,
    run_rx: mpsc::Receiver<RunRequest>,

    poll_interval: Duration,

    /// Token to signal scheduler shutdown.
    shutdown_token: CancellationToken,

    /// Shared context provided to jobs during execution.
    job_context: JobContext,
}

impl JobScheduler {
    /// Main scheduler loop.
    pub async fn run(&mut self) {
        info!(
            "Starting job scheduler with {} registered job(s), polling every {:?}",
            self.registry.len(),
            self.poll_interval
        );

        self.initialize_records().await;
        self.spawn_startup_timers();

        let mut poll = tokio::time::interval(self.poll_interval);
        poll.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = poll.tick() => {
                    self.cleanup_completed_jobs();
                    self.enqueue_due_jobs().await;
                }
                Some(request) = self.run_rx.recv() => {
                    self.attempt_run(request).await;
                }
                _ = self.shutdown_token.cancelled() => {
                    info!("Scheduler received shutdown signal");
                    self.shutdown().await;
                    break;
                }
            }
        }

        info!("Job scheduler stopped");
    }

    /// Create the execution record for every registered job, seeding the
    /// first due instant from the schedule. Records that already exist
    /// are left untouched.
    async fn initialize_records(&mut self) {
        let now = Utc::now();
        let mut state = self.shared_state.write().await;
        for job in self.registry.jobs() {
            let record = state.records.entry(job.id()).or_insert_with(|| {
                let next_due = job.schedule().next_due_after(now);
                JobExecutionRecord {
                    next_due_at: next_due,
                    ..Default::default()
                }
            });
            if record.next_due_at.is_none() {
                warn!(
                    "Job {} has no future occurrence and will only run on startup",
                    job.id()
                );
            }
        }
    }

    /// One-shot timers for jobs that want a run shortly after start.
    fn spawn_startup_timers(&self) {
        for job in self.registry.jobs() {
            let Some(delay) = job.schedule().startup_run() else {
                continue;
            };
            let job_id = job.id();
            let run_tx = self.run_tx.clone();
            let shutdown = self.shutdown_token.clone();
            info!("Job {} will run once {:?} after start", job_id, delay);
            tokio::spawn(async move {
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {
                        let _ = run_tx
                            .send(RunRequest { job_id, trigger: RunTrigger::Startup })
                            .await;
                    }
                    _ = shutdown.cancelled() => {}
                }
            });
        }
    }

    /// Enqueue a run attempt for every job whose due instant has passed.
    async fn enqueue_due_jobs(&self) {
        let now = Utc::now();
        let state = self.shared_state.read().await;
        for job in self.registry.jobs() {
            let Some(record) = state.records.get(job.id()) else {
                continue;
            };
            if record.is_running {
                // A still-running job absorbs the tick silently.
                continue;
            }
            if matches!(record.next_due_at, Some(due) if due <= now) {
                let request = RunRequest {
                    job_id: job.id(),
                    trigger: RunTrigger::Schedule,
                };
                if self.run_tx.try_send(request).is_err() {
                    warn!("Run queue full, job {} will be retried next poll", job.id());
                }
            }
        }
    }

    /// The per-job gate: runs the job unless an invocation is already
    /// active, in which case the attempt is dropped.
    async fn attempt_run(&mut self, request: RunRequest) {
        let Some(job) = self.registry.get(request.job_id) else {
            error!("Run request for unknown job: {}", request.job_id);
            return;
        };
        let job = Arc::clone(job);

        {
            let mut state = self.shared_state.write().await;
            let Some(record) = state.records.get_mut(request.job_id) else {
                return;
            };
            if record.is_running {
                debug!(
                    "Job {} is still running, skipping {} trigger",
                    request.job_id,
                    request.trigger.as_str()
                );
                return;
            }
            if request.trigger == RunTrigger::Schedule
                && !matches!(record.next_due_at, Some(due) if due <= Utc::now())
            {
                // A run that finished while this request sat in the
                // queue already satisfied the due instant.
                return;
            }
            record.is_running = true;
        }

        self.spawn_job(job, request.trigger);
    }

    /// Spawn the executor task for one run.
    fn spawn_job(&mut self, job: Arc<dyn BackgroundJob>, trigger: RunTrigger) {
        let job_id = job.id();
        let ctx = self.job_context.for_run();
        let shared_state = Arc::clone(&self.shared_state);

        info!("Starting job: {} (triggered_by: {})", job_id, trigger.as_str());

        let handle = tokio::spawn(async move {
            let start_time = Instant::now();

            // Run the handler in its own task so a panic is contained
            // and still clears the running flag.
            let exec_job = Arc::clone(&job);
            let exec_ctx = ctx.clone();
            let execution = tokio::spawn(async move {
                match exec_job.timeout() {
                    Some(limit) => {
                        match tokio::time::timeout(limit, exec_job.execute(&exec_ctx)).await {
                            Ok(result) => result,
                            Err(_) => Err(JobError::Timeout),
                        }
                    }
                    None => exec_job.execute(&exec_ctx).await,
                }
            });

            let result = execution.await;
            let elapsed = start_time.elapsed();

            let run_result = match result {
                Ok(Ok(summary)) => {
                    info!(
                        "Job {} completed successfully in {:?}: {}",
                        job_id, elapsed, summary
                    );
                    JobRunResult::Success { summary }
                }
                Ok(Err(e)) => {
                    match e {
                        JobError::Cancelled => {
                            info!("Job {} was cancelled after {:?}", job_id, elapsed)
                        }
                        _ => error!("Job {} failed after {:?}: {}", job_id, elapsed, e),
                    }
                    JobRunResult::Failure {
                        error: e.to_string(),
                    }
                }
                Err(e) => {
                    error!("Job {} panicked after {:?}: {}", job_id, elapsed, e);
                    JobRunResult::Failure {
                        error: format!("Task panic: {}", e),
                    }
                }
            };

            let finished_at = Utc::now();
            let next_due = job.schedule().next_due_after(finished_at);

            let mut state = shared_state.write().await;
            if let Some(record) = state.records.get_mut(job_id) {
                record.is_running = false;
                record.last_run_at = Some(finished_at);
                record.last_result = Some(run_result);
                record.next_due_at = next_due;
            }
        });

        self.running_handles.insert(job_id, handle);
    }

    /// Drop handles for runs that have finished.
    fn cleanup_completed_jobs(&mut self) {
        self.running_handles
            .retain(|_, handle| !handle.is_finished());
    }

    /// Gracefully shut down: job contexts carry child tokens of the
    /// shutdown token, so running jobs have already observed the
    /// cancellation; give each a bounded wait to finish.
    async fn shutdown(&mut self) {
        info!("Shutting down scheduler...");
        for (job_id, handle) in self.running_handles.drain() {
            if !handle.is_finished() {
                info!("Waiting for job {} to finish...", job_id);
            }
            if tokio::time::timeout(SHUTDOWN_WAIT, handle).await.is_err() {
                warn!("Job {} did not finish within {:?}", job_id, SHUTDOWN_WAIT);
            }
        }
        info!("Scheduler shutdown complete");
    }
}

/// Create a scheduler and a read-only handle for observing it.
pub fn create_scheduler(
    registry: Arc<JobRegistry>,
    poll_interval: Duration,
    shutdown_token: CancellationToken,
    job_context: JobContext,
) -> (JobScheduler, SchedulerHandle) {
    let (run_tx, run_rx) = mpsc::channel(64);
    let shared_state = Arc::new(RwLock::new(SharedJobState::default()));

    let handle = SchedulerHandle::new(Arc::clone(&registry), Arc::clone(&shared_state));
    let scheduler = JobScheduler {
        registry,
        shared_state,
        running_handles: HashMap::new(),
        run_tx,
        run_rx,
        poll_interval,
        shutdown_token,
        job_context,
    };

    (scheduler, handle)
}
