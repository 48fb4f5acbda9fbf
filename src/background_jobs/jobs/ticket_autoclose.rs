//! Ticket auto-close background job.
//!
//! Runs daily to close resolved support tickets with no recent patient
//! activity.

use crate::background_jobs::context::JobContext;
use crate::background_jobs::job::{BackgroundJob, JobError, JobSchedule};
use crate::background_jobs::schedule::ScheduleError;
use crate::config::TicketAutoCloseSettings;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::time::Duration;

pub struct TicketAutoCloseJob {
    schedule: JobSchedule,
}

impl TicketAutoCloseJob {
    pub fn from_settings(settings: &TicketAutoCloseSettings) -> Result<Self, ScheduleError> {
        let mut schedule = JobSchedule::cron(&settings.cron)?;
        if settings.run_on_startup {
            schedule =
                schedule.with_startup_run(Duration::from_secs(settings.startup_delay_secs));
        }
        Ok(Self { schedule })
    }
}

#[async_trait]
impl BackgroundJob for TicketAutoCloseJob {
    fn id(&self) -> &'static str {
        "ticket_autoclose"
    }

    fn name(&self) -> &'static str {
        "Ticket Auto-Close"
    }

    fn description(&self) -> &'static str {
        "Close resolved support tickets with no recent patient activity"
    }

    fn schedule(&self) -> &JobSchedule {
        &self.schedule
    }

    async fn execute(&self, ctx: &JobContext) -> Result<JsonValue, JobError> {
        if ctx.is_cancelled() {
            return Err(JobError::Cancelled);
        }

        let service = ctx.services.ticket_autoclose().await;
        let summary = service
            .check_and_close_resolved_tickets()
            .await
            .map_err(|e| JobError::ExecutionFailed(e.to_string()))?;

        serde_json::to_value(summary).map_err(|e| JobError::ExecutionFailed(e.to_string()))
    }
}
