//! Abandoned checkout recovery background job.
//!
//! Runs hourly (and optionally once shortly after start) to detect
//! abandoned checkout sessions and dispatch recovery messages.

use crate::background_jobs::context::JobContext;
use crate::background_jobs::job::{BackgroundJob, JobError, JobSchedule};
use crate::background_jobs::schedule::ScheduleError;
use crate::config::CheckoutRecoverySettings;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::time::Duration;

pub struct CheckoutRecoveryJob {
    schedule: JobSchedule,
    lookback_hours: u64,
    abandonment_threshold_hours: u64,
}

impl CheckoutRecoveryJob {
    pub fn from_settings(settings: &CheckoutRecoverySettings) -> Result<Self, ScheduleError> {
        let mut schedule = JobSchedule::cron(&settings.cron)?;
        if settings.run_on_startup {
            schedule =
                schedule.with_startup_run(Duration::from_secs(settings.startup_delay_secs));
        }
        Ok(Self {
            schedule,
            lookback_hours: settings.lookback_hours,
            abandonment_threshold_hours: settings.abandonment_threshold_hours,
        })
    }
}

#[async_trait]
impl BackgroundJob for CheckoutRecoveryJob {
    fn id(&self) -> &'static str {
        "checkout_recovery"
    }

    fn name(&self) -> &'static str {
        "Checkout Recovery"
    }

    fn description(&self) -> &'static str {
        "Detect abandoned checkout sessions and dispatch recovery messages"
    }

    fn schedule(&self) -> &JobSchedule {
        &self.schedule
    }

    async fn execute(&self, ctx: &JobContext) -> Result<JsonValue, JobError> {
        if ctx.is_cancelled() {
            return Err(JobError::Cancelled);
        }

        let service = ctx.services.checkout_recovery().await;
        let summary = service
            .process_abandoned_sessions(self.lookback_hours, self.abandonment_threshold_hours)
            .await
            .map_err(|e| JobError::ExecutionFailed(e.to_string()))?;

        serde_json::to_value(summary).map_err(|e| JobError::ExecutionFailed(e.to_string()))
    }
}
