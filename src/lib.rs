//! Mediva Trigger Server Library
//!
//! Background job scheduling and trigger engines for the Mediva
//! platform: a cron-driven scheduler with per-job mutual exclusion, an
//! abandoned-checkout recovery engine and a ticket auto-close engine.
//! The platform's data access, messaging and audit facilities are
//! consumed through collaborator traits.

pub mod audit;
pub mod background_jobs;
pub mod checkout;
pub mod config;
pub mod messaging;
pub mod tickets;

// Re-export commonly used types for convenience
pub use background_jobs::{
    create_scheduler, BackgroundJob, JobContext, JobRegistry, JobScheduler, SchedulerHandle,
    ServiceResolver,
};
pub use config::AppConfig;
