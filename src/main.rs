use anyhow::Result;
use clap::Parser;
use mediva_trigger_server::audit::MemoryAuditLog;
use mediva_trigger_server::background_jobs::jobs::{CheckoutRecoveryJob, TicketAutoCloseJob};
use mediva_trigger_server::background_jobs::{
    create_scheduler, JobContext, JobRegistry, ServiceResolver,
};
use mediva_trigger_server::checkout::MemoryCheckoutStore;
use mediva_trigger_server::config::{AppConfig, CliConfig, FileConfig};
use mediva_trigger_server::messaging::LoggingRecoveryMessenger;
use mediva_trigger_server::tickets::MemoryTicketStore;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to an optional TOML config file.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Seconds between scheduler polls.
    #[clap(long, default_value_t = 5)]
    pub poll_interval_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let cli_config = CliConfig {
        poll_interval_secs: cli_args.poll_interval_secs,
    };
    let app_config = AppConfig::resolve(&cli_config, file_config)?;

    // Standalone wiring uses the in-memory collaborators; a platform
    // deployment substitutes its own implementations of the traits.
    let services = Arc::new(ServiceResolver::new(
        Arc::new(MemoryCheckoutStore::new()),
        Arc::new(MemoryTicketStore::new()),
        Arc::new(LoggingRecoveryMessenger),
        Arc::new(MemoryAuditLog::new()),
    ));

    // Registration failures (invalid cron, duplicate id) are fatal: the
    // process refuses to start rather than run a broken job table.
    let mut registry = JobRegistry::new();
    registry.register(Arc::new(CheckoutRecoveryJob::from_settings(
        &app_config.background_jobs.checkout_recovery,
    )?))?;
    registry.register(Arc::new(TicketAutoCloseJob::from_settings(
        &app_config.background_jobs.ticket_autoclose,
    )?))?;
    let registry = Arc::new(registry);

    let shutdown_token = CancellationToken::new();
    let job_context = JobContext::new(shutdown_token.child_token(), services);
    let (mut scheduler, _scheduler_handle) = create_scheduler(
        registry,
        app_config.poll_interval(),
        shutdown_token.clone(),
        job_context,
    );

    tokio::select! {
        _ = scheduler.run() => {
            info!("Scheduler stopped");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, initiating graceful shutdown");
            shutdown_token.cancel();
            // Give the scheduler a moment to shut down gracefully
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    Ok(())
}
