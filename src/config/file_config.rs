use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Optional TOML configuration. Every field overrides the corresponding
/// CLI/default value when present.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub poll_interval_secs: Option<u64>,

    pub background_jobs: Option<BackgroundJobsConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct BackgroundJobsConfig {
    pub checkout_recovery: Option<CheckoutRecoveryConfig>,
    pub ticket_autoclose: Option<TicketAutoCloseConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct CheckoutRecoveryConfig {
    pub cron: Option<String>,
    pub lookback_hours: Option<u64>,
    pub abandonment_threshold_hours: Option<u64>,
    pub run_on_startup: Option<bool>,
    pub startup_delay_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct TicketAutoCloseConfig {
    pub cron: Option<String>,
    pub run_on_startup: Option<bool>,
    pub startup_delay_secs: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
