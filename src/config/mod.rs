mod file_config;

pub use file_config::{
    BackgroundJobsConfig, CheckoutRecoveryConfig, FileConfig, TicketAutoCloseConfig,
};

use anyhow::{bail, Result};
use std::time::Duration;

/// CLI arguments that participate in config resolution.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub poll_interval_secs: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 5,
        }
    }
}

/// Fully resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub poll_interval_secs: u64,
    pub background_jobs: BackgroundJobsSettings,
}

#[derive(Debug, Clone, Default)]
pub struct BackgroundJobsSettings {
    pub checkout_recovery: CheckoutRecoverySettings,
    pub ticket_autoclose: TicketAutoCloseSettings,
}

#[derive(Debug, Clone)]
pub struct CheckoutRecoverySettings {
    /// 5-field cron expression, evaluated in UTC.
    pub cron: String,
    /// How far back to scan for checkout-started events.
    pub lookback_hours: u64,
    /// Grace window before an idle session counts as abandoned.
    pub abandonment_threshold_hours: u64,
    pub run_on_startup: bool,
    pub startup_delay_secs: u64,
}

impl Default for CheckoutRecoverySettings {
    fn default() -> Self {
        Self {
            cron: "0 * * * *".to_string(),
            lookback_hours: 24,
            abandonment_threshold_hours: 1,
            run_on_startup: true,
            startup_delay_secs: 30,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TicketAutoCloseSettings {
    /// 5-field cron expression, evaluated in UTC.
    pub cron: String,
    pub run_on_startup: bool,
    pub startup_delay_secs: u64,
}

impl Default for TicketAutoCloseSettings {
    fn default() -> Self {
        Self {
            cron: "0 2 * * *".to_string(),
            run_on_startup: false,
            startup_delay_secs: 60,
        }
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file
    /// config. TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let poll_interval_secs = file.poll_interval_secs.unwrap_or(cli.poll_interval_secs);
        if poll_interval_secs == 0 {
            bail!("poll_interval_secs must be positive");
        }

        let jobs = file.background_jobs.unwrap_or_default();

        let mut checkout_recovery = CheckoutRecoverySettings::default();
        if let Some(overrides) = jobs.checkout_recovery {
            if let Some(cron) = overrides.cron {
                checkout_recovery.cron = cron;
            }
            if let Some(hours) = overrides.lookback_hours {
                checkout_recovery.lookback_hours = hours;
            }
            if let Some(hours) = overrides.abandonment_threshold_hours {
                checkout_recovery.abandonment_threshold_hours = hours;
            }
            if let Some(enabled) = overrides.run_on_startup {
                checkout_recovery.run_on_startup = enabled;
            }
            if let Some(secs) = overrides.startup_delay_secs {
                checkout_recovery.startup_delay_secs = secs;
            }
        }

        let mut ticket_autoclose = TicketAutoCloseSettings::default();
        if let Some(overrides) = jobs.ticket_autoclose {
            if let Some(cron) = overrides.cron {
                ticket_autoclose.cron = cron;
            }
            if let Some(enabled) = overrides.run_on_startup {
                ticket_autoclose.run_on_startup = enabled;
            }
            if let Some(secs) = overrides.startup_delay_secs {
                ticket_autoclose.startup_delay_secs = secs;
            }
        }

        Ok(Self {
            poll_interval_secs,
            background_jobs: BackgroundJobsSettings {
                checkout_recovery,
                ticket_autoclose,
            },
        })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_cli_only() {
        let cli = CliConfig {
            poll_interval_secs: 3,
        };
        let config = AppConfig::resolve(&cli, None).unwrap();

        assert_eq!(config.poll_interval_secs, 3);
        assert_eq!(config.poll_interval(), Duration::from_secs(3));
        assert_eq!(config.background_jobs.checkout_recovery.cron, "0 * * * *");
        assert_eq!(config.background_jobs.checkout_recovery.lookback_hours, 24);
        assert_eq!(config.background_jobs.ticket_autoclose.cron, "0 2 * * *");
    }

    #[test]
    fn test_file_overrides_cli() {
        let file: FileConfig = toml::from_str(
            r#"
            poll_interval_secs = 9

            [background_jobs.checkout_recovery]
            cron = "15 * * * *"
            abandonment_threshold_hours = 2
            "#,
        )
        .unwrap();

        let config = AppConfig::resolve(&CliConfig::default(), Some(file)).unwrap();

        assert_eq!(config.poll_interval_secs, 9);
        assert_eq!(config.background_jobs.checkout_recovery.cron, "15 * * * *");
        assert_eq!(
            config
                .background_jobs
                .checkout_recovery
                .abandonment_threshold_hours,
            2
        );
        // Untouched fields keep their defaults.
        assert_eq!(config.background_jobs.checkout_recovery.lookback_hours, 24);
        assert!(config.background_jobs.checkout_recovery.run_on_startup);
    }

    #[test]
    fn test_zero_poll_interval_is_rejected() {
        let cli = CliConfig {
            poll_interval_secs: 0,
        };
        assert!(AppConfig::resolve(&cli, None).is_err());
    }
}
