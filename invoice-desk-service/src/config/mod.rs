//! Configuration module for invoice-desk-service.

use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone)]
pub struct InvoiceDeskConfig {
    pub common: core_config::Config,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub store: StoreConfig,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Seed the store with the demo relationship managers on startup.
    pub seed_demo_rms: bool,
    /// Default length of the overdue invoice report.
    pub overdue_report_limit: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            seed_demo_rms: true,
            overdue_report_limit: 10,
        }
    }
}

impl InvoiceDeskConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        let defaults = StoreConfig::default();

        Ok(Self {
            common,
            service_name: env::var("SERVICE_NAME")
                .unwrap_or_else(|_| "invoice-desk-service".to_string()),
            service_version: env::var("SERVICE_VERSION")
                .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
            store: StoreConfig {
                seed_demo_rms: parse_env("SEED_DEMO_RMS")?.unwrap_or(defaults.seed_demo_rms),
                overdue_report_limit: parse_env("OVERDUE_REPORT_LIMIT")?
                    .unwrap_or(defaults.overdue_report_limit),
            },
        })
    }
}

fn parse_env<T>(key: &str) -> Result<Option<T>, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map(Some).map_err(|e: T::Err| {
            AppError::ConfigError(anyhow::anyhow!("Invalid value for {}: {}", key, e))
        }),
        Err(_) => Ok(None),
    }
}
