//! Resolves a layered [`DriverConfigInput`] (file, then CLI args) plus an
//! env var fallback for the connection URL into a fully-populated
//! [`DriverConfig`].

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, anyhow};

use super::defaults::{DEFAULT_FORMAT, DEFAULT_PROBE_TIMEOUT_MS, default_concurrency};
use super::merge::Merge;
use super::types::{DriverConfig, DriverConfigInput, parse_format};

pub struct ConfigBuilder {
    config_input: DriverConfigInput,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self { config_input: DriverConfigInput::default() }
    }

    pub fn with_file(mut self, file_input: DriverConfigInput) -> Self {
        self.config_input = self.config_input.merge(file_input);
        self
    }

    pub fn with_cli_args(mut self, cli_input: DriverConfigInput) -> Self {
        self.config_input = self.config_input.merge(cli_input);
        self
    }

    pub fn resolve(self) -> Result<DriverConfig> {
        let input = self.config_input;

        let postgres_url = input
            .postgres_url
            .or_else(|| std::env::var("QD_POSTGRES_URL").ok())
            .or_else(|| std::env::var("POSTGRES_URL").ok())
            .ok_or_else(|| anyhow!("postgres_url must be set via --postgres-url, a config file, or the POSTGRES_URL env var"))?;

        let format = match input.format {
            Some(raw) => parse_format(&raw).map_err(|e| anyhow!(e))?,
            None => DEFAULT_FORMAT,
        };

        Ok(DriverConfig {
            postgres_url,
            log_path: input.log_path.map(PathBuf::from),
            statistics_path: input.statistics_path.map(PathBuf::from),
            max_cost: input.max_cost,
            format,
            concurrency: input.concurrency.unwrap_or_else(default_concurrency),
            probe_timeout: Duration::from_millis(input.probe_timeout_ms.unwrap_or(DEFAULT_PROBE_TIMEOUT_MS)),
        })
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_fails_without_a_postgres_url() {
        unsafe {
            std::env::remove_var("QD_POSTGRES_URL");
            std::env::remove_var("POSTGRES_URL");
        }
        let err = ConfigBuilder::new().resolve().unwrap_err();
        assert!(err.to_string().contains("postgres_url"));
    }

    #[test]
    fn cli_args_override_file_values() {
        let file = DriverConfigInput { postgres_url: Some("postgres://file".into()), ..Default::default() };
        let cli = DriverConfigInput { postgres_url: Some("postgres://cli".into()), ..Default::default() };
        let config = ConfigBuilder::new().with_file(file).with_cli_args(cli).resolve().unwrap();
        assert_eq!(config.postgres_url, "postgres://cli");
    }

    #[test]
    fn unset_fields_fall_back_to_defaults() {
        let input = DriverConfigInput { postgres_url: Some("postgres://x".into()), ..Default::default() };
        let config = ConfigBuilder::new().with_cli_args(input).resolve().unwrap();
        assert_eq!(config.format, crate::report::ReportFormat::Text);
        assert_eq!(config.probe_timeout, Duration::from_millis(DEFAULT_PROBE_TIMEOUT_MS));
        assert!(config.concurrency >= 1);
    }
}
