//! `DriverConfig` and its raw, all-optional `DriverConfigInput` counterpart:
//! a layered raw struct merged from file, CLI args, and env fallbacks, then
//! resolved once into a fully-populated struct the rest of the driver
//! consumes.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::report::ReportFormat;

/// Raw configuration input — every field optional so file, CLI, and env
/// layers can be merged before resolution.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DriverConfigInput {
    pub postgres_url: Option<String>,
    pub log_path: Option<String>,
    pub statistics_path: Option<String>,
    pub max_cost: Option<f64>,
    pub format: Option<String>,
    pub concurrency: Option<usize>,
    pub probe_timeout_ms: Option<u64>,
}

/// Resolved configuration with every default applied.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    pub postgres_url: String,
    /// File to append structured logs to; `None` logs to stderr.
    pub log_path: Option<PathBuf>,
    /// Statistics export to load into the target database before
    /// evaluating, instead of trusting its live `pg_statistic` contents.
    pub statistics_path: Option<PathBuf>,
    /// Optional spend ceiling: a table group whose baseline cost already
    /// sits below this is skipped entirely (`BelowCostCeiling`).
    pub max_cost: Option<f64>,
    pub format: ReportFormat,
    pub concurrency: usize,
    pub probe_timeout: Duration,
}

/// CLI flag group for [`DriverConfig`], flattened into each subcommand's
/// own args struct.
#[derive(Debug, Clone, Default, Args)]
pub struct DriverArgs {
    #[arg(long, help = "PostgreSQL connection URL for the target database")]
    pub postgres_url: Option<String>,

    #[arg(long, help = "Path to append structured logs to, instead of stderr")]
    pub log_path: Option<String>,

    #[arg(long, help = "Path to a statistics export to load before evaluating")]
    pub statistics_path: Option<String>,

    #[arg(long, help = "Skip a table once its baseline cost is already below this")]
    pub max_cost: Option<f64>,

    #[arg(long, value_enum, help = "Report output format")]
    pub format: Option<CliReportFormat>,

    #[arg(long, help = "Maximum number of statements evaluated concurrently")]
    pub concurrency: Option<usize>,

    #[arg(long, help = "Per-probe timeout in milliseconds")]
    pub probe_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[clap(rename_all = "lower")]
pub enum CliReportFormat {
    Json,
    Markdown,
    Text,
}

impl From<CliReportFormat> for ReportFormat {
    fn from(value: CliReportFormat) -> Self {
        match value {
            CliReportFormat::Json => ReportFormat::Json,
            CliReportFormat::Markdown => ReportFormat::Markdown,
            CliReportFormat::Text => ReportFormat::Text,
        }
    }
}

impl From<DriverArgs> for DriverConfigInput {
    fn from(args: DriverArgs) -> Self {
        Self {
            postgres_url: args.postgres_url,
            log_path: args.log_path,
            statistics_path: args.statistics_path,
            max_cost: args.max_cost,
            format: args.format.map(|f| format!("{f:?}").to_lowercase()),
            concurrency: args.concurrency,
            probe_timeout_ms: args.probe_timeout_ms,
        }
    }
}

/// Parse a config/CLI format string (`json`, `markdown`, `text`) into a
/// [`ReportFormat`].
pub fn parse_format(s: &str) -> Result<ReportFormat, String> {
    match s.to_lowercase().as_str() {
        "json" => Ok(ReportFormat::Json),
        "markdown" | "md" => Ok(ReportFormat::Markdown),
        "text" => Ok(ReportFormat::Text),
        other => Err(format!("unknown report format `{other}` (expected json, markdown, or text)")),
    }
}
