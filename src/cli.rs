//! `Cli`/`Commands` definitions: global flags plus a `#[derive(Subcommand)]`
//! per top-level verb.

use clap::{Parser, Subcommand};

use crate::config::{CliReportFormat, DriverArgs};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[arg(long, default_value = "qd-advisor.yaml", global = true)]
    pub config_file: String,

    /// Enable verbose output (info level)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Suppress all non-essential output (error level only)
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable debug output (debug level)
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pipeline over a statement corpus and print a report
    Analyze(AnalyzeArgs),

    /// Drive the StatisticsStore standalone
    Stats {
        #[command(subcommand)]
        command: StatsCommands,
    },

    /// Run the Evaluator for one ad-hoc SQL string and print the raw plan
    Explain(ExplainArgs),
}

#[derive(Parser)]
pub struct AnalyzeArgs {
    /// Path to the statement corpus file
    #[arg(long)]
    pub corpus: Option<String>,

    /// Corpus file format
    #[arg(long, value_enum, default_value = "raw")]
    pub corpus_format: CliCorpusFormat,

    /// Read the corpus from stdin, one statement per line, instead of a file
    #[arg(long)]
    pub stdin: bool,

    #[command(flatten)]
    pub driver_args: DriverArgs,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CliCorpusFormat {
    Raw,
    PgbadgerCsv,
}

impl From<CliCorpusFormat> for crate::corpus::CorpusFormat {
    fn from(value: CliCorpusFormat) -> Self {
        match value {
            CliCorpusFormat::Raw => crate::corpus::CorpusFormat::Raw,
            CliCorpusFormat::PgbadgerCsv => crate::corpus::CorpusFormat::PgBadgerCsv,
        }
    }
}

#[derive(Subcommand)]
pub enum StatsCommands {
    /// Dump table/column statistics from the target database to a file
    Dump {
        /// Destination path for the statistics export
        #[arg(long)]
        output: String,

        /// Include stavaluesN sample data (off by default)
        #[arg(long)]
        full: bool,

        #[command(flatten)]
        driver_args: DriverArgs,
    },

    /// Restore a statistics export onto the target database
    Restore {
        /// Path to a statistics export produced by `stats dump`
        #[arg(long)]
        input: String,

        #[command(flatten)]
        driver_args: DriverArgs,
    },
}

#[derive(Parser)]
pub struct ExplainArgs {
    /// The SQL statement to evaluate
    #[arg(long)]
    pub query: String,

    /// Columns to build a single hypothetical index from, e.g.
    /// "public.orders.user_id,created_at"
    #[arg(long)]
    pub candidate: Option<String>,

    #[arg(long, value_enum, default_value = "text")]
    pub format: CliReportFormat,

    #[command(flatten)]
    pub driver_args: DriverArgs,
}
