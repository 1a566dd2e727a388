//! Core error type for the advisor pipeline (§7).
//!
//! Library code returns `Result<T, AdvisorError>`; the driver (`src/cli.rs`,
//! `src/main.rs`) converts at its boundary via `anyhow`'s blanket `From`,
//! keeping a closed, matchable enum in the core while the CLI layer stays
//! on `anyhow::Result<()>`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("failed to parse statement: {0}")]
    ParseFailure(String),

    #[error("AST node for `{reference}` has no source location; skipping that reference")]
    MissingLocation { reference: String },

    #[error("baseline plan has zero cost; nothing to optimize")]
    ZeroCostPlan,

    #[error("evaluation of candidate `{candidate}` failed: {source}")]
    EvaluationFailed {
        candidate: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("probe for `{candidate}` exceeded its timeout budget")]
    Timeout { candidate: String },

    #[error("statistics mismatch for {table}: {detail}")]
    StatsMismatch { table: String, detail: String },

    #[error("database connection failure: {0}")]
    DriverFailure(#[from] sqlx::Error),

    #[error("statement analysis failed: {0}")]
    Analyzer(#[from] crate::analyzer::AnalyzerError),

    #[error("{0}")]
    Permuter(#[from] crate::permuter::PermuterError),

    #[error("statistics document error: {0}")]
    Stats(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("corpus ingestion error: {0}")]
    Corpus(String),
}

pub type AdvisorResult<T> = Result<T, AdvisorError>;
