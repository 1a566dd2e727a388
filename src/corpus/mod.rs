//! Statement corpus ingestion: a flat file of semicolon-separated
//! statements, a pgBadger-style CSV log, or stdin.

pub mod pgbadger_csv;
pub mod raw;
pub mod stdin;

use std::path::Path;

use crate::errors::AdvisorError;

/// Where a corpus entry came from, kept alongside the statement text so
/// reports can point back at the originating log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorpusSource {
    Raw,
    PgBadgerCsv { line: usize },
    Stdin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementCorpusEntry {
    pub statement: String,
    pub source: CorpusSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorpusFormat {
    Raw,
    PgBadgerCsv,
}

/// Load and parse a corpus file according to `format`.
pub fn load_from_path(path: &Path, format: CorpusFormat) -> Result<Vec<StatementCorpusEntry>, AdvisorError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| AdvisorError::Corpus(format!("failed to read corpus file {}: {}", path.display(), e)))?;
    match format {
        CorpusFormat::Raw => Ok(raw::parse(&contents)),
        CorpusFormat::PgBadgerCsv => Ok(pgbadger_csv::parse(&contents)),
    }
}
