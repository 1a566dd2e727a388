//! Minimal parser for PostgreSQL's `csvlog` format (the same input
//! pgBadger itself consumes), extracting the statement text out of
//! `message` fields shaped `duration: N ms  statement: ...` or a bare
//! `statement: ...`.
//!
//! Hand-rolled rather than pulled in from a crate: the column layout is
//! fixed and small, and only one field out of twenty-three is needed.

use super::{CorpusSource, StatementCorpusEntry};

/// 0-based index of the `message` column in PostgreSQL's `csvlog` format.
const MESSAGE_COLUMN: usize = 13;

pub fn parse(contents: &str) -> Vec<StatementCorpusEntry> {
    contents
        .lines()
        .enumerate()
        .filter_map(|(i, line)| {
            if line.trim().is_empty() {
                return None;
            }
            let fields = split_csv_row(line);
            let message = fields.get(MESSAGE_COLUMN)?;
            let statement = extract_statement(message)?;
            Some(StatementCorpusEntry {
                statement,
                source: CorpusSource::PgBadgerCsv { line: i + 1 },
            })
        })
        .collect()
}

/// Extract the SQL text following a `statement:` marker, which may itself
/// follow a `duration: N ms` prefix.
fn extract_statement(message: &str) -> Option<String> {
    let marker = "statement: ";
    let idx = message.find(marker)?;
    let statement = message[idx + marker.len()..].trim();
    if statement.is_empty() {
        None
    } else {
        Some(statement.to_string())
    }
}

/// Quote-aware split on commas, unescaping doubled quotes — enough to
/// parse PostgreSQL's own `csvlog` output, which always double-quotes
/// fields containing commas, quotes, or newlines.
fn split_csv_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}
