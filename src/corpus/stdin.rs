//! One statement per non-empty line, read from stdin.

use std::io::BufRead;

use super::{CorpusSource, StatementCorpusEntry};

pub fn parse<R: BufRead>(reader: R) -> std::io::Result<Vec<StatementCorpusEntry>> {
    let mut entries = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("--") {
            continue;
        }
        entries.push(StatementCorpusEntry {
            statement: trimmed.trim_end_matches(';').to_string(),
            source: CorpusSource::Stdin,
        });
    }
    Ok(entries)
}
