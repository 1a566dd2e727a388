//! Flat-file corpus: statements separated by `;` at the top level, blank
//! lines and segments that are nothing but `--` comments discarded.

use super::{CorpusSource, StatementCorpusEntry};

pub fn parse(contents: &str) -> Vec<StatementCorpusEntry> {
    contents
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty() && !is_comment_only(s))
        .map(|s| StatementCorpusEntry {
            statement: s.to_string(),
            source: CorpusSource::Raw,
        })
        .collect()
}

fn is_comment_only(statement: &str) -> bool {
    statement.lines().all(|line| {
        let trimmed = line.trim();
        trimmed.is_empty() || trimmed.starts_with("--")
    })
}
