//! Parses a single SQL statement and extracts the column references a
//! hypothetical index could serve.
//!
//! Three passes: [`walk`] turns the `pg_query` AST into raw,
//! offset-less references plus the statement's relations and CTE names;
//! [`offsets`] reconstructs each dotted part's byte offset; this module
//! resolves qualifiers against table aliases (P6), folds identifier case
//! only where unquoted (P7), and tags CTE-qualified references `ignored`.

mod alias;
mod offsets;
mod walk;

use std::collections::HashMap;

use crate::model::{ColumnReference, Ident, ReferencePart, TableReference};

use alias::AliasMap;

#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    #[error("failed to parse statement: {0}")]
    Parse(String),
    #[error("statement contains no top-level SQL body")]
    Empty,
}

/// One column reference plus the table it was resolved against, when that
/// could be determined without catalog access.
#[derive(Debug, Clone)]
pub struct ResolvedReference {
    pub reference: ColumnReference,
    pub table: Option<TableReference>,
}

#[derive(Debug, Clone)]
pub struct ParsedStatement {
    pub referenced_tables: Vec<TableReference>,
    pub references: Vec<ResolvedReference>,
    /// The source text with each non-ignored reference's byte range
    /// wrapped in `‹…›`, for reports and debugging.
    pub highlighted_text: String,
}

impl ParsedStatement {
    /// References that could serve as the leading column of a hypothetical
    /// index: not ignored, and resolved to a concrete table.
    pub fn candidates(&self) -> impl Iterator<Item = (&TableReference, &ColumnReference)> {
        self.references.iter().filter_map(|r| {
            if r.reference.ignored {
                None
            } else {
                r.table.as_ref().map(|t| (t, &r.reference))
            }
        })
    }
}

/// Parse and analyze a single SQL statement. If `source` contains more than
/// one statement, only the first is analyzed — the corpus loader (spec
/// §[AMBIENT] `src/corpus`) is responsible for statement splitting.
pub fn analyze(source: &str) -> Result<ParsedStatement, AnalyzerError> {
    let parsed = pg_query::parse(source).map_err(|e| AnalyzerError::Parse(e.to_string()))?;
    let raw_stmt = parsed.protobuf.stmts.first().ok_or(AnalyzerError::Empty)?;
    let node = raw_stmt
        .stmt
        .as_ref()
        .and_then(|s| s.node.as_ref())
        .ok_or(AnalyzerError::Empty)?;

    let walked = walk::walk_top_level(node);

    let mut alias_map = AliasMap::new();
    let mut referenced_tables = Vec::new();
    for table in &walked.tables {
        alias_map.insert_relation(&table.schema, &table.table, table.alias.as_deref());
        let reference = TableReference::new(&table.schema, &table.table);
        if !referenced_tables.contains(&reference) {
            referenced_tables.push(reference);
        }
    }
    let sole_table = if referenced_tables.len() == 1 { referenced_tables.first().cloned() } else { None };

    let mut resolved: Vec<ResolvedReference> = walked
        .references
        .into_iter()
        .map(|raw| {
            let parts = offsets::compute_reference_parts(source, raw.location, &raw.fields);
            let start = parts.first().map(|p| p.offset).unwrap_or(raw.location);
            let end = parts
                .last()
                .map(|p| p.offset + rendered_len(p))
                .unwrap_or(start);

            let qualifier_folded = if parts.len() >= 2 {
                Some(parts[parts.len() - 2].ident.folded())
            } else {
                None
            };

            let cte_qualified = qualifier_folded
                .as_ref()
                .map(|q| walked.cte_names.iter().any(|c| Ident::unquoted(c).folded() == *q))
                .unwrap_or(false);

            let table = match &qualifier_folded {
                Some(q) => alias_map.resolve(q).cloned(),
                None => sole_table.clone(),
            };

            let reference = ColumnReference {
                parts,
                start,
                end,
                frequency: 1,
                ignored: raw.ignored || cte_qualified,
            };

            ResolvedReference { reference, table }
        })
        .collect();

    annotate_frequencies(&mut resolved);

    let highlighted_text = highlight(source, &resolved);

    Ok(ParsedStatement { referenced_tables, references: resolved, highlighted_text })
}

fn rendered_len(part: &ReferencePart) -> usize {
    if part.ident.quoted { part.ident.text.len() + 2 } else { part.ident.text.len() }
}

fn annotate_frequencies(resolved: &mut [ResolvedReference]) {
    let mut counts: HashMap<String, u32> = HashMap::new();
    for r in resolved.iter() {
        *counts.entry(r.reference.rendered()).or_insert(0) += 1;
    }
    for r in resolved.iter_mut() {
        if let Some(count) = counts.get(&r.reference.rendered()) {
            r.reference.frequency = *count;
        }
    }
}

fn highlight(source: &str, resolved: &[ResolvedReference]) -> String {
    let mut spans: Vec<(usize, usize)> = resolved
        .iter()
        .filter(|r| !r.reference.ignored)
        .map(|r| (r.reference.start, r.reference.end))
        .collect();
    spans.sort_by_key(|s| s.0);
    spans.dedup();
    let mut result = String::with_capacity(source.len() + spans.len() * 2);
    let mut cursor = 0;
    for (start, end) in spans {
        if start < cursor || end > source.len() || start > end {
            continue;
        }
        result.push_str(&source[cursor..start]);
        result.push('\u{2039}');
        result.push_str(&source[start..end]);
        result.push('\u{203a}');
        cursor = end;
    }
    result.push_str(&source[cursor..]);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_unqualified_reference_against_sole_table() {
        let parsed = analyze("select 1 from employees where manager_id = 5").unwrap();
        let (table, reference) = parsed.candidates().next().unwrap();
        assert_eq!(table, &TableReference::new("public", "employees"));
        assert_eq!(reference.rendered(), "manager_id");
    }

    #[test]
    fn resolves_alias_qualified_reference() {
        let parsed = analyze("select 1 from employees e where e.manager_id = 5").unwrap();
        let (table, _) = parsed.candidates().next().unwrap();
        assert_eq!(table, &TableReference::new("public", "employees"));
    }

    #[test]
    fn cte_qualified_reference_is_excluded_from_candidates() {
        let parsed = analyze(
            "with recent as (select id, manager_id from employees) select * from recent where recent.manager_id = 1",
        )
        .unwrap();
        assert!(parsed.candidates().all(|(_, r)| r.rendered() != "recent.manager_id"));
    }

    #[test]
    fn projection_and_function_arg_references_are_not_candidates() {
        let parsed = analyze("select lower(name) from employees where manager_id = 1").unwrap();
        let rendered: Vec<_> = parsed.candidates().map(|(_, r)| r.rendered()).collect();
        assert!(!rendered.contains(&"name".to_string()));
        assert!(rendered.contains(&"manager_id".to_string()));
    }

    #[test]
    fn repeated_reference_has_frequency_greater_than_one() {
        let parsed = analyze("select 1 from employees where manager_id = 1 or manager_id = 2").unwrap();
        let reference = parsed.references.iter().find(|r| r.reference.rendered() == "manager_id").unwrap();
        assert_eq!(reference.reference.frequency, 2);
    }

    #[test]
    fn highlighted_text_wraps_candidate_spans_only() {
        let parsed = analyze("select lower(name) from employees where manager_id = 1").unwrap();
        assert!(parsed.highlighted_text.contains("\u{2039}manager_id\u{203a}"));
        assert!(!parsed.highlighted_text.contains("\u{2039}name\u{203a}"));
    }

    #[test]
    fn malformed_sql_yields_parse_error() {
        let err = analyze("select from where").unwrap_err();
        assert!(matches!(err, AnalyzerError::Parse(_)));
    }
}
