//! Alias-to-relation resolution (spec §4.2 step 4, invariant P6).

use std::collections::HashMap;

use crate::model::{Ident, TableReference};

/// Maps a folded alias or relation name to the relation it names.
///
/// Both the alias (`FROM employees e` -> `e`) and the bare relation name
/// itself (`employees`) are registered, so `e.name` and `employees.name`
/// both resolve when no alias shadows the bare name.
#[derive(Debug, Default)]
pub struct AliasMap {
    entries: HashMap<String, TableReference>,
}

impl AliasMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_relation(&mut self, schema: &str, table: &str, alias: Option<&str>) {
        let reference = TableReference::new(schema, table);
        self.entries
            .entry(Ident::unquoted(table).folded())
            .or_insert_with(|| reference.clone());
        if let Some(alias) = alias {
            self.entries.insert(Ident::unquoted(alias).folded(), reference);
        }
    }

    /// Resolve a qualifier's folded text to a known relation. When nothing
    /// matches, the caller falls back to using the raw qualifier text as a
    /// table name directly (tie-break policy, spec §9 open question (a)).
    pub fn resolve(&self, qualifier_folded: &str) -> Option<&TableReference> {
        self.entries.get(qualifier_folded)
    }
}
