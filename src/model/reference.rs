//! `ColumnReference` / `TableReference` — the Analyzer's output types.

use super::ident::Ident;

/// One dotted part of a column reference as it appeared in the source,
/// e.g. the `e`, `"managerId"` in `e."managerId"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferencePart {
    pub ident: Ident,
    /// Byte offset of the first character of this part (the quote, if
    /// quoted; the first letter otherwise).
    pub offset: usize,
}

/// A single occurrence of a column in a parsed statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnReference {
    /// One entry per dotted segment, in source order: `schema.table.column`
    /// would have three parts. Most references have one or two.
    pub parts: Vec<ReferencePart>,
    /// Byte range `[start, end)` in the source statement.
    pub start: usize,
    pub end: usize,
    /// How many times the same rendered text recurs in the statement.
    pub frequency: u32,
    /// Set when this reference occurs where a plain index cannot serve it:
    /// a projection target, a function-call argument, or a reference whose
    /// leading identifier names a transient CTE.
    pub ignored: bool,
}

impl ColumnReference {
    /// The rendered dotted text, e.g. `e."managerId"`.
    pub fn rendered(&self) -> String {
        self.parts
            .iter()
            .map(|p| p.ident.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }

    /// The column name: the last dotted part.
    pub fn column_ident(&self) -> Option<&Ident> {
        self.parts.last().map(|p| &p.ident)
    }

    /// The qualifier (alias or table name) preceding the column, if any.
    pub fn qualifier_ident(&self) -> Option<&Ident> {
        if self.parts.len() >= 2 {
            self.parts.get(self.parts.len() - 2).map(|p| &p.ident)
        } else {
            None
        }
    }
}

/// A resolved `(schema, table)` pair, derived from a `RangeVar` node and any
/// alias introduced for it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TableReference {
    pub schema: String,
    pub table: String,
}

impl TableReference {
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
        }
    }
}

impl std::fmt::Display for TableReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}
