//! Candidate and recommendation types that flow between the Optimizer,
//! Permuter, and Evaluator.

use std::fmt;

/// The default namespace whose name is suppressed in rendered index
/// definitions (`schema.table(...)` vs. just `table(...)`).
pub const DEFAULT_SCHEMA: &str = "public";

/// `(schema, table, column)` — a single-column seed for the Optimizer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RootIndexCandidate {
    pub schema: String,
    pub table: String,
    pub column: String,
}

/// `(schema, table, columns[])` — an ordered, non-empty, duplicate-free
/// prefix of a permutation of a candidate group's column set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermutedIndexCandidate {
    pub schema: String,
    pub table: String,
    pub columns: Vec<String>,
}

impl PermutedIndexCandidate {
    /// Constructs a candidate, panicking on the two invariants the data
    /// model guarantees callers never violate: non-empty, no duplicates.
    pub fn new(schema: impl Into<String>, table: impl Into<String>, columns: Vec<String>) -> Self {
        assert!(!columns.is_empty(), "PermutedIndexCandidate columns must be non-empty");
        let mut seen = std::collections::HashSet::new();
        assert!(
            columns.iter().all(|c| seen.insert(c.clone())),
            "PermutedIndexCandidate columns must not contain duplicates"
        );
        Self {
            schema: schema.into(),
            table: table.into(),
            columns,
        }
    }

    /// The reserved hypothetical-index name: `__qd_{schema}_{table}_{cols}`.
    pub fn hypothetical_name(&self) -> String {
        format!(
            "__qd_{}_{}_{}",
            self.schema,
            self.table,
            self.columns.join("_")
        )
    }

    /// Does `other`'s column sequence (in its own order) equal this
    /// candidate's, on the same table? Used for existing-index suppression
    /// (P5) and for duplicate detection between carry-forward candidates.
    pub fn same_column_sequence(&self, other_columns: &[String]) -> bool {
        self.columns.as_slice() == other_columns
    }
}

impl fmt::Display for PermutedIndexCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}({})", self.schema, self.table, self.columns.join(", "))
    }
}

/// A permuted candidate plus its canonical textual definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRecommendation {
    pub candidate: PermutedIndexCandidate,
}

impl IndexRecommendation {
    pub fn new(candidate: PermutedIndexCandidate) -> Self {
        Self { candidate }
    }

    /// `schema.table("c1","c2",…)`, schema suppressed when it equals
    /// [`DEFAULT_SCHEMA`].
    pub fn definition(&self) -> String {
        let quoted_cols = self
            .candidate
            .columns
            .iter()
            .map(|c| format!("\"{}\"", c.replace('"', "\"\"")))
            .collect::<Vec<_>>()
            .join(", ");
        if self.candidate.schema == DEFAULT_SCHEMA {
            format!("{}({})", self.candidate.table, quoted_cols)
        } else {
            format!("{}.{}({})", self.candidate.schema, self.candidate.table, quoted_cols)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexAccessMethod {
    Btree,
    Gin,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingIndexColumn {
    pub name: String,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// An index collected once at startup from `pg_catalog`, used to suppress
/// redundant candidates (P5).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingIndex {
    pub schema: String,
    pub table: String,
    pub index_name: String,
    pub access_method: IndexAccessMethod,
    pub columns: Vec<ExistingIndexColumn>,
}

impl ExistingIndex {
    /// A candidate is suppressed if a `btree` index on the same table has
    /// exactly the same column sequence in the same order (P5). Partial and
    /// functional indexes are out of scope (spec §9 open question (b)).
    pub fn suppresses(&self, candidate: &PermutedIndexCandidate) -> bool {
        self.access_method == IndexAccessMethod::Btree
            && self.schema == candidate.schema
            && self.table == candidate.table
            && self.columns.len() == candidate.columns.len()
            && self
                .columns
                .iter()
                .zip(candidate.columns.iter())
                .all(|(existing, wanted)| &existing.name == wanted)
    }
}
