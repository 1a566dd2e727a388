//! Core data model shared across the Analyzer, StatisticsStore, Evaluator,
//! and Optimizer.

pub mod candidate;
pub mod ident;
pub mod plan;
pub mod reference;
pub mod stats;
pub mod table;

pub use candidate::{
    DEFAULT_SCHEMA, ExistingIndex, ExistingIndexColumn, IndexAccessMethod, IndexRecommendation,
    PermutedIndexCandidate, RootIndexCandidate, SortDirection,
};
pub use ident::{Ident, quote_ident};
pub use plan::{ExplainPlan, HYPOTHETICAL_INDEX_PREFIX, UsedIndexes};
pub use reference::{ColumnReference, ReferencePart, TableReference};
pub use stats::{ColumnStats, StatSlot, StatSlotKind};
pub use table::{ColumnMetadata, TableMetadata};
