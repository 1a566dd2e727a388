//! `ColumnStats` — a direct mirror of PostgreSQL's `pg_statistic` slot layout.
//!
//! The five-slot, five-kind model is kept un-normalized on purpose (see
//! DESIGN.md / spec §9): it simplifies dump/restore round-trips because the
//! slot numbering matches the catalog column suffixes (`stakind1`..`stakind5`).

use serde::{Deserialize, Serialize};

/// Statistic classes carried by a slot's `kind` code. Kinds above
/// `DistinctElemCountHistogram` exist in PostgreSQL but are treated
/// opaquely: preserved in the `kind` field, never interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatSlotKind {
    MostCommonValues,
    ScalarHistogram,
    Correlation,
    MostCommonElements,
    DistinctElemCountHistogram,
    Other(i16),
}

impl StatSlotKind {
    pub fn from_code(code: i16) -> Self {
        match code {
            1 => StatSlotKind::MostCommonValues,
            2 => StatSlotKind::ScalarHistogram,
            3 => StatSlotKind::Correlation,
            4 => StatSlotKind::MostCommonElements,
            5 => StatSlotKind::DistinctElemCountHistogram,
            other => StatSlotKind::Other(other),
        }
    }

    pub fn code(self) -> i16 {
        match self {
            StatSlotKind::MostCommonValues => 1,
            StatSlotKind::ScalarHistogram => 2,
            StatSlotKind::Correlation => 3,
            StatSlotKind::MostCommonElements => 4,
            StatSlotKind::DistinctElemCountHistogram => 5,
            StatSlotKind::Other(code) => code,
        }
    }

    /// Whitelist of slot kinds this system knows are safe to preserve
    /// verbatim across environments. Unsupported kinds are restored as zero
    /// rather than copied, to avoid misleading the planner with stale data.
    pub fn is_supported(self) -> bool {
        matches!(
            self,
            StatSlotKind::MostCommonValues
                | StatSlotKind::ScalarHistogram
                | StatSlotKind::Correlation
                | StatSlotKind::MostCommonElements
                | StatSlotKind::DistinctElemCountHistogram
        )
    }
}

/// One of the five positional containers in a column's `pg_statistic` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatSlot {
    pub kind: StatSlotKind,
    /// `staopN`: the operator OID used to derive this slot, opaque here.
    pub op: Option<u32>,
    /// `stacollN`: the collation OID, opaque here.
    pub coll: Option<u32>,
    pub numbers: Vec<f32>,
    /// Omitted (`None`) in "anonymous" dump mode to suppress sensitive
    /// sample data; present in "full" mode.
    pub values: Option<Vec<String>>,
}

/// Per-column statistics: `stainherit`/`stanullfrac`/`stawidth`/`stadistinct`
/// plus the five slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub stainherit: bool,
    pub stanullfrac: f32,
    pub stawidth: i32,
    pub stadistinct: f32,
    pub slots: [StatSlot; 5],
}

impl ColumnStats {
    pub fn empty() -> Self {
        let empty_slot = || StatSlot {
            kind: StatSlotKind::Other(0),
            op: None,
            coll: None,
            numbers: Vec::new(),
            values: None,
        };
        Self {
            stainherit: false,
            stanullfrac: 0.0,
            stawidth: -1,
            stadistinct: 0.0,
            slots: [
                empty_slot(),
                empty_slot(),
                empty_slot(),
                empty_slot(),
                empty_slot(),
            ],
        }
    }
}
