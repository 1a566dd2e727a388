//! Assumed cardinality used when no statistics export is supplied (spec
//! §4.3 "Fallback").

/// `reltuples` assumed for every table when running without an export.
pub const DEFAULT_ASSUMED_RELTUPLES: f32 = 10_000_000.0;
/// `relpages` assumed for every table when running without an export.
pub const DEFAULT_ASSUMED_RELPAGES: i32 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallbackAssumption {
    pub reltuples: f32,
    pub relpages: i32,
}

impl Default for FallbackAssumption {
    fn default() -> Self {
        Self { reltuples: DEFAULT_ASSUMED_RELTUPLES, relpages: DEFAULT_ASSUMED_RELPAGES }
    }
}

/// Which of the two modes produced the row/page counts an evaluation run.
/// Surfaced in reports so users understand the recommendation basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatisticsBasis {
    FromStatisticsExport,
    FromAssumption,
}

impl StatisticsBasis {
    /// Short label used by the text and Markdown renderers.
    pub fn label(self) -> &'static str {
        match self {
            StatisticsBasis::FromStatisticsExport => "statistics export",
            StatisticsBasis::FromAssumption => "fallback assumption",
        }
    }

    /// Machine-readable tag used by the JSON renderer.
    pub fn code(self) -> &'static str {
        match self {
            StatisticsBasis::FromStatisticsExport => "statistics_export",
            StatisticsBasis::FromAssumption => "fallback_assumption",
        }
    }
}
