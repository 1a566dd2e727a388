//! Hard-coded fallbacks applied when no file, CLI flag, or env var
//! supplies a value.

use crate::report::ReportFormat;

pub const DEFAULT_FORMAT: ReportFormat = ReportFormat::Text;
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 5_000;

/// Default task-pool size for the corpus loop: the host's available
/// parallelism, falling back to 1 if it cannot be determined.
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}
