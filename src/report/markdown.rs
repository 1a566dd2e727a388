//! Markdown report renderer, formatted for CI review-comment bodies.

use crate::optimizer::OptimizerOutcome;

use super::{AdvisorReport, truncate};

pub fn render(report: &AdvisorReport) -> String {
    let mut out = String::new();
    out.push_str("# Index advisor report\n\n");
    out.push_str(&format!(
        "{} statement(s) analyzed in {:.2}s, {} skipped, {} failed.\n\n",
        report.statements.len(),
        report.elapsed.as_secs_f64(),
        report.skipped,
        report.failed
    ));
    out.push_str(&format!("Cardinality basis: {}.\n\n", report.stats_basis.label()));

    for entry in &report.statements {
        out.push_str(&format!("## `{}`\n\n", truncate(&entry.statement, 120)));
        match &entry.outcome {
            Err(e) => {
                out.push_str(&format!("- **Status:** failed — {e}\n\n"));
            }
            Ok(OptimizerOutcome::ZeroCostPlan) => {
                out.push_str("- **Status:** baseline plan already costs nothing; skipped.\n\n");
            }
            Ok(OptimizerOutcome::Completed(r)) => {
                if r.new_indexes.is_empty() {
                    out.push_str(&format!("- **Status:** no improving index found (cost {:.2}).\n\n", r.base_cost));
                } else {
                    out.push_str(&format!(
                        "- **Status:** improved from {:.2} to {:.2}\n",
                        r.base_cost, r.final_cost
                    ));
                    out.push_str("- **Recommended indexes:**\n");
                    for rec in &r.new_indexes {
                        out.push_str(&format!("  - `CREATE INDEX ON {}`\n", rec.definition()));
                    }
                    out.push('\n');
                }
            }
        }
    }

    out
}
