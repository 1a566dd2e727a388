//! Colorized terminal table renderer, built on `console::style`.

use console::style;

use crate::optimizer::OptimizerOutcome;

use super::{AdvisorReport, truncate};

pub fn render(report: &AdvisorReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}\n",
        style(format!(
            "{} statement(s) analyzed in {:.2}s ({} skipped, {} failed)",
            report.statements.len(),
            report.elapsed.as_secs_f64(),
            report.skipped,
            report.failed
        ))
        .bold()
    ));
    out.push_str(&format!("{}\n", style(format!("cardinality basis: {}", report.stats_basis.label())).dim()));

    for entry in &report.statements {
        match &entry.outcome {
            Err(e) => {
                out.push_str(&format!("  {} {}\n", style("\u{2717}").red(), e));
            }
            Ok(OptimizerOutcome::ZeroCostPlan) => {
                out.push_str(&format!(
                    "  {} already free: {}\n",
                    style("-").dim(),
                    truncate(&entry.statement, 80)
                ));
            }
            Ok(OptimizerOutcome::Completed(r)) if r.new_indexes.is_empty() => {
                out.push_str(&format!(
                    "  {} no improvement ({:.2}): {}\n",
                    style("-").dim(),
                    r.base_cost,
                    truncate(&entry.statement, 80)
                ));
            }
            Ok(OptimizerOutcome::Completed(r)) => {
                out.push_str(&format!(
                    "  {} {:.2} -> {:.2}: {}\n",
                    style("\u{2713}").green(),
                    r.base_cost,
                    r.final_cost,
                    truncate(&entry.statement, 80)
                ));
                for rec in &r.new_indexes {
                    out.push_str(&format!("      {} CREATE INDEX ON {}\n", style("+").green(), rec.definition()));
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::CorpusSource;
    use crate::optimizer::OptimizerReport;
    use crate::stats::StatisticsBasis;
    use std::time::Duration;

    #[test]
    fn marks_zero_cost_statements_with_a_dash() {
        let report = AdvisorReport {
            elapsed: Duration::from_secs(1),
            skipped: 0,
            failed: 0,
            stats_basis: StatisticsBasis::FromAssumption,
            statements: vec![StatementReport {
                statement: "select 1".into(),
                source: CorpusSource::Raw,
                outcome: Ok(OptimizerOutcome::ZeroCostPlan),
            }],
        };
        let rendered = console::strip_ansi_codes(&render(&report)).to_string();
        assert!(rendered.contains("already free"));
    }

    #[test]
    fn marks_improved_statements_with_a_checkmark() {
        let candidate = crate::model::PermutedIndexCandidate::new("public", "orders", vec!["user_id".into()]);
        let report = AdvisorReport {
            elapsed: Duration::from_secs(1),
            skipped: 0,
            failed: 0,
            stats_basis: StatisticsBasis::FromStatisticsExport,
            statements: vec![StatementReport {
                statement: "select 1 from orders where user_id = 1".into(),
                source: CorpusSource::Raw,
                outcome: Ok(OptimizerOutcome::Completed(OptimizerReport {
                    base_cost: 100.0,
                    final_cost: 5.0,
                    new_indexes: vec![crate::model::IndexRecommendation::new(candidate)],
                    existing_indexes_used: Vec::new(),
                    tried: Vec::new(),
                    skipped_groups: Vec::new(),
                    explain_plan: crate::model::ExplainPlan::from_explain_output(&serde_json::json!([
                        { "Plan": { "Node Type": "Index Scan", "Total Cost": 5.0 } }
                    ]))
                    .unwrap(),
                })),
            }],
        };
        let rendered = console::strip_ansi_codes(&render(&report)).to_string();
        assert!(rendered.contains("100.00 -> 5.00"));
        assert!(rendered.contains("CREATE INDEX ON orders(\"user_id\")"));
        assert!(rendered.contains("cardinality basis: statistics export"));
    }
}
