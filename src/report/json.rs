//! JSON report renderer for CI pipelines and other machine consumers.

use serde::Serialize;

use crate::optimizer::OptimizerOutcome;

use super::{AdvisorReport, StatementReport};

#[derive(Debug, Serialize)]
struct ReportJson {
    elapsed_ms: u128,
    skipped: usize,
    failed: usize,
    stats_basis: &'static str,
    statements: Vec<StatementJson>,
}

#[derive(Debug, Serialize)]
struct StatementJson {
    statement: String,
    status: &'static str,
    base_cost: Option<f64>,
    final_cost: Option<f64>,
    new_indexes: Vec<String>,
    existing_indexes_used: Vec<String>,
    tried_count: usize,
    error: Option<String>,
}

pub fn render(report: &AdvisorReport) -> String {
    let json = ReportJson {
        elapsed_ms: report.elapsed.as_millis(),
        skipped: report.skipped,
        failed: report.failed,
        stats_basis: report.stats_basis.code(),
        statements: report.statements.iter().map(to_statement_json).collect(),
    };
    serde_json::to_string_pretty(&json)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to render report: {e}\"}}"))
}

fn to_statement_json(s: &StatementReport) -> StatementJson {
    match &s.outcome {
        Err(e) => StatementJson {
            statement: s.statement.clone(),
            status: "failed",
            base_cost: None,
            final_cost: None,
            new_indexes: Vec::new(),
            existing_indexes_used: Vec::new(),
            tried_count: 0,
            error: Some(e.clone()),
        },
        Ok(OptimizerOutcome::ZeroCostPlan) => StatementJson {
            statement: s.statement.clone(),
            status: "zero_cost_plan",
            base_cost: Some(0.0),
            final_cost: Some(0.0),
            new_indexes: Vec::new(),
            existing_indexes_used: Vec::new(),
            tried_count: 0,
            error: None,
        },
        Ok(OptimizerOutcome::Completed(r)) => StatementJson {
            statement: s.statement.clone(),
            status: if r.new_indexes.is_empty() { "no_improvement" } else { "improved" },
            base_cost: Some(r.base_cost),
            final_cost: Some(r.final_cost),
            new_indexes: r.new_indexes.iter().map(|rec| rec.definition()).collect(),
            existing_indexes_used: r.existing_indexes_used.clone(),
            tried_count: r.tried.len(),
            error: None,
        },
    }
}
