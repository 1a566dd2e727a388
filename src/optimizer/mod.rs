//! Optimizer (spec §4.5): drives the Permuter over each statement's
//! candidate tables, consulting the Evaluator at every step, and resolves
//! to a final set of recommended and existing indexes. The per-table search
//! loop follows a group-then-fold shape; candidate grouping uses
//! `itertools` the same way the rest of the crate does.

mod grouping;

use crate::analyzer::ParsedStatement;
use crate::errors::AdvisorError;
use crate::evaluator::{EvaluationOutcome, Evaluator, IndexMutation};
use crate::model::{
    ExistingIndex, ExplainPlan, IndexRecommendation, PermutedIndexCandidate, RootIndexCandidate,
    TableMetadata,
};
use crate::permuter::{Feedback, Permuter};

use grouping::group_by_table;

/// Outcome of one candidate probe, kept for the report's audit trail (spec
/// §5 "tried indexes").
#[derive(Debug, Clone)]
pub enum TryOutcome {
    /// Strictly lowered the running cost; carried forward to the final
    /// combined evaluation.
    Accepted { cost: f64 },
    /// Left the running cost unchanged.
    NoGain { cost: f64 },
    /// Raised the running cost above the previous best; the running
    /// baseline resets to the table's base cost (spec §9 open question (a)).
    Regressed { cost: f64 },
    /// An existing `btree` index already covers this exact column sequence
    /// (P5); the probe was never issued.
    SuppressedByExistingIndex,
    /// The probe itself failed (e.g. a type without a default btree
    /// opclass); extensions of this candidate are not explored, since they
    /// would carry the same failing prefix.
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct TriedCandidate {
    pub candidate: PermutedIndexCandidate,
    pub outcome: TryOutcome,
}

/// A table group skipped outright because its base cost already sits below
/// the configured ceiling ([AMBIENT] spec §4.5 "optional cost ceiling").
#[derive(Debug, Clone)]
pub struct SkippedGroup {
    pub schema: String,
    pub table: String,
}

#[derive(Debug, Clone)]
pub struct OptimizerReport {
    pub base_cost: f64,
    pub final_cost: f64,
    pub new_indexes: Vec<IndexRecommendation>,
    pub existing_indexes_used: Vec<String>,
    pub tried: Vec<TriedCandidate>,
    pub skipped_groups: Vec<SkippedGroup>,
    pub explain_plan: ExplainPlan,
}

#[derive(Debug, Clone)]
pub enum OptimizerOutcome {
    /// The baseline plan already costs zero; nothing to search for.
    ZeroCostPlan,
    Completed(OptimizerReport),
}

pub struct Optimizer<'a> {
    evaluator: &'a Evaluator,
    existing_indexes: &'a [ExistingIndex],
    max_cost: Option<f64>,
}

impl<'a> Optimizer<'a> {
    pub fn new(evaluator: &'a Evaluator, existing_indexes: &'a [ExistingIndex], max_cost: Option<f64>) -> Self {
        Self { evaluator, existing_indexes, max_cost }
    }

    /// Search for an index set that lowers `query`'s cost, starting from the
    /// candidate column references the Analyzer resolved (spec §4.5
    /// algorithm, steps 1-6).
    pub async fn optimize(
        &self,
        query: &str,
        params: &[String],
        parsed: &ParsedStatement,
        tables: &[TableMetadata],
    ) -> Result<OptimizerOutcome, AdvisorError> {
        let base_outcome = self.evaluator.run_with_reltuples(query, params, tables, &[]).await?;
        let (base_plan, base_used) = match base_outcome {
            EvaluationOutcome::ZeroCostPlan => return Ok(OptimizerOutcome::ZeroCostPlan),
            EvaluationOutcome::Evaluated { plan, used_indexes } => (plan, used_indexes),
        };
        let base_cost = base_plan.total_cost();

        let candidates = build_root_candidates(parsed);
        let groups = group_by_table(&candidates);

        let mut tried = Vec::new();
        let mut skipped_groups = Vec::new();
        let mut carry_forward: Vec<PermutedIndexCandidate> = Vec::new();

        for group in &groups {
            if let Some(ceiling) = self.max_cost {
                if base_cost < ceiling {
                    skipped_groups.push(SkippedGroup { schema: group.schema.clone(), table: group.table.clone() });
                    continue;
                }
            }

            self.search_table(query, params, tables, &group.schema, &group.table, group.columns.clone(), base_cost, &mut tried, &mut carry_forward)
                .await?;
        }

        if carry_forward.is_empty() {
            return Ok(OptimizerOutcome::Completed(OptimizerReport {
                base_cost,
                final_cost: base_cost,
                new_indexes: Vec::new(),
                existing_indexes_used: base_used.existing,
                tried,
                skipped_groups,
                explain_plan: base_plan,
            }));
        }

        let mutations: Vec<IndexMutation> = carry_forward.iter().map(IndexMutation::from_candidate).collect();
        let final_outcome = self.evaluator.run_with_reltuples(query, params, tables, &mutations).await?;

        let (final_plan, final_cost, new_indexes, existing_indexes_used) = match final_outcome {
            EvaluationOutcome::ZeroCostPlan => (base_plan.clone(), 0.0, Vec::new(), base_used.existing.clone()),
            EvaluationOutcome::Evaluated { plan, used_indexes } => {
                let new_indexes = carry_forward
                    .iter()
                    .filter(|c| used_indexes.new.contains(&c.hypothetical_name()))
                    .cloned()
                    .map(IndexRecommendation::new)
                    .collect();
                let cost = plan.total_cost();
                (plan, cost, new_indexes, used_indexes.existing)
            }
        };

        Ok(OptimizerOutcome::Completed(OptimizerReport {
            base_cost,
            final_cost,
            new_indexes,
            existing_indexes_used,
            tried,
            skipped_groups,
            explain_plan: final_plan,
        }))
    }

    /// Drive one table group's Permuter to exhaustion, applying the
    /// improve/tie/regression tie-break policy at each emitted tuple.
    #[allow(clippy::too_many_arguments)]
    async fn search_table(
        &self,
        query: &str,
        params: &[String],
        tables: &[TableMetadata],
        schema: &str,
        table: &str,
        columns: Vec<String>,
        base_cost: f64,
        tried: &mut Vec<TriedCandidate>,
        carry_forward: &mut Vec<PermutedIndexCandidate>,
    ) -> Result<(), AdvisorError> {
        let mut permuter = Permuter::new(columns)?;
        let mut previous_cost = base_cost;
        let mut feedback = Feedback::Proceed;

        while let Some(tuple) = permuter.next(feedback) {
            let candidate = PermutedIndexCandidate::new(schema, table, tuple);

            if self.existing_indexes.iter().any(|e| e.suppresses(&candidate)) {
                tried.push(TriedCandidate { candidate, outcome: TryOutcome::SuppressedByExistingIndex });
                feedback = Feedback::Proceed;
                continue;
            }

            let mutation = IndexMutation::from_candidate(&candidate);
            let probe = self.evaluator.run_with_reltuples(query, params, tables, &[mutation]).await;

            feedback = match probe {
                Ok(EvaluationOutcome::ZeroCostPlan) => {
                    tried.push(TriedCandidate { candidate, outcome: TryOutcome::NoGain { cost: 0.0 } });
                    Feedback::Proceed
                }
                Ok(EvaluationOutcome::Evaluated { plan, .. }) => {
                    let cost = plan.total_cost();
                    if cost < previous_cost {
                        previous_cost = cost;
                        carry_forward.push(candidate.clone());
                        tried.push(TriedCandidate { candidate, outcome: TryOutcome::Accepted { cost } });
                        Feedback::Proceed
                    } else if cost == previous_cost {
                        tried.push(TriedCandidate { candidate, outcome: TryOutcome::NoGain { cost } });
                        Feedback::Proceed
                    } else {
                        previous_cost = base_cost;
                        tried.push(TriedCandidate { candidate, outcome: TryOutcome::Regressed { cost } });
                        Feedback::Proceed
                    }
                }
                Err(e) => {
                    tried.push(TriedCandidate { candidate, outcome: TryOutcome::Failed(e.to_string()) });
                    Feedback::Skip
                }
            };
        }

        Ok(())
    }
}

/// Turn the Analyzer's resolved column references into the deduplicated
/// `(schema, table, column)` seeds the Permuter starts from.
fn build_root_candidates(parsed: &ParsedStatement) -> Vec<RootIndexCandidate> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for (table, reference) in parsed.candidates() {
        let Some(part) = reference.parts.last() else { continue };
        let column = part.ident.folded();
        let key = (table.schema.clone(), table.table.clone(), column.clone());
        if seen.insert(key) {
            out.push(RootIndexCandidate { schema: table.schema.clone(), table: table.table.clone(), column });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze;

    #[test]
    fn builds_root_candidates_from_resolved_references() {
        let parsed = analyze("select 1 from employees where manager_id = 1").unwrap();
        let candidates = build_root_candidates(&parsed);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].table, "employees");
        assert_eq!(candidates[0].column, "manager_id");
    }

    #[test]
    fn deduplicates_repeated_references_to_the_same_column() {
        let parsed = analyze("select 1 from employees where manager_id = 1 or manager_id = 2").unwrap();
        let candidates = build_root_candidates(&parsed);
        assert_eq!(candidates.len(), 1);
    }
}
