//! Evaluator (spec §4.4): cost a query under a hypothetical index set inside
//! a transaction that is always rolled back.
//!
//! The probe timeout reuses the same retry-with-backoff shape as
//! `src/db/connection.rs`'s connection setup; cost/used-index extraction
//! goes through `model::plan::ExplainPlan`.

use std::time::Duration;

use serde_json::Value;
use sqlx::{PgPool, Postgres, Transaction};

use crate::errors::AdvisorError;
use crate::model::{ExplainPlan, TableMetadata, UsedIndexes, quote_ident};

/// Trailing comment appended to every SQL statement this system issues
/// against the target database (spec §6 "SQL comment marker"). Consumers
/// reading the target's query log must exclude statements carrying this
/// marker to avoid recursively analyzing the advisor's own probes.
pub const INTROSPECTION_MARKER: &str = "-- @qd_introspection";

/// Per-probe timeout applied to every `EXPLAIN`/`CREATE INDEX` the
/// Evaluator issues: a single flat duration rather than a retry count — a
/// probe that hangs is abandoned, not retried, since retrying a slow
/// planner call just compounds the wait.
#[derive(Debug, Clone, Copy)]
pub struct ProbeTimeout(pub Duration);

impl Default for ProbeTimeout {
    fn default() -> Self {
        Self(Duration::from_secs(5))
    }
}

/// What the Evaluator learned about one cost probe.
#[derive(Debug, Clone)]
pub enum EvaluationOutcome {
    Evaluated {
        plan: ExplainPlan,
        used_indexes: UsedIndexes,
    },
    /// Baseline plan had `Total Cost == 0`; the caller should skip this
    /// statement entirely rather than search for indexes that improve on
    /// nothing.
    ZeroCostPlan,
}

impl EvaluationOutcome {
    pub fn total_cost(&self) -> f64 {
        match self {
            EvaluationOutcome::Evaluated { plan, .. } => plan.total_cost(),
            EvaluationOutcome::ZeroCostPlan => 0.0,
        }
    }
}

/// A `CREATE INDEX` to issue inside the evaluation transaction before
/// `EXPLAIN` runs. Named with the reserved `__qd_` prefix so the resulting
/// plan's used-index extraction can tell it apart from real indexes.
#[derive(Debug, Clone)]
pub struct IndexMutation {
    pub name: String,
    pub schema: String,
    pub table: String,
    pub columns: Vec<String>,
}

impl IndexMutation {
    /// Build the mutation for a candidate, reusing its reserved
    /// `__qd_`-prefixed name (`PermutedIndexCandidate::hypothetical_name`).
    pub fn from_candidate(candidate: &crate::model::PermutedIndexCandidate) -> Self {
        Self {
            name: candidate.hypothetical_name(),
            schema: candidate.schema.clone(),
            table: candidate.table.clone(),
            columns: candidate.columns.clone(),
        }
    }

    fn create_statement(&self) -> String {
        let cols = self
            .columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "CREATE INDEX {} ON {}.{} ({}) {}",
            quote_ident(&self.name),
            quote_ident(&self.schema),
            quote_ident(&self.table),
            cols,
            INTROSPECTION_MARKER
        )
    }
}

pub struct Evaluator {
    pool: PgPool,
    timeout: ProbeTimeout,
}

impl Evaluator {
    pub fn new(pool: PgPool, timeout: ProbeTimeout) -> Self {
        Self { pool, timeout }
    }

    /// Run `query` under `tables`' row/page counts, optionally creating
    /// `mutations` first, inside a transaction that is always rolled back
    /// regardless of outcome.
    ///
    /// `params` is reserved for declared parameter type hints (spec
    /// §4.4); `GENERIC_PLAN` infers placeholder types from how they're used
    /// in the query and does not need bound values, so nothing here
    /// actually binds them today.
    pub async fn run_with_reltuples(
        &self,
        query: &str,
        _params: &[String],
        tables: &[TableMetadata],
        mutations: &[IndexMutation],
    ) -> Result<EvaluationOutcome, AdvisorError> {
        let candidate_label = mutations
            .iter()
            .map(|m| m.name.as_str())
            .collect::<Vec<_>>()
            .join(",");

        let fut = self.run_in_transaction(query, tables, mutations);
        let outcome = match tokio::time::timeout(self.timeout.0, fut).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(AdvisorError::Timeout {
                    candidate: if candidate_label.is_empty() {
                        "baseline".to_string()
                    } else {
                        candidate_label
                    },
                });
            }
        };

        Ok(outcome)
    }

    async fn run_in_transaction(
        &self,
        query: &str,
        tables: &[TableMetadata],
        mutations: &[IndexMutation],
    ) -> Result<EvaluationOutcome, AdvisorError> {
        let mut tx = self.pool.begin().await?;

        for mutation in mutations {
            sqlx::query(&mutation.create_statement()).execute(&mut *tx).await?;
        }

        for table in tables {
            sqlx::query(&format!(
                "UPDATE pg_class SET reltuples = $1, relpages = $2 \
                 WHERE relname = $3 AND relnamespace = (SELECT oid FROM pg_namespace WHERE nspname = $4) {INTROSPECTION_MARKER}"
            ))
            .bind(table.reltuples)
            .bind(table.relpages)
            .bind(&table.table)
            .bind(&table.schema)
            .execute(&mut *tx)
            .await?;
        }

        let explain_sql = format!("EXPLAIN (GENERIC_PLAN, VERBOSE, FORMAT JSON) {query} {INTROSPECTION_MARKER}");
        let row: (Value,) = sqlx::query_as(&explain_sql).fetch_one(&mut *tx).await?;

        // Rollback unconditionally: nothing this transaction did (mutation
        // DDL, reltuples override) should survive past this probe.
        tx.rollback().await?;

        let plan = ExplainPlan::from_explain_output(&row.0).ok_or_else(|| {
            AdvisorError::EvaluationFailed {
                candidate: "baseline".to_string(),
                source: sqlx::Error::Decode("EXPLAIN output missing a root Plan node".into()),
            }
        })?;

        if plan.total_cost() == 0.0 {
            return Ok(EvaluationOutcome::ZeroCostPlan);
        }

        let used_indexes = plan.used_indexes();
        Ok(EvaluationOutcome::Evaluated { plan, used_indexes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_statement_quotes_identifiers() {
        let m = IndexMutation {
            name: "__qd_public_orders_user_id".into(),
            schema: "public".into(),
            table: "orders".into(),
            columns: vec!["user_id".into(), "created_at".into()],
        };
        assert_eq!(
            m.create_statement(),
            "CREATE INDEX \"__qd_public_orders_user_id\" ON \"public\".\"orders\" (\"user_id\", \"created_at\") -- @qd_introspection"
        );
    }

    #[test]
    fn zero_cost_outcome_reports_zero() {
        assert_eq!(EvaluationOutcome::ZeroCostPlan.total_cost(), 0.0);
    }
}
