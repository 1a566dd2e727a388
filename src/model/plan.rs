//! `ExplainPlan` — the parsed JSON plan tree returned by
//! `EXPLAIN (GENERIC_PLAN, FORMAT JSON)`.

use serde_json::Value;

/// Reserved prefix for every index this system creates. Any index name
/// beginning with this prefix is "ours" when classifying a plan's used
/// indexes.
pub const HYPOTHETICAL_INDEX_PREFIX: &str = "__qd_";

#[derive(Debug, Clone)]
pub struct ExplainPlan {
    root: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsedIndexes {
    pub new: Vec<String>,
    pub existing: Vec<String>,
}

impl ExplainPlan {
    /// `raw` is the top-level array PostgreSQL returns for
    /// `EXPLAIN (FORMAT JSON)`: `[{"Plan": {...}, ...}]`.
    pub fn from_explain_output(raw: &Value) -> Option<Self> {
        let entry = raw.as_array()?.first()?;
        let plan = entry.get("Plan")?.clone();
        Some(Self { root: plan })
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// `Total Cost` at the root plan node.
    pub fn total_cost(&self) -> f64 {
        self.root
            .get("Total Cost")
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
    }

    /// Walk the plan tree recursively, collecting every `Index Name`,
    /// classified by whether it carries the hypothetical-index prefix.
    pub fn used_indexes(&self) -> UsedIndexes {
        let mut new = Vec::new();
        let mut existing = Vec::new();
        collect_index_names(&self.root, &mut new, &mut existing);
        new.sort();
        new.dedup();
        existing.sort();
        existing.dedup();
        UsedIndexes { new, existing }
    }
}

fn collect_index_names(node: &Value, new: &mut Vec<String>, existing: &mut Vec<String>) {
    if let Some(name) = node.get("Index Name").and_then(Value::as_str) {
        if name.starts_with(HYPOTHETICAL_INDEX_PREFIX) {
            new.push(name.to_string());
        } else {
            existing.push(name.to_string());
        }
    }
    if let Some(plans) = node.get("Plans").and_then(Value::as_array) {
        for child in plans {
            collect_index_names(child, new, existing);
        }
    }
}
