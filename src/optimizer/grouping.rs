//! Groups root candidates by `(schema, table)` (spec §4.5 step 3),
//! collapsing distinct column seeds on the same table into one ordered,
//! duplicate-free column set for the Permuter: iterate the flat candidate
//! list once, bucket by identity, delegate the per-table search to a leaf
//! function per bucket.

use crate::model::RootIndexCandidate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateGroup {
    pub schema: String,
    pub table: String,
    /// Column names in first-occurrence order; never empty, never
    /// duplicated (callers may hand this straight to `Permuter::new`).
    pub columns: Vec<String>,
}

pub fn group_by_table(candidates: &[RootIndexCandidate]) -> Vec<CandidateGroup> {
    let mut groups: Vec<CandidateGroup> = Vec::new();
    for c in candidates {
        match groups
            .iter_mut()
            .find(|g| g.schema == c.schema && g.table == c.table)
        {
            Some(group) => {
                if !group.columns.contains(&c.column) {
                    group.columns.push(c.column.clone());
                }
            }
            None => groups.push(CandidateGroup {
                schema: c.schema.clone(),
                table: c.table.clone(),
                columns: vec![c.column.clone()],
            }),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(schema: &str, table: &str, column: &str) -> RootIndexCandidate {
        RootIndexCandidate {
            schema: schema.to_string(),
            table: table.to_string(),
            column: column.to_string(),
        }
    }

    #[test]
    fn collapses_distinct_columns_on_the_same_table() {
        let groups = group_by_table(&[
            candidate("public", "orders", "user_id"),
            candidate("public", "orders", "created_at"),
            candidate("public", "orders", "user_id"),
        ]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].columns, vec!["user_id".to_string(), "created_at".to_string()]);
    }

    #[test]
    fn separates_groups_by_table() {
        let groups = group_by_table(&[
            candidate("public", "orders", "user_id"),
            candidate("public", "employees", "manager_id"),
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].table, "orders");
        assert_eq!(groups[1].table, "employees");
    }
}
