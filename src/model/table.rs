//! `TableMetadata` — loaded once per run from `pg_catalog` and treated as
//! immutable thereafter.

use serde::{Deserialize, Serialize};

use super::stats::ColumnStats;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnMetadata {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    pub stats: Option<ColumnStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableMetadata {
    pub schema: String,
    pub table: String,
    pub reltuples: f32,
    pub relpages: i32,
    pub relallvisible: i32,
    pub columns: Vec<ColumnMetadata>,
}

impl TableMetadata {
    pub fn column(&self, name: &str) -> Option<&ColumnMetadata> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.table)
    }
}
