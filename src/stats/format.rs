//! `ExportedStatsV1` — the versioned, file-backed statistics document
//! (spec §4.3 [AMBIENT]). JSON, tagged on `version` so a future `V2` can be
//! added without breaking old dumps, with an `Unknown` catch-all so a
//! too-new file fails clearly instead of silently truncating data.

use serde::{Deserialize, Serialize};

use crate::model::TableMetadata;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportMode {
    /// `stavaluesN` sample data included.
    Full,
    /// `stavaluesN` suppressed on every slot.
    Anonymous,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedStatsV1 {
    pub mode: ExportMode,
    pub tables: Vec<TableMetadata>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "version")]
pub enum ExportedStats {
    #[serde(rename = "1")]
    V1(ExportedStatsV1),
    #[serde(other)]
    Unknown,
}

impl ExportedStats {
    pub fn into_v1(self) -> Option<ExportedStatsV1> {
        match self {
            ExportedStats::V1(v1) => Some(v1),
            ExportedStats::Unknown => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ColumnMetadata, TableMetadata};

    fn sample() -> ExportedStatsV1 {
        ExportedStatsV1 {
            mode: ExportMode::Anonymous,
            tables: vec![TableMetadata {
                schema: "public".into(),
                table: "employees".into(),
                reltuples: 1000.0,
                relpages: 10,
                relallvisible: 10,
                columns: vec![ColumnMetadata {
                    name: "manager_id".into(),
                    data_type: "integer".into(),
                    nullable: true,
                    stats: None,
                }],
            }],
        }
    }

    #[test]
    fn round_trips_through_json() {
        let doc = ExportedStats::V1(sample());
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("\"version\":\"1\""));
        let back: ExportedStats = serde_json::from_str(&json).unwrap();
        let v1 = back.into_v1().unwrap();
        assert_eq!(v1.tables[0].table, "employees");
    }

    #[test]
    fn unknown_future_version_does_not_fail_to_parse() {
        let json = r#"{"version":"7","whatever":true}"#;
        let doc: ExportedStats = serde_json::from_str(json).unwrap();
        assert!(doc.into_v1().is_none());
    }
}
