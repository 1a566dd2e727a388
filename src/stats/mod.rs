//! StatisticsStore (spec §4.3): dump table/column statistics from a source
//! database and restore them onto a target so its planner reasons about
//! production-scale cardinality without touching production data.
//!
//! Queries here use `sqlx::query`/`query_as` (runtime-checked) rather than
//! the `sqlx::query!` macro: the macro verifies column types against a live
//! database (or a committed `.sqlx` offline cache) at compile time, and the
//! `pg_statistic` catalog queries here have neither. See DESIGN.md.

pub mod fallback;
pub mod format;

use std::collections::HashSet;

use sqlx::{PgPool, Postgres, Row, Transaction};

use crate::errors::AdvisorError;
use crate::model::{ColumnMetadata, ColumnStats, StatSlot, StatSlotKind, TableMetadata};

pub use fallback::{FallbackAssumption, StatisticsBasis};
pub use format::{ExportMode, ExportedStats, ExportedStatsV1};

/// Dump every user table outside the system catalogs, with full per-column
/// `pg_statistic` slots. `mode` controls whether `stavaluesN` sample data is
/// included (`Full`) or suppressed (`Anonymous`).
pub async fn dump(pool: &PgPool, mode: ExportMode) -> Result<ExportedStatsV1, AdvisorError> {
    let table_rows = sqlx::query(
        r#"
        SELECT n.nspname AS schema, c.relname AS relname, c.reltuples::float4 AS reltuples,
               c.relpages AS relpages, c.relallvisible AS relallvisible
        FROM pg_class c
        JOIN pg_namespace n ON n.oid = c.relnamespace
        WHERE c.relkind = 'r'
          AND n.nspname NOT IN ('pg_catalog', 'information_schema', 'pg_toast')
        ORDER BY n.nspname, c.relname
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut tables = Vec::with_capacity(table_rows.len());
    for row in table_rows {
        let schema: String = row.try_get("schema")?;
        let table: String = row.try_get("relname")?;
        let reltuples: f32 = row.try_get("reltuples")?;
        let relpages: i32 = row.try_get("relpages")?;
        let relallvisible: i32 = row.try_get("relallvisible")?;
        let columns = dump_columns(pool, &schema, &table, mode).await?;
        tables.push(TableMetadata { schema, table, reltuples, relpages, relallvisible, columns });
    }

    Ok(ExportedStatsV1 { mode, tables })
}

async fn dump_columns(
    pool: &PgPool,
    schema: &str,
    table: &str,
    mode: ExportMode,
) -> Result<Vec<ColumnMetadata>, AdvisorError> {
    let rows = sqlx::query(
        r#"
        SELECT
          a.attname AS name,
          pg_catalog.format_type(a.atttypid, a.atttypmod) AS data_type,
          a.attnotnull AS not_null,
          s.stainherit AS stainherit, s.stanullfrac AS stanullfrac,
          s.stawidth AS stawidth, s.stadistinct AS stadistinct,
          s.stakind1 AS stakind1, s.stakind2 AS stakind2, s.stakind3 AS stakind3,
          s.stakind4 AS stakind4, s.stakind5 AS stakind5,
          s.staop1::int8 AS staop1, s.staop2::int8 AS staop2, s.staop3::int8 AS staop3,
          s.staop4::int8 AS staop4, s.staop5::int8 AS staop5,
          s.stacoll1::int8 AS stacoll1, s.stacoll2::int8 AS stacoll2, s.stacoll3::int8 AS stacoll3,
          s.stacoll4::int8 AS stacoll4, s.stacoll5::int8 AS stacoll5,
          s.stanumbers1 AS stanumbers1, s.stanumbers2 AS stanumbers2, s.stanumbers3 AS stanumbers3,
          s.stanumbers4 AS stanumbers4, s.stanumbers5 AS stanumbers5,
          s.stavalues1::text[] AS stavalues1, s.stavalues2::text[] AS stavalues2,
          s.stavalues3::text[] AS stavalues3, s.stavalues4::text[] AS stavalues4,
          s.stavalues5::text[] AS stavalues5
        FROM pg_attribute a
        JOIN pg_class c ON c.oid = a.attrelid
        JOIN pg_namespace n ON n.oid = c.relnamespace
        LEFT JOIN pg_statistic s ON s.starelid = a.attrelid AND s.staattnum = a.attnum AND NOT s.stainherit
        WHERE n.nspname = $1 AND c.relname = $2 AND a.attnum > 0 AND NOT a.attisdropped
        ORDER BY a.attnum
        "#,
    )
    .bind(schema)
    .bind(table)
    .fetch_all(pool)
    .await?;

    let mut columns = Vec::with_capacity(rows.len());
    for row in rows {
        let name: String = row.try_get("name")?;
        let data_type: String = row.try_get("data_type")?;
        let not_null: bool = row.try_get("not_null")?;
        let stainherit: Option<bool> = row.try_get("stainherit")?;

        let stats = match stainherit {
            None => None,
            Some(stainherit) => {
                let stanullfrac: f32 = row.try_get("stanullfrac")?;
                let stawidth: i32 = row.try_get("stawidth")?;
                let stadistinct: f32 = row.try_get("stadistinct")?;
                let mut slots: Vec<StatSlot> = Vec::with_capacity(5);
                for i in 1..=5u8 {
                    let kind_code: i16 = row.try_get(format!("stakind{i}").as_str())?;
                    let op: Option<i64> = row.try_get(format!("staop{i}").as_str())?;
                    let coll: Option<i64> = row.try_get(format!("stacoll{i}").as_str())?;
                    let numbers: Option<Vec<f32>> = row.try_get(format!("stanumbers{i}").as_str())?;
                    let values: Option<Vec<String>> = if mode == ExportMode::Full {
                        row.try_get(format!("stavalues{i}").as_str())?
                    } else {
                        None
                    };
                    slots.push(StatSlot {
                        kind: StatSlotKind::from_code(kind_code),
                        op: op.map(|v| v as u32),
                        coll: coll.map(|v| v as u32),
                        numbers: numbers.unwrap_or_default(),
                        values,
                    });
                }
                let slots: [StatSlot; 5] = slots.try_into().expect("exactly 5 slots queried");
                Some(ColumnStats { stainherit, stanullfrac, stawidth, stadistinct, slots })
            }
        };

        columns.push(ColumnMetadata { name, data_type, nullable: !not_null, stats });
    }

    Ok(columns)
}

#[derive(Debug, Clone)]
pub struct RestoreWarning {
    pub table: String,
    pub detail: String,
}

#[derive(Debug, Clone, Default)]
pub struct RestoreReport {
    pub warnings: Vec<RestoreWarning>,
}

/// Restore an export onto `pool` in a single transaction (spec §4.3
/// "Restore contract"). `stavaluesN` slots are always written `NULL`: their
/// element type can't be safely reconstructed from the dumped text
/// representation without the target's exact catalog type OID, which the
/// spec explicitly allows falling back on.
pub async fn restore(pool: &PgPool, export: &ExportedStatsV1) -> Result<RestoreReport, AdvisorError> {
    let mut tx = pool.begin().await?;
    let mut warnings = Vec::new();

    let existing_rows = sqlx::query(
        "SELECT n.nspname AS schema, c.relname AS relname FROM pg_class c \
         JOIN pg_namespace n ON n.oid = c.relnamespace WHERE c.relkind = 'r'",
    )
    .fetch_all(&mut *tx)
    .await?;
    let mut existing: HashSet<(String, String)> = HashSet::with_capacity(existing_rows.len());
    for row in existing_rows {
        existing.insert((row.try_get("schema")?, row.try_get("relname")?));
    }

    for table in &export.tables {
        let key = (table.schema.clone(), table.table.clone());
        if !existing.contains(&key) {
            warnings.push(RestoreWarning {
                table: table.qualified_name(),
                detail: "present in export but absent from target; skipped".to_string(),
            });
            continue;
        }
        if table.reltuples < 0.0 {
            warnings.push(RestoreWarning {
                table: table.qualified_name(),
                detail: "source reltuples = -1 (table was never analyzed)".to_string(),
            });
        }

        sqlx::query(
            "UPDATE pg_class SET reltuples = $1, relpages = $2 \
             WHERE relname = $3 AND relnamespace = (SELECT oid FROM pg_namespace WHERE nspname = $4)",
        )
        .bind(table.reltuples)
        .bind(table.relpages)
        .bind(&table.table)
        .bind(&table.schema)
        .execute(&mut *tx)
        .await?;

        for column in &table.columns {
            if let Some(stats) = &column.stats {
                restore_column_stats(&mut tx, &table.schema, &table.table, &column.name, stats).await?;
            }
        }
    }

    tx.commit().await?;
    Ok(RestoreReport { warnings })
}

async fn restore_column_stats(
    tx: &mut Transaction<'_, Postgres>,
    schema: &str,
    table: &str,
    column: &str,
    stats: &ColumnStats,
) -> Result<(), AdvisorError> {
    let mut kinds = [0i16; 5];
    let mut ops: [Option<i64>; 5] = [None; 5];
    let mut colls: [Option<i64>; 5] = [None; 5];
    let mut numbers: [Vec<f32>; 5] = Default::default();
    for (i, slot) in stats.slots.iter().enumerate() {
        if slot.kind.is_supported() {
            kinds[i] = slot.kind.code();
            ops[i] = slot.op.map(|v| v as i64);
            colls[i] = slot.coll.map(|v| v as i64);
            numbers[i] = slot.numbers.clone();
        }
        // Unsupported kinds stay zeroed: written as kind=0, empty numbers,
        // NULL values, per the whitelist policy.
    }

    sqlx::query(
        r#"
        INSERT INTO pg_statistic (
          starelid, staattnum, stainherit, stanullfrac, stawidth, stadistinct,
          stakind1, stakind2, stakind3, stakind4, stakind5,
          staop1, staop2, staop3, staop4, staop5,
          stacoll1, stacoll2, stacoll3, stacoll4, stacoll5,
          stanumbers1, stanumbers2, stanumbers3, stanumbers4, stanumbers5
        )
        SELECT a.attrelid, a.attnum, $1, $2, $3, $4,
               $5, $6, $7, $8, $9,
               $10, $11, $12, $13, $14,
               $15, $16, $17, $18, $19,
               $20, $21, $22, $23, $24
        FROM pg_attribute a
        JOIN pg_class c ON c.oid = a.attrelid
        JOIN pg_namespace n ON n.oid = c.relnamespace
        WHERE n.nspname = $25 AND c.relname = $26 AND a.attname = $27
        ON CONFLICT (starelid, staattnum, stainherit) DO UPDATE SET
          stanullfrac = EXCLUDED.stanullfrac,
          stawidth = EXCLUDED.stawidth,
          stadistinct = EXCLUDED.stadistinct,
          stakind1 = EXCLUDED.stakind1, stakind2 = EXCLUDED.stakind2, stakind3 = EXCLUDED.stakind3,
          stakind4 = EXCLUDED.stakind4, stakind5 = EXCLUDED.stakind5,
          staop1 = EXCLUDED.staop1, staop2 = EXCLUDED.staop2, staop3 = EXCLUDED.staop3,
          staop4 = EXCLUDED.staop4, staop5 = EXCLUDED.staop5,
          stacoll1 = EXCLUDED.stacoll1, stacoll2 = EXCLUDED.stacoll2, stacoll3 = EXCLUDED.stacoll3,
          stacoll4 = EXCLUDED.stacoll4, stacoll5 = EXCLUDED.stacoll5,
          stanumbers1 = EXCLUDED.stanumbers1, stanumbers2 = EXCLUDED.stanumbers2,
          stanumbers3 = EXCLUDED.stanumbers3, stanumbers4 = EXCLUDED.stanumbers4,
          stanumbers5 = EXCLUDED.stanumbers5,
          stavalues1 = NULL, stavalues2 = NULL, stavalues3 = NULL,
          stavalues4 = NULL, stavalues5 = NULL
        "#,
    )
    .bind(stats.stainherit)
    .bind(stats.stanullfrac)
    .bind(stats.stawidth)
    .bind(stats.stadistinct)
    .bind(kinds[0])
    .bind(kinds[1])
    .bind(kinds[2])
    .bind(kinds[3])
    .bind(kinds[4])
    .bind(ops[0])
    .bind(ops[1])
    .bind(ops[2])
    .bind(ops[3])
    .bind(ops[4])
    .bind(colls[0])
    .bind(colls[1])
    .bind(colls[2])
    .bind(colls[3])
    .bind(colls[4])
    .bind(numbers[0].clone())
    .bind(numbers[1].clone())
    .bind(numbers[2].clone())
    .bind(numbers[3].clone())
    .bind(numbers[4].clone())
    .bind(schema)
    .bind(table)
    .bind(column)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Write an export document to `path` as JSON (spec §4.3 [AMBIENT]).
pub fn write_to_path(path: &std::path::Path, export: &ExportedStatsV1) -> Result<(), AdvisorError> {
    let doc = ExportedStats::V1(export.clone());
    let json = serde_json::to_string_pretty(&doc).map_err(|e| AdvisorError::Stats(e.to_string()))?;
    std::fs::write(path, json).map_err(|e| AdvisorError::Stats(e.to_string()))
}

/// Read an export document back from `path`.
pub fn read_from_path(path: &std::path::Path) -> Result<ExportedStatsV1, AdvisorError> {
    let contents = std::fs::read_to_string(path).map_err(|e| AdvisorError::Stats(e.to_string()))?;
    let doc: ExportedStats = serde_json::from_str(&contents).map_err(|e| AdvisorError::Stats(e.to_string()))?;
    doc.into_v1()
        .ok_or_else(|| AdvisorError::Stats("statistics file has an unsupported/future version".to_string()))
}
