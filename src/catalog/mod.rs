//! Loads `ExistingIndex`es from `pg_catalog` at startup (spec §3
//! "Lifecycles": table/column/existing-index metadata is loaded once per run
//! and treated as immutable thereafter).
//!
//! The query joins `pg_index` to `pg_class`/`pg_am`/`pg_namespace`, trimmed
//! to the columns the Optimizer's existing-index suppression (P5) actually
//! needs: no dependency graph or storage-parameter rendering to carry
//! along, just schema/table/index/access-method/column-sequence.

use sqlx::{PgPool, Row};

use crate::errors::AdvisorError;
use crate::model::{ExistingIndex, ExistingIndexColumn, IndexAccessMethod, SortDirection, TableMetadata, TableReference};
use crate::stats::FallbackAssumption;

/// Every index on a user table, across every non-system schema. Collected
/// once per run; the Optimizer consults this set per candidate, never
/// re-querying mid-search.
pub async fn load_existing_indexes(pool: &PgPool) -> Result<Vec<ExistingIndex>, AdvisorError> {
    let rows = sqlx::query(
        r#"
        SELECT
          n.nspname AS schema,
          t.relname AS table_name,
          ic.relname AS index_name,
          am.amname AS access_method,
          array_agg(a.attname ORDER BY k.ord) AS columns,
          array_agg(
            CASE WHEN (i.indoption[k.ord - 1] & 1) = 1 THEN 'desc' ELSE 'asc' END
            ORDER BY k.ord
          ) AS directions
        FROM pg_index i
        JOIN pg_class t ON t.oid = i.indrelid
        JOIN pg_class ic ON ic.oid = i.indexrelid
        JOIN pg_namespace n ON n.oid = t.relnamespace
        JOIN pg_am am ON am.oid = ic.relam
        JOIN LATERAL unnest(i.indkey) WITH ORDINALITY AS k(attnum, ord) ON true
        JOIN pg_attribute a ON a.attrelid = t.oid AND a.attnum = k.attnum
        WHERE t.relkind = 'r'
          AND n.nspname NOT IN ('pg_catalog', 'information_schema', 'pg_toast')
          AND k.attnum > 0
        GROUP BY n.nspname, t.relname, ic.relname, am.amname
        ORDER BY n.nspname, t.relname, ic.relname
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut indexes = Vec::with_capacity(rows.len());
    for row in rows {
        let schema: String = row.try_get("schema")?;
        let table: String = row.try_get("table_name")?;
        let index_name: String = row.try_get("index_name")?;
        let access_method: String = row.try_get("access_method")?;
        let column_names: Vec<String> = row.try_get("columns")?;
        let directions: Vec<String> = row.try_get("directions")?;

        let columns = column_names
            .into_iter()
            .zip(directions)
            .map(|(name, direction)| ExistingIndexColumn {
                name,
                direction: if direction == "desc" { SortDirection::Desc } else { SortDirection::Asc },
            })
            .collect();

        indexes.push(ExistingIndex {
            schema,
            table,
            index_name,
            access_method: access_method_from_str(&access_method),
            columns,
        });
    }

    Ok(indexes)
}

/// Fabricate table metadata under the fallback assumption (spec §4.3), used
/// when no statistics export is supplied.
pub fn assumed_tables(tables: &[TableReference], assumption: FallbackAssumption) -> Vec<TableMetadata> {
    tables
        .iter()
        .map(|t| TableMetadata {
            schema: t.schema.clone(),
            table: t.table.clone(),
            reltuples: assumption.reltuples,
            relpages: assumption.relpages,
            relallvisible: 0,
            columns: Vec::new(),
        })
        .collect()
}

fn access_method_from_str(s: &str) -> IndexAccessMethod {
    match s {
        "btree" => IndexAccessMethod::Btree,
        "gin" => IndexAccessMethod::Gin,
        _ => IndexAccessMethod::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_method_recognizes_btree_and_gin() {
        assert_eq!(access_method_from_str("btree"), IndexAccessMethod::Btree);
        assert_eq!(access_method_from_str("gin"), IndexAccessMethod::Gin);
        assert_eq!(access_method_from_str("hash"), IndexAccessMethod::Other);
    }

    #[test]
    fn assumed_tables_carries_the_fallback_reltuples_to_every_table() {
        let refs = vec![TableReference::new("public", "orders"), TableReference::new("public", "users")];
        let tables = assumed_tables(&refs, FallbackAssumption::default());
        assert_eq!(tables.len(), 2);
        assert!(tables.iter().all(|t| t.reltuples == FallbackAssumption::default().reltuples));
    }
}
