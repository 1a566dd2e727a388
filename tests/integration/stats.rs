//! StatisticsStore dump/restore integration tests (spec §4.3, §8 R1).

use qd_advisor::stats::{dump, restore, ExportMode};

use crate::helpers::harness::PgTestInstance;

#[tokio::test]
async fn dump_reports_reltuples_and_column_stats_after_analyze() {
    let pg = PgTestInstance::new().await;
    let db = pg.create_test_database().await;
    db.execute("CREATE TABLE employees (id serial primary key, manager_id int, name text)").await;
    for i in 0..500 {
        db.execute(&format!("INSERT INTO employees (manager_id, name) VALUES ({}, 'employee-{}')", i % 7, i)).await;
    }
    db.execute("ANALYZE employees").await;

    let exported = dump(db.pool(), ExportMode::Full).await.unwrap();
    let table = exported.tables.iter().find(|t| t.table == "employees").expect("employees table in dump");
    assert!(table.reltuples > 0.0);
    assert!(table.columns.iter().any(|c| c.name == "manager_id" && c.stats.is_some()));

    db.cleanup().await;
}

#[tokio::test]
async fn restore_onto_matching_schema_overwrites_reltuples_and_relpages() {
    let pg = PgTestInstance::new().await;
    let source = pg.create_test_database().await;
    source.execute("CREATE TABLE employees (id serial primary key, manager_id int)").await;
    for i in 0..200 {
        source.execute(&format!("INSERT INTO employees (manager_id) VALUES ({})", i % 5)).await;
    }
    source.execute("ANALYZE employees").await;
    let exported = dump(source.pool(), ExportMode::Full).await.unwrap();

    let target = pg.create_test_database().await;
    target.execute("CREATE TABLE employees (id serial primary key, manager_id int)").await;

    let report = restore(target.pool(), &exported).await.unwrap();
    assert!(report.warnings.is_empty());

    let (reltuples,): (f32,) =
        sqlx::query_as("SELECT reltuples FROM pg_class WHERE relname = 'employees'")
            .fetch_one(target.pool())
            .await
            .unwrap();
    let expected = exported.tables.iter().find(|t| t.table == "employees").unwrap().reltuples;
    assert_eq!(reltuples, expected);

    source.cleanup().await;
    target.cleanup().await;
}

#[tokio::test]
async fn restore_warns_on_table_absent_from_target() {
    let pg = PgTestInstance::new().await;
    let source = pg.create_test_database().await;
    source.execute("CREATE TABLE only_in_source (id serial primary key)").await;
    let exported = dump(source.pool(), ExportMode::Full).await.unwrap();

    let target = pg.create_test_database().await;
    let report = restore(target.pool(), &exported).await.unwrap();
    assert!(report.warnings.iter().any(|w| w.table.contains("only_in_source")));

    source.cleanup().await;
    target.cleanup().await;
}
