//! Optimizer end-to-end scenarios (spec §8 "End-to-end scenarios" 1, 5, 6).

use qd_advisor::analyzer::analyze;
use qd_advisor::catalog::load_existing_indexes;
use qd_advisor::evaluator::{Evaluator, ProbeTimeout};
use qd_advisor::model::TableMetadata;
use qd_advisor::optimizer::{Optimizer, OptimizerOutcome};

use crate::helpers::harness::PgTestInstance;

fn table(schema: &str, table: &str, reltuples: f32) -> TableMetadata {
    TableMetadata {
        schema: schema.into(),
        table: table.into(),
        reltuples,
        relpages: (reltuples / 100.0).max(1.0) as i32,
        relallvisible: 0,
        columns: Vec::new(),
    }
}

/// Scenario 1: single-column seed on `employees."managerId"` should win.
#[tokio::test]
async fn single_column_seed_reduces_cost() {
    let pg = PgTestInstance::new().await;
    let db = pg.create_test_database().await;
    db.execute(r#"CREATE TABLE employees (id serial primary key, "managerId" int, name text)"#).await;

    let query = r#"select "hi" from employees where employees."managerId" = 1"#;
    let parsed = analyze(query).unwrap();
    let tables = vec![table("public", "employees", 10_000_000.0)];
    let existing = load_existing_indexes(db.pool()).await.unwrap();

    let evaluator = Evaluator::new(db.pool().clone(), ProbeTimeout::default());
    let optimizer = Optimizer::new(&evaluator, &existing, None);

    let outcome = optimizer.optimize(query, &[], &parsed, &tables).await.unwrap();
    let OptimizerOutcome::Completed(report) = outcome else { panic!("expected a completed report") };

    assert!(report.base_cost > report.final_cost);
    assert_eq!(report.new_indexes.len(), 1);
    assert_eq!(report.new_indexes[0].candidate.columns, vec!["managerId".to_string()]);

    db.cleanup().await;
}

/// Scenario 5: a composite `(user_id, created_at)` index should beat either
/// single-column alternative.
#[tokio::test]
async fn composite_index_wins_over_single_column_alternatives() {
    let pg = PgTestInstance::new().await;
    let db = pg.create_test_database().await;
    db.execute("CREATE TABLE orders (id serial primary key, user_id int, created_at timestamptz)").await;

    let query = "select * from orders where user_id = $1 and created_at > $2 order by created_at";
    let parsed = analyze(query).unwrap();
    let tables = vec![table("public", "orders", 10_000_000.0)];
    let existing = load_existing_indexes(db.pool()).await.unwrap();

    let evaluator = Evaluator::new(db.pool().clone(), ProbeTimeout::default());
    let optimizer = Optimizer::new(&evaluator, &existing, None);

    let outcome = optimizer.optimize(query, &[], &parsed, &tables).await.unwrap();
    let OptimizerOutcome::Completed(report) = outcome else { panic!("expected a completed report") };

    let composite = report
        .new_indexes
        .iter()
        .find(|r| r.candidate.columns == vec!["user_id".to_string(), "created_at".to_string()]);
    assert!(composite.is_some(), "expected a composite (user_id, created_at) recommendation, got {:?}", report.new_indexes);

    db.cleanup().await;
}

/// Scenario 6: a pre-existing `btree(user_id, created_at)` suppresses the
/// identical candidate; no `__qd_`-prefixed index is produced.
#[tokio::test]
async fn existing_index_suppresses_identical_candidate() {
    let pg = PgTestInstance::new().await;
    let db = pg.create_test_database().await;
    db.execute("CREATE TABLE orders (id serial primary key, user_id int, created_at timestamptz)").await;
    db.execute("CREATE INDEX orders_user_id_created_at_idx ON orders (user_id, created_at)").await;

    let query = "select * from orders where user_id = $1 and created_at > $2 order by created_at";
    let parsed = analyze(query).unwrap();
    let tables = vec![table("public", "orders", 10_000_000.0)];
    let existing = load_existing_indexes(db.pool()).await.unwrap();

    let evaluator = Evaluator::new(db.pool().clone(), ProbeTimeout::default());
    let optimizer = Optimizer::new(&evaluator, &existing, None);

    let outcome = optimizer.optimize(query, &[], &parsed, &tables).await.unwrap();
    let OptimizerOutcome::Completed(report) = outcome else { panic!("expected a completed report") };

    assert!(report.new_indexes.is_empty());
    assert!(report.existing_indexes_used.iter().any(|name| name == "orders_user_id_created_at_idx"));

    db.cleanup().await;
}
