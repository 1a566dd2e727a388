//! Evaluator integration tests (spec §4.4, §8 P1).
//!
//! Requires `DATABASE_URL` to point at a reachable PostgreSQL instance.

use qd_advisor::evaluator::{Evaluator, IndexMutation, EvaluationOutcome, ProbeTimeout};
use qd_advisor::model::TableMetadata;

use crate::helpers::harness::PgTestInstance;

fn employees_table(reltuples: f32) -> TableMetadata {
    TableMetadata {
        schema: "public".into(),
        table: "employees".into(),
        reltuples,
        relpages: (reltuples / 100.0).max(1.0) as i32,
        relallvisible: 0,
        columns: Vec::new(),
    }
}

#[tokio::test]
async fn rollback_leaves_no_hypothetical_index_behind() {
    let pg = PgTestInstance::new().await;
    let db = pg.create_test_database().await;
    db.execute("CREATE TABLE employees (id serial primary key, manager_id int, name text)").await;

    let evaluator = Evaluator::new(db.pool().clone(), ProbeTimeout::default());
    let mutation = IndexMutation::from_candidate(&qd_advisor::model::PermutedIndexCandidate::new(
        "public",
        "employees",
        vec!["manager_id".to_string()],
    ));

    let outcome = evaluator
        .run_with_reltuples(
            "select * from employees where manager_id = 1",
            &[],
            &[employees_table(10_000_000.0)],
            &[mutation],
        )
        .await
        .unwrap();
    assert!(matches!(outcome, EvaluationOutcome::Evaluated { .. }));

    // P1: the rolled-back transaction must leave no __qd_-prefixed index
    // and no lingering reltuples override behind.
    let (index_count,): (i64,) = sqlx::query_as(
        "SELECT count(*) FROM pg_indexes WHERE tablename = 'employees' AND indexname LIKE '\\_\\_qd\\_%'",
    )
    .fetch_one(db.pool())
    .await
    .unwrap();
    assert_eq!(index_count, 0);

    let (reltuples,): (f32,) = sqlx::query_as(
        "SELECT reltuples FROM pg_class WHERE relname = 'employees'",
    )
    .fetch_one(db.pool())
    .await
    .unwrap();
    assert_ne!(reltuples, 10_000_000.0);

    db.cleanup().await;
}

#[tokio::test]
async fn zero_cost_baseline_short_circuits() {
    let pg = PgTestInstance::new().await;
    let db = pg.create_test_database().await;

    let evaluator = Evaluator::new(db.pool().clone(), ProbeTimeout::default());
    let outcome = evaluator.run_with_reltuples("select 1", &[], &[], &[]).await.unwrap();
    assert!(matches!(outcome, EvaluationOutcome::ZeroCostPlan));

    db.cleanup().await;
}

#[tokio::test]
async fn failed_create_index_surfaces_as_evaluation_error() {
    let pg = PgTestInstance::new().await;
    let db = pg.create_test_database().await;
    db.execute("CREATE TABLE employees (id serial primary key, manager_id int)").await;

    let evaluator = Evaluator::new(db.pool().clone(), ProbeTimeout::default());
    let bogus = IndexMutation::from_candidate(&qd_advisor::model::PermutedIndexCandidate::new(
        "public",
        "employees",
        vec!["does_not_exist".to_string()],
    ));

    let outcome = evaluator
        .run_with_reltuples("select * from employees", &[], &[employees_table(10_000_000.0)], &[bogus])
        .await;
    assert!(outcome.is_err());

    // The failed CREATE INDEX must not have left anything behind either.
    let (index_count,): (i64,) = sqlx::query_as(
        "SELECT count(*) FROM pg_indexes WHERE tablename = 'employees' AND indexname LIKE '\\_\\_qd\\_%'",
    )
    .fetch_one(db.pool())
    .await
    .unwrap();
    assert_eq!(index_count, 0);

    db.cleanup().await;
}
