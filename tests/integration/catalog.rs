//! `load_existing_indexes` integration tests (spec §3 "ExistingIndex").

use qd_advisor::catalog::load_existing_indexes;
use qd_advisor::model::IndexAccessMethod;

use crate::helpers::harness::PgTestInstance;

#[tokio::test]
async fn loads_btree_index_with_column_order_preserved() {
    let pg = PgTestInstance::new().await;
    let db = pg.create_test_database().await;
    db.execute("CREATE TABLE orders (id serial primary key, user_id int, created_at timestamptz)").await;
    db.execute("CREATE INDEX orders_user_id_created_at_idx ON orders (user_id, created_at)").await;

    let indexes = load_existing_indexes(db.pool()).await.unwrap();
    let found = indexes
        .iter()
        .find(|i| i.index_name == "orders_user_id_created_at_idx")
        .expect("expected the created index to be loaded");

    assert_eq!(found.schema, "public");
    assert_eq!(found.table, "orders");
    assert_eq!(found.access_method, IndexAccessMethod::Btree);
    assert_eq!(found.columns.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(), vec!["user_id", "created_at"]);

    db.cleanup().await;
}

#[tokio::test]
async fn gin_index_is_classified_non_btree() {
    let pg = PgTestInstance::new().await;
    let db = pg.create_test_database().await;
    db.execute("CREATE TABLE docs (id serial primary key, tags text[])").await;
    db.execute("CREATE INDEX docs_tags_gin_idx ON docs USING gin (tags)").await;

    let indexes = load_existing_indexes(db.pool()).await.unwrap();
    let found = indexes.iter().find(|i| i.index_name == "docs_tags_gin_idx").unwrap();
    assert_eq!(found.access_method, IndexAccessMethod::Gin);

    db.cleanup().await;
}
