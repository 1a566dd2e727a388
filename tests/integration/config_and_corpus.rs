//! File-backed ambient-stack plumbing: config loading and corpus file
//! ingestion, exercised against real files on disk (as opposed to the
//! string-level unit tests next to the parsers themselves).

use qd_advisor::config::load_config;
use qd_advisor::corpus::{CorpusFormat, load_from_path};

#[test]
fn missing_config_file_resolves_to_defaults_instead_of_erroring() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("does-not-exist.yaml");

    let (input, config_dir) = load_config(path.to_str().unwrap()).unwrap();
    assert_eq!(input.postgres_url, None);
    assert_eq!(config_dir, dir.path());
}

#[test]
fn present_config_file_is_parsed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("qd-advisor.yaml");
    std::fs::write(&path, "postgres_url: postgres://localhost/app\nmax_cost: 100.0\n").unwrap();

    let (input, _) = load_config(path.to_str().unwrap()).unwrap();
    assert_eq!(input.postgres_url.as_deref(), Some("postgres://localhost/app"));
    assert_eq!(input.max_cost, Some(100.0));
}

#[test]
fn raw_corpus_file_is_split_into_statements() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corpus.sql");
    std::fs::write(&path, "select 1;\n-- comment only\n;\nselect 2;\n").unwrap();

    let entries = load_from_path(&path, CorpusFormat::Raw).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].statement, "select 1");
    assert_eq!(entries[1].statement, "select 2");
}

#[test]
fn missing_corpus_file_is_a_reported_error_not_a_panic() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.sql");
    assert!(load_from_path(&path, CorpusFormat::Raw).is_err());
}
