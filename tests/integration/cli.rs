//! CLI smoke tests that don't require a live database: argument parsing and
//! usage errors surface before any connection attempt.

use assert_cmd::Command;
use predicates::str::contains;

#[test]
fn no_subcommand_prints_usage_error() {
    Command::cargo_bin("qd-advisor")
        .unwrap()
        .assert()
        .failure()
        .stderr(contains("Usage"));
}

#[test]
fn explain_requires_query_flag() {
    Command::cargo_bin("qd-advisor")
        .unwrap()
        .args(["explain"])
        .assert()
        .failure()
        .stderr(contains("--query"));
}

#[test]
fn help_lists_all_three_subcommands() {
    Command::cargo_bin("qd-advisor")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("analyze"))
        .stdout(contains("stats"))
        .stdout(contains("explain"));
}
