// Integration tests for qd-advisor. Require `DATABASE_URL` to point at a
// reachable PostgreSQL instance (see `tests/helpers/harness.rs`).

pub mod helpers;
pub mod integration;
