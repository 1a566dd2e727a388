//! Thin database-access helpers shared by the catalog loader, StatisticsStore,
//! and Evaluator: a retrying connection pool and rich PostgreSQL error
//! context extraction.

pub mod connection;
pub mod error_context;
