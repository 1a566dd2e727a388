//! Retrying connection pool setup: bounded retries with a fixed delay
//! between attempts, then per-session defaults including the advisor's
//! `statement_timeout`.

use std::time::Duration;

use anyhow::{Result, anyhow};
use sqlx::PgPool;
use tracing::{debug, info, warn};

/// Database connection configuration.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Maximum number of retries for database connections.
    pub max_retries: u32,
    /// Delay between connection retries.
    pub retry_delay: Duration,
    /// `statement_timeout` applied to every session opened from the pool, in
    /// addition to the Evaluator's own per-probe `tokio::time::timeout`
    /// (belt-and-suspenders: a runaway planner call is killed server-side
    /// even if the client-side timeout future is somehow never polled).
    pub statement_timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            retry_delay: Duration::from_millis(200),
            statement_timeout: Duration::from_secs(10),
        }
    }
}

/// Connect to database with retry logic, handling transient startup/network
/// issues while the target database is still coming up.
pub async fn connect_with_retry(url: &str) -> Result<PgPool> {
    connect_with_retry_config(url, &ConnectionConfig::default()).await
}

pub async fn connect_with_retry_config(url: &str, config: &ConnectionConfig) -> Result<PgPool> {
    let mut last_error = None;

    for attempt in 0..=config.max_retries {
        match PgPool::connect(url).await {
            Ok(pool) => {
                if attempt > 0 {
                    info!(attempt, "connected to database after retrying");
                } else {
                    debug!("connected to database");
                }
                initialize_database_session(&pool, config.statement_timeout).await?;
                return Ok(pool);
            }
            Err(e) => {
                last_error = Some(e);
                if attempt < config.max_retries {
                    if attempt == 0 {
                        warn!("database not ready, retrying...");
                    }
                    tokio::time::sleep(config.retry_delay).await;
                }
            }
        }
    }

    Err(anyhow!(
        "failed to connect to database after {} attempts: {}",
        config.max_retries + 1,
        last_error.unwrap()
    ))
}

/// Set session-level defaults on every connection the pool hands out:
/// `search_path`, `standard_conforming_strings`, and a `statement_timeout`
/// that bounds any single round-trip the Evaluator or StatisticsStore issue.
async fn initialize_database_session(pool: &PgPool, statement_timeout: Duration) -> Result<()> {
    sqlx::query("SET search_path = public, pg_catalog")
        .execute(pool)
        .await
        .map_err(|e| anyhow!("failed to set search_path: {}", e))?;

    sqlx::query("SET standard_conforming_strings = on")
        .execute(pool)
        .await
        .map_err(|e| anyhow!("failed to set standard_conforming_strings: {}", e))?;

    sqlx::query(&format!(
        "SET statement_timeout = {}",
        statement_timeout.as_millis()
    ))
    .execute(pool)
    .await
    .map_err(|e| anyhow!("failed to set statement_timeout: {}", e))?;

    Ok(())
}
