//! Process startup: connectivity probe with backoff, then one migration run.

use anyhow::{Context, Result};
use facet_core::{Config, StartupConfig};
use facet_db::ConnectionPool;
use facet_migrate::MigrationRunner;
use std::sync::Arc;
use std::time::Duration;

/// What startup produced. A failed migration leaves the process running.
pub(crate) struct StartupState {
    pub runner: Arc<MigrationRunner>,
    pub migration_error: Option<String>,
}

impl StartupState {
    pub fn is_degraded(&self) -> bool {
        self.migration_error.is_some()
    }
}

/// Delays slept before each retry: starts at `initial_backoff_ms`, doubles,
/// and is capped at `max_backoff_ms`.
pub(crate) fn backoff_schedule(config: &StartupConfig) -> Vec<Duration> {
    let cap = config.max_backoff_ms;
    let mut delay = config.initial_backoff_ms.min(cap);
    let mut schedule = Vec::with_capacity(config.connect_retries as usize);
    for _ in 0..config.connect_retries {
        schedule.push(Duration::from_millis(delay));
        delay = delay.saturating_mul(2).min(cap);
    }
    schedule
}

/// Open the pool and confirm it answers `SELECT 1`, retrying per the
/// `startup` section. Errors after the last attempt.
pub(crate) async fn connect_with_retry(config: &Config) -> Result<Arc<ConnectionPool>> {
    let database = config.database.clone();
    let mut delays = backoff_schedule(&config.startup).into_iter();
    let mut attempt = 1;

    loop {
        let db = database.clone();
        let probe = tokio::task::spawn_blocking(move || {
            let pool = ConnectionPool::from_config(&db)?;
            pool.ping()?;
            Ok::<_, facet_db::DbError>(pool)
        })
        .await
        .context("Connectivity probe panicked")?;

        match probe {
            Ok(pool) => {
                log::info!("Connected to {} (attempt {attempt})", pool.target());
                return Ok(Arc::new(pool));
            }
            Err(e) => match delays.next() {
                Some(delay) => {
                    log::warn!(
                        "Database {} unreachable (attempt {attempt}): {e}; retrying in {}ms",
                        database.path,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                None => {
                    return Err(e).with_context(|| {
                        format!(
                            "Database {} unreachable after {attempt} attempt(s)",
                            database.path
                        )
                    });
                }
            },
        }
    }
}

/// Connect, then run pending migrations once.
///
/// Connectivity failure is fatal. A migration failure is logged and recorded
/// in the returned state.
pub(crate) async fn start(config: &Config) -> Result<StartupState> {
    let pool = connect_with_retry(config).await?;
    let runner = Arc::new(
        MigrationRunner::from_config(pool, &config.migrations)
            .context("Invalid migrations configuration")?,
    );

    let worker = Arc::clone(&runner);
    let outcome = tokio::task::spawn_blocking(move || worker.run())
        .await
        .context("Migration task panicked")?;

    let migration_error = match outcome {
        Ok(report) => {
            log::info!(
                "Startup migrations done: {} applied, {} already present",
                report.applied().len(),
                report.skipped().len()
            );
            None
        }
        Err(e) => {
            log::error!("Startup migrations failed, continuing degraded: {e}");
            Some(e.to_string())
        }
    };

    Ok(StartupState {
        runner,
        migration_error,
    })
}

#[cfg(test)]
#[path = "bootstrap_test.rs"]
mod tests;
