//! The migration runner.
//!
//! [`MigrationRunner::run`] brings the database up to date:
//!
//! 1. ensure the ledger table exists,
//! 2. load the names already recorded,
//! 3. enumerate the source and sort by name,
//! 4. for each unit, skip it if recorded, otherwise execute its statements
//!    and insert its ledger row in one transaction.
//!
//! The first failing unit ends the run. Units before it stay committed,
//! units after it are not attempted. The runner never retries and never
//! inspects schema state, and it assumes it is the only runner against the
//! database.

use crate::error::{MigrateError, MigrateResult};
use crate::ledger::Ledger;
use crate::report::{RunReport, StatusEntry, UnitOutcome, UnitReport, UnitState};
use crate::source::{DirectorySource, MigrationSource};
use crate::unit::MigrationUnit;
use facet_core::config::MigrationsConfig;
use facet_core::UnitName;
use facet_db::{ConnectionPool, DbError, PooledConnection};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Applies and rolls back migration units against a connection pool.
pub struct MigrationRunner {
    pool: Arc<ConnectionPool>,
    source: Box<dyn MigrationSource>,
    ledger: Ledger,
    stop: Option<Arc<AtomicBool>>,
}

impl MigrationRunner {
    /// Create a runner over `source`, recording into `ledger`.
    pub fn new(
        pool: Arc<ConnectionPool>,
        source: impl MigrationSource + 'static,
        ledger: Ledger,
    ) -> Self {
        Self {
            pool,
            source: Box::new(source),
            ledger,
            stop: None,
        }
    }

    /// Create a runner over a [`DirectorySource`] described by `config`.
    pub fn from_config(pool: Arc<ConnectionPool>, config: &MigrationsConfig) -> MigrateResult<Self> {
        let source = DirectorySource::from_config(config)?;
        let ledger = Ledger::new(&config.ledger_table)?;
        Ok(Self::new(pool, source, ledger))
    }

    /// Check `stop` between units and cancel the run once it is set.
    ///
    /// A unit whose transaction has started always runs to commit or
    /// rollback.
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn pool(&self) -> &Arc<ConnectionPool> {
        &self.pool
    }

    /// Apply all pending units.
    pub fn run(&self) -> MigrateResult<RunReport> {
        self.run_with(|_| {})
    }

    /// Apply all pending units, calling `observe` with every unit's outcome
    /// as it happens, including the failing one.
    pub fn run_with<F>(&self, mut observe: F) -> MigrateResult<RunReport>
    where
        F: FnMut(&UnitReport),
    {
        let conn = self.pool.acquire().map_err(MigrateError::Connection)?;
        self.ledger
            .ensure_table(&conn)
            .map_err(|e| self.ledger_error(e))?;
        let applied = self
            .ledger
            .applied_names(&conn)
            .map_err(|e| self.ledger_error(e))?;
        let units = self.ordered_units()?;

        log::info!(
            "Found {} migration(s) in {}, {} already recorded",
            units.len(),
            self.source.describe(),
            applied.len()
        );

        let mut report = RunReport::default();
        for unit in &units {
            let name = unit.name();
            if applied.contains(name.as_str()) {
                log::debug!("Skipping migration {name}: already applied");
                let skipped = UnitReport {
                    name: name.clone(),
                    outcome: UnitOutcome::Skipped,
                    elapsed_ms: None,
                };
                observe(&skipped);
                report.units.push(skipped);
                continue;
            }

            if self.stop_requested() {
                log::warn!("Stop requested, not applying {name}");
                return Err(MigrateError::Cancelled {
                    next: name.to_string(),
                });
            }

            let started = Instant::now();
            let result = self.apply(&conn, unit);
            let elapsed_ms = Some(started.elapsed().as_millis() as u64);

            match result {
                Ok(()) => {
                    log::info!("Applied migration {name}");
                    let done = UnitReport {
                        name: name.clone(),
                        outcome: UnitOutcome::Applied,
                        elapsed_ms,
                    };
                    observe(&done);
                    report.units.push(done);
                }
                Err(e) => {
                    log::error!("Migration {name} failed: {e}");
                    observe(&UnitReport {
                        name: name.clone(),
                        outcome: UnitOutcome::Failed,
                        elapsed_ms,
                    });
                    return Err(e);
                }
            }
        }

        log::info!(
            "Migrations complete: {} applied, {} skipped",
            report.applied().len(),
            report.skipped().len()
        );
        Ok(report)
    }

    /// Execute the rollback payload registered for `name` and delete its
    /// ledger entry, in one transaction.
    ///
    /// The ledger row is checked inside the transaction before the payload
    /// runs. A unit without one fails with
    /// [`MigrateError::RollbackNotApplied`] and the schema is untouched.
    pub fn rollback(&self, name: &str) -> MigrateResult<()> {
        let not_found = || MigrateError::RollbackNotFound {
            unit: name.to_string(),
        };
        let unit = UnitName::try_new(name).ok_or_else(not_found)?;
        let payload = self
            .source
            .rollback_payload(&unit)?
            .ok_or_else(not_found)?;

        let conn = self.pool.acquire().map_err(MigrateError::Connection)?;
        let not_applied = || MigrateError::RollbackNotApplied {
            unit: unit.to_string(),
        };
        if !self
            .ledger
            .exists(&conn)
            .map_err(|e| self.ledger_error(e))?
        {
            return Err(not_applied());
        }

        let failed = |source: DbError| MigrateError::RollbackFailed {
            unit: unit.to_string(),
            source,
        };
        conn.transaction(|tx| {
            if !self.ledger.contains(tx, &unit).map_err(failed)? {
                return Err(not_applied());
            }
            if !payload.trim().is_empty() {
                tx.execute_batch(&payload).map_err(|e| failed(e.into()))?;
            }
            self.ledger.remove(tx, &unit).map_err(failed)?;
            Ok(())
        })
        .map_err(|e| match e {
            MigrateError::Transaction(source) => failed(source),
            other => other,
        })?;

        log::info!("Rolled back migration {unit}");
        Ok(())
    }

    /// Compare the source with the ledger.
    ///
    /// Entries are sorted by name and cover every unit known to either side.
    pub fn status(&self) -> MigrateResult<Vec<StatusEntry>> {
        let conn = self.pool.acquire().map_err(MigrateError::Connection)?;
        let created = self
            .ledger
            .exists(&conn)
            .map_err(|e| self.ledger_error(e))?;
        let entries = if created {
            self.ledger
                .entries(&conn)
                .map_err(|e| self.ledger_error(e))?
        } else {
            Vec::new()
        };
        let units = self.source.units()?;

        let mut status: BTreeMap<String, StatusEntry> = entries
            .into_iter()
            .map(|entry| {
                let row = StatusEntry {
                    name: entry.name.clone(),
                    state: UnitState::Orphaned,
                    applied_at: Some(entry.applied_at),
                };
                (entry.name, row)
            })
            .collect();

        for unit in units {
            let name = unit.name().to_string();
            status
                .entry(name.clone())
                .and_modify(|row| row.state = UnitState::Applied)
                .or_insert(StatusEntry {
                    name,
                    state: UnitState::Pending,
                    applied_at: None,
                });
        }

        Ok(status.into_values().collect())
    }

    /// Number of units in the source that have no ledger entry.
    pub fn pending_count(&self) -> MigrateResult<usize> {
        Ok(self
            .status()?
            .iter()
            .filter(|s| s.state == UnitState::Pending)
            .count())
    }

    fn ordered_units(&self) -> MigrateResult<Vec<MigrationUnit>> {
        let mut units = self.source.units()?;
        units.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(units)
    }

    fn apply(&self, conn: &PooledConnection<'_>, unit: &MigrationUnit) -> MigrateResult<()> {
        let name = unit.name();
        let sql = unit.read_sql()?;
        let failed = |source: DbError| MigrateError::Apply {
            unit: name.to_string(),
            source,
        };

        conn.transaction(|tx| {
            if sql.trim().is_empty() {
                log::warn!("Migration {name} has no statements");
            } else {
                tx.execute_batch(&sql).map_err(|e| failed(e.into()))?;
            }
            self.ledger
                .record(tx, name)
                .map_err(|e| record_failure(name, e))
        })
        .map_err(|e| match e {
            MigrateError::Transaction(source) => record_failure(name, source),
            other => other,
        })
    }

    fn ledger_error(&self, err: DbError) -> MigrateError {
        if err.is_connection_error() {
            MigrateError::Connection(err)
        } else {
            MigrateError::Ledger(err)
        }
    }

    fn stop_requested(&self) -> bool {
        self.stop
            .as_ref()
            .is_some_and(|stop| stop.load(Ordering::SeqCst))
    }
}

/// Classify a failure while recording `unit`, at the ledger insert or at
/// COMMIT. A constraint violation means another runner recorded it first.
fn record_failure(unit: &UnitName, source: DbError) -> MigrateError {
    if source.is_constraint_violation() {
        MigrateError::LedgerConflict {
            unit: unit.to_string(),
        }
    } else {
        MigrateError::Apply {
            unit: unit.to_string(),
            source,
        }
    }
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
