//! The migration ledger.
//!
//! One row per applied unit. A row is written in the same transaction as the
//! unit's statements and deleted only by an explicit rollback; row existence
//! is the only thing the runner consults to decide whether a unit ran.

use crate::error::{MigrateError, MigrateResult};
use chrono::{DateTime, Utc};
use facet_core::config::is_valid_table_name;
use facet_core::UnitName;
use facet_db::{Connection, DbError, DbResult};
use serde::Serialize;
use std::collections::HashSet;

/// Default ledger table name.
pub const DEFAULT_LEDGER_TABLE: &str = "schema_migrations";

/// One applied migration unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    /// Surrogate key
    pub id: i64,
    /// Unit name
    pub name: String,
    /// When the unit's transaction committed
    pub applied_at: DateTime<Utc>,
}

/// Handle on the ledger table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    table: String,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            table: DEFAULT_LEDGER_TABLE.to_string(),
        }
    }
}

impl Ledger {
    /// Create a ledger handle for `table` (`name` or `schema.name`).
    pub fn new(table: impl Into<String>) -> MigrateResult<Self> {
        let table = table.into();
        if !is_valid_table_name(&table) {
            return Err(MigrateError::InvalidLedgerTable(table));
        }
        Ok(Self { table })
    }

    /// Fully qualified table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    fn sequence(&self) -> String {
        format!("{}_id_seq", self.table)
    }

    fn schema(&self) -> Option<&str> {
        self.table.split_once('.').map(|(schema, _)| schema)
    }

    /// Create the ledger table (and its schema and id sequence) if absent.
    pub fn ensure_table(&self, conn: &Connection) -> DbResult<()> {
        let mut ddl = String::new();
        if let Some(schema) = self.schema() {
            ddl.push_str(&format!("CREATE SCHEMA IF NOT EXISTS {schema};\n"));
        }
        ddl.push_str(&format!(
            "CREATE SEQUENCE IF NOT EXISTS {seq};
             CREATE TABLE IF NOT EXISTS {table} (
                 id         BIGINT PRIMARY KEY DEFAULT nextval('{seq}'),
                 name       VARCHAR NOT NULL UNIQUE,
                 applied_at TIMESTAMP NOT NULL DEFAULT now()
             );",
            seq = self.sequence(),
            table = self.table,
        ));
        conn.execute_batch(&ddl)?;
        log::debug!("Ledger table {} ready", self.table);
        Ok(())
    }

    /// Whether the ledger table has been created. Runs no DDL.
    pub fn exists(&self, conn: &Connection) -> DbResult<bool> {
        let (schema, name) = self
            .table
            .split_once('.')
            .unwrap_or(("main", self.table.as_str()));
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM information_schema.tables \
             WHERE table_schema = ? AND table_name = ?",
            duckdb::params![schema, name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Whether `name` has a ledger entry.
    pub fn contains(&self, conn: &Connection, name: &UnitName) -> DbResult<bool> {
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {} WHERE name = ?", self.table),
            duckdb::params![name.as_str()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Names of all recorded units.
    pub fn applied_names(&self, conn: &Connection) -> DbResult<HashSet<String>> {
        let mut stmt = conn.prepare(&format!("SELECT name FROM {}", self.table))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(names)
    }

    /// All entries, ordered by name.
    pub fn entries(&self, conn: &Connection) -> DbResult<Vec<LedgerEntry>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT id, name, epoch_ms(applied_at) FROM {} ORDER BY name",
            self.table
        ))?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, name, millis)| {
                let applied_at = DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
                    DbError::ExecutionError(format!(
                        "ledger entry '{name}' has an out-of-range timestamp ({millis} ms)"
                    ))
                })?;
                Ok(LedgerEntry {
                    id,
                    name,
                    applied_at,
                })
            })
            .collect()
    }

    /// Record `name` as applied.
    ///
    /// Fails with [`DbError::ConstraintViolation`] if it is already recorded.
    pub fn record(&self, conn: &Connection, name: &UnitName) -> DbResult<()> {
        conn.execute(
            &format!("INSERT INTO {} (name) VALUES (?)", self.table),
            duckdb::params![name.as_str()],
        )?;
        Ok(())
    }

    /// Delete the entry for `name`, returning the number of rows removed.
    pub fn remove(&self, conn: &Connection, name: &UnitName) -> DbResult<usize> {
        let removed = conn.execute(
            &format!("DELETE FROM {} WHERE name = ?", self.table),
            duckdb::params![name.as_str()],
        )?;
        Ok(removed)
    }
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
