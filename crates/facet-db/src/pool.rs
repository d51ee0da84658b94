//! Pooled DuckDB connections.
//!
//! [`ConnectionPool`] owns one root connection to the target database and
//! hands out clones of it. Clones share the same underlying database, so an
//! in-memory pool behaves like a single database across all its
//! connections.

use crate::error::{DbError, DbResult};
use duckdb::Connection;
use facet_core::config::{DatabaseConfig, MEMORY_DB_PATH};
use std::ops::Deref;
use std::path::Path;
use std::sync::Mutex;

/// Pool of connections to a single DuckDB database.
#[derive(Debug)]
pub struct ConnectionPool {
    target: String,
    root: Mutex<Connection>,
    idle: Mutex<Vec<Connection>>,
    max_idle: usize,
}

impl ConnectionPool {
    /// Open (or create) the database at `path`.
    pub fn open(path: &Path, pool_size: usize) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Ok(Self::with_root(path.display().to_string(), conn, pool_size))
    }

    /// Create a pool over a fresh in-memory database.
    pub fn in_memory(pool_size: usize) -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self::with_root(MEMORY_DB_PATH.to_string(), conn, pool_size))
    }

    /// Create from a path string (handles the `:memory:` special case)
    pub fn new(path: &str, pool_size: usize) -> DbResult<Self> {
        if path == MEMORY_DB_PATH {
            Self::in_memory(pool_size)
        } else {
            Self::open(Path::new(path), pool_size)
        }
    }

    /// Create a pool from the `database` section of the config.
    pub fn from_config(config: &DatabaseConfig) -> DbResult<Self> {
        Self::new(&config.path, config.pool_size)
    }

    fn with_root(target: String, root: Connection, pool_size: usize) -> Self {
        log::debug!("Opened database {target} (pool size {pool_size})");
        Self {
            target,
            root: Mutex::new(root),
            idle: Mutex::new(Vec::new()),
            max_idle: pool_size.max(1),
        }
    }

    /// Database target this pool connects to, for logging.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Number of connections currently parked in the pool.
    pub fn idle_count(&self) -> usize {
        self.idle.lock().map(|idle| idle.len()).unwrap_or(0)
    }

    /// Take a connection from the pool, opening a new one if none is idle.
    pub fn acquire(&self) -> DbResult<PooledConnection<'_>> {
        let parked = self
            .idle
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))?
            .pop();

        let conn = match parked {
            Some(conn) => conn,
            None => {
                let root = self
                    .root
                    .lock()
                    .map_err(|e| DbError::MutexPoisoned(e.to_string()))?;
                root.try_clone()
                    .map_err(|e| DbError::ConnectionError(format!("{e}: {}", self.target)))?
            }
        };

        Ok(PooledConnection {
            conn: Some(conn),
            pool: self,
        })
    }

    /// Probe connectivity with a trivial round trip.
    pub fn ping(&self) -> DbResult<()> {
        let conn = self.acquire()?;
        let one: i32 = conn
            .query_row("SELECT 1", [], |row| row.get(0))
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;
        if one != 1 {
            return Err(DbError::ConnectionError(format!(
                "unexpected probe result {one} from {}",
                self.target
            )));
        }
        Ok(())
    }

    fn release(&self, conn: Connection) {
        if let Ok(mut idle) = self.idle.lock() {
            if idle.len() < self.max_idle {
                idle.push(conn);
            }
        }
    }
}

/// A connection checked out of a [`ConnectionPool`].
///
/// Returned to the pool on drop.
pub struct PooledConnection<'a> {
    conn: Option<Connection>,
    pool: &'a ConnectionPool,
}

impl PooledConnection<'_> {
    /// Execute `body` within a `BEGIN` / `COMMIT` transaction, rolling back on
    /// error.
    ///
    /// A failed `COMMIT` is rolled back as well. A constraint violation
    /// detected at commit keeps its [`DbError::ConstraintViolation`] kind;
    /// other commit failures are [`DbError::TransactionError`].
    pub fn transaction<F, T, E>(&self, body: F) -> Result<T, E>
    where
        F: FnOnce(&Connection) -> Result<T, E>,
        E: From<DbError>,
    {
        let conn: &Connection = self;
        conn.execute_batch("BEGIN TRANSACTION")
            .map_err(|e| DbError::TransactionError(format!("BEGIN failed: {e}")))?;

        let result = body(conn);

        match &result {
            Ok(_) => {
                if let Err(commit_err) = conn.execute_batch("COMMIT") {
                    let _ = conn.execute_batch("ROLLBACK");
                    return Err(commit_error(commit_err).into());
                }
            }
            Err(_) => {
                if let Err(rollback_err) = conn.execute_batch("ROLLBACK") {
                    log::warn!("ROLLBACK failed on {}: {rollback_err}", self.pool.target);
                }
            }
        }
        result
    }
}

fn commit_error(err: duckdb::Error) -> DbError {
    match DbError::from(err) {
        DbError::ExecutionError(msg) => {
            DbError::TransactionError(format!("COMMIT failed: {msg}"))
        }
        classified => classified,
    }
}

impl Deref for PooledConnection<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        self.conn
            .as_ref()
            .expect("pooled connection is only taken on drop")
    }
}

impl Drop for PooledConnection<'_> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.release(conn);
        }
    }
}

#[cfg(test)]
#[path = "pool_test.rs"]
mod tests;
