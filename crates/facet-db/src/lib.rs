//! facet-db - Connection provider for Facet
//!
//! This crate owns the database boundary: a small pool of DuckDB
//! connections, a `BEGIN`/`COMMIT` transaction helper, a connectivity probe,
//! and the translation of driver errors into [`DbError`] kinds.

pub mod error;
pub mod pool;

pub use error::{DbError, DbResult};
pub use pool::{ConnectionPool, PooledConnection};

/// Re-exported so callers can name the connection type inside transactions.
pub use duckdb::Connection;
