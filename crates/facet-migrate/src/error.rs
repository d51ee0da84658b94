//! Error types for the migration runner.

use facet_db::DbError;
use thiserror::Error;

/// Failures reading the migration source.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The migration directory could not be listed (M101).
    #[error("[M101] Cannot read migration directory '{path}': {source}")]
    ReadDir {
        path: String,
        source: std::io::Error,
    },

    /// A unit or rollback payload could not be read (M102).
    #[error("[M102] Cannot read '{name}' at '{path}': {source}")]
    ReadPayload {
        name: String,
        path: String,
        source: std::io::Error,
    },

    /// The file-name pattern is not a valid glob (M103).
    #[error("[M103] Invalid migration file pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

/// Migration runner errors.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// No connection could be obtained (M001).
    #[error("[M001] Cannot connect to the database: {0}")]
    Connection(#[source] DbError),

    /// The migration source could not be enumerated or read (M002).
    #[error("[M002] Migration source unavailable: {0}")]
    Source(#[from] SourceError),

    /// A unit's statements or its ledger insert failed (M003).
    #[error("[M003] Migration '{unit}' failed: {source}")]
    Apply {
        unit: String,
        #[source]
        source: DbError,
    },

    /// Another runner recorded the unit while it was being applied (M004).
    ///
    /// Surfaces either at the ledger insert or at COMMIT, depending on
    /// which runner committed first. Concurrent runners are unsupported.
    #[error("[M004] Migration '{unit}' was recorded by another runner while being applied")]
    LedgerConflict { unit: String },

    /// Ledger bootstrap or read failed (M005).
    #[error("[M005] Migration ledger unavailable: {0}")]
    Ledger(#[source] DbError),

    /// No rollback payload is registered for the unit (M006).
    #[error("[M006] No rollback registered for migration '{unit}'")]
    RollbackNotFound { unit: String },

    /// The unit has no ledger entry; its rollback payload was not run (M011).
    #[error("[M011] Migration '{unit}' is not applied, nothing to roll back")]
    RollbackNotApplied { unit: String },

    /// A rollback payload or ledger delete failed (M007).
    #[error("[M007] Rollback of '{unit}' failed: {source}")]
    RollbackFailed {
        unit: String,
        #[source]
        source: DbError,
    },

    /// The stop flag was raised between units (M008).
    #[error("[M008] Migration run cancelled before '{next}'")]
    Cancelled { next: String },

    /// The ledger table name is not a plain identifier (M009).
    #[error("[M009] Invalid ledger table name '{0}'")]
    InvalidLedgerTable(String),

    /// Transaction control (`BEGIN`/`COMMIT`) failed outside a unit (M010).
    #[error("[M010] Transaction control failed: {0}")]
    Transaction(#[from] DbError),
}

/// Result type alias for [`MigrateError`].
pub type MigrateResult<T> = Result<T, MigrateError>;
