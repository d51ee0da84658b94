//! Error types for facet-db

use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Statement execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Unique or primary-key constraint violated (D003)
    #[error("[D003] Constraint violated: {0}")]
    ConstraintViolation(String),

    /// Transaction management error (D004)
    #[error("[D004] Transaction failed: {0}")]
    TransactionError(String),

    /// Mutex poisoned (D005)
    #[error("[D005] Database mutex poisoned: {0}")]
    MutexPoisoned(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl DbError {
    /// Returns `true` for unique/primary-key violations.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, DbError::ConstraintViolation(_))
    }

    /// Returns `true` when the database could not be reached at all.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, DbError::ConnectionError(_))
    }
}

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        classify_message(err.to_string())
    }
}

/// Classify a DuckDB error message into a [`DbError`] kind.
///
/// duckdb::Error does not expose structured variants for constraint or
/// connection failures, so the message prefix is the only signal. The
/// patterns are kept narrow so ordinary statement failures stay
/// `ExecutionError`.
pub(crate) fn classify_message(msg: String) -> DbError {
    // Insert-time duplicates are "Constraint Error: Duplicate key ...";
    // duplicates against a concurrently committed row only fail at COMMIT,
    // as "PRIMARY KEY or UNIQUE constraint violation".
    let is_constraint = (msg.contains("Constraint Error")
        && (msg.contains("Duplicate key")
            || msg.contains("unique constraint")
            || msg.contains("primary key constraint")))
        || msg.contains("UNIQUE constraint violation");
    if is_constraint {
        DbError::ConstraintViolation(msg)
    } else if msg.contains("Connection Error") || msg.contains("connection was closed") {
        DbError::ConnectionError(msg)
    } else {
        DbError::ExecutionError(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_key_is_constraint_violation() {
        let err = classify_message(
            "Constraint Error: Duplicate key \"name: 001_a\" violates unique constraint."
                .to_string(),
        );
        assert!(err.is_constraint_violation());
    }

    #[test]
    fn test_commit_time_duplicate_is_constraint_violation() {
        let err = classify_message(
            "TransactionContext Error: Failed to commit: PRIMARY KEY or UNIQUE constraint violation: duplicate key \"002_b\""
                .to_string(),
        );
        assert!(err.is_constraint_violation());
    }

    #[test]
    fn test_not_null_is_execution_error() {
        let err = classify_message(
            "Constraint Error: NOT NULL constraint failed: products.sku".to_string(),
        );
        assert!(matches!(err, DbError::ExecutionError(_)));
    }

    #[test]
    fn test_catalog_error_is_execution_error() {
        let err = classify_message(
            "Catalog Error: Table with name missing does not exist!".to_string(),
        );
        assert!(matches!(err, DbError::ExecutionError(_)));
    }

    #[test]
    fn test_connection_error_classified() {
        let err = classify_message("Connection Error: connection was closed".to_string());
        assert!(err.is_connection_error());
    }
}
