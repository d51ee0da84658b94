//! facet-migrate - Migration runner for Facet
//!
//! Applies the migration units of a [`MigrationSource`] to the database in
//! ascending name order. Each unit runs in its own transaction together with
//! its ledger insert; units already in the ledger are skipped, and the first
//! failure stops the run.

pub mod error;
pub mod ledger;
pub mod report;
pub mod runner;
pub mod source;
pub mod unit;

pub use error::{MigrateError, MigrateResult, SourceError};
pub use ledger::{Ledger, LedgerEntry};
pub use report::{RunReport, StatusEntry, UnitOutcome, UnitReport, UnitState};
pub use runner::MigrationRunner;
pub use source::{DirectorySource, MemorySource, MigrationSource};
pub use unit::MigrationUnit;
