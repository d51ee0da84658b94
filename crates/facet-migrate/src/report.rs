//! Run and status reports.

use chrono::{DateTime, Utc};
use facet_core::UnitName;
use serde::Serialize;
use std::fmt;

/// What happened to a unit during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitOutcome {
    Applied,
    Skipped,
    Failed,
}

impl fmt::Display for UnitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitOutcome::Applied => write!(f, "applied"),
            UnitOutcome::Skipped => write!(f, "skipped"),
            UnitOutcome::Failed => write!(f, "failed"),
        }
    }
}

/// Outcome of one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitReport {
    pub name: UnitName,
    pub outcome: UnitOutcome,
    /// Wall time spent in the unit's transaction; `None` for skipped units
    pub elapsed_ms: Option<u64>,
}

/// Per-unit outcomes of a successful run, in application order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub units: Vec<UnitReport>,
}

impl RunReport {
    /// Names of units with the given outcome, in order.
    pub fn names_with(&self, outcome: UnitOutcome) -> Vec<&str> {
        self.units
            .iter()
            .filter(|u| u.outcome == outcome)
            .map(|u| u.name.as_str())
            .collect()
    }

    pub fn applied(&self) -> Vec<&str> {
        self.names_with(UnitOutcome::Applied)
    }

    pub fn skipped(&self) -> Vec<&str> {
        self.names_with(UnitOutcome::Skipped)
    }
}

/// State of a unit relative to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitState {
    /// In the source and recorded in the ledger
    Applied,
    /// In the source, not yet recorded
    Pending,
    /// Recorded in the ledger, no longer in the source
    Orphaned,
}

impl fmt::Display for UnitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitState::Applied => write!(f, "applied"),
            UnitState::Pending => write!(f, "pending"),
            UnitState::Orphaned => write!(f, "orphaned"),
        }
    }
}

/// One row of `status()` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusEntry {
    pub name: String,
    pub state: UnitState,
    pub applied_at: Option<DateTime<Utc>>,
}
