//! Migration units.

use crate::error::SourceError;
use facet_core::UnitName;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Where a unit's statements live.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Payload {
    File(PathBuf),
    Inline(String),
}

/// One named block of schema-change statements.
///
/// File-backed units are read lazily: the runner only reads the payload of
/// a unit it is about to apply, never of one it skips.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationUnit {
    name: UnitName,
    payload: Payload,
}

impl MigrationUnit {
    /// A unit whose statements are read from `path` when applied.
    pub fn from_file(name: UnitName, path: impl Into<PathBuf>) -> Self {
        Self {
            name,
            payload: Payload::File(path.into()),
        }
    }

    /// A unit whose statements are held in memory.
    pub fn inline(name: UnitName, sql: impl Into<String>) -> Self {
        Self {
            name,
            payload: Payload::Inline(sql.into()),
        }
    }

    /// The unit's name, which is also its ledger key.
    pub fn name(&self) -> &UnitName {
        &self.name
    }

    /// Backing file, if the unit is file-backed.
    pub fn path(&self) -> Option<&Path> {
        match &self.payload {
            Payload::File(path) => Some(path),
            Payload::Inline(_) => None,
        }
    }

    /// Read the unit's statements verbatim.
    pub fn read_sql(&self) -> Result<Cow<'_, str>, SourceError> {
        match &self.payload {
            Payload::Inline(sql) => Ok(Cow::Borrowed(sql)),
            Payload::File(path) => std::fs::read_to_string(path)
                .map(Cow::Owned)
                .map_err(|e| SourceError::ReadPayload {
                    name: self.name.to_string(),
                    path: path.display().to_string(),
                    source: e,
                }),
        }
    }
}
