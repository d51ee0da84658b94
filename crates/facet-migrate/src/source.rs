//! Migration sources.
//!
//! A [`MigrationSource`] enumerates migration units and looks up rollback
//! payloads by exact unit name. [`DirectorySource`] reads both from disk;
//! [`MemorySource`] holds them in process.

use crate::error::SourceError;
use crate::unit::MigrationUnit;
use facet_core::config::MigrationsConfig;
use facet_core::UnitName;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Source of migration units and their rollback payloads.
///
/// Implementations must be Send + Sync so a runner can be moved onto a
/// blocking thread.
pub trait MigrationSource: Send + Sync {
    /// Enumerate all recognised units. Order is not significant; the runner
    /// sorts by name.
    fn units(&self) -> Result<Vec<MigrationUnit>, SourceError>;

    /// Look up the rollback payload registered under exactly `name`.
    fn rollback_payload(&self, name: &UnitName) -> Result<Option<String>, SourceError>;

    /// Human-readable description for logging
    fn describe(&self) -> String;
}

/// Units read from files in a directory.
///
/// Every regular file directly inside `dir` whose file name matches
/// `pattern` is a unit named after its file stem. Rollback payloads live in
/// `rollback_dir` as `<unit name>.sql`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
    rollback_dir: PathBuf,
    pattern: glob::Pattern,
}

impl DirectorySource {
    /// Rollback payload file extension.
    pub const ROLLBACK_EXTENSION: &'static str = "sql";

    /// Create a source over `dir` with the default `*.sql` pattern.
    pub fn new(dir: impl Into<PathBuf>, rollback_dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            rollback_dir: rollback_dir.into(),
            pattern: glob::Pattern::new("*.sql").expect("static pattern is valid"),
        }
    }

    /// Create a source from the `migrations` section of the config.
    pub fn from_config(config: &MigrationsConfig) -> Result<Self, SourceError> {
        Self::new(&config.dir, &config.rollback_dir).with_pattern(&config.pattern)
    }

    /// Replace the file-name pattern.
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self, SourceError> {
        self.pattern = glob::Pattern::new(pattern).map_err(|e| SourceError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        Ok(self)
    }

    /// Directory holding the units.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Directory holding the rollback payloads.
    pub fn rollback_dir(&self) -> &Path {
        &self.rollback_dir
    }

    fn read_dir_error(&self, source: std::io::Error) -> SourceError {
        SourceError::ReadDir {
            path: self.dir.display().to_string(),
            source,
        }
    }
}

impl MigrationSource for DirectorySource {
    fn units(&self) -> Result<Vec<MigrationUnit>, SourceError> {
        let mut units = Vec::new();
        for entry in std::fs::read_dir(&self.dir).map_err(|e| self.read_dir_error(e))? {
            let entry = entry.map_err(|e| self.read_dir_error(e))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                log::warn!("Ignoring non-UTF-8 file name in {}", self.dir.display());
                continue;
            };
            if !self.pattern.matches(file_name) {
                continue;
            }
            match UnitName::from_path(&path) {
                Some(name) => units.push(MigrationUnit::from_file(name, path)),
                None => log::warn!("Ignoring migration file without a name: {}", path.display()),
            }
        }
        Ok(units)
    }

    fn rollback_payload(&self, name: &UnitName) -> Result<Option<String>, SourceError> {
        // Unit names are file stems, so a name with a separator cannot be registered.
        if name.contains(['/', '\\']) {
            return Ok(None);
        }
        let path = self
            .rollback_dir
            .join(format!("{name}.{}", Self::ROLLBACK_EXTENSION));
        if !path.is_file() {
            return Ok(None);
        }
        std::fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| SourceError::ReadPayload {
                name: name.to_string(),
                path: path.display().to_string(),
                source: e,
            })
    }

    fn describe(&self) -> String {
        self.dir.display().to_string()
    }
}

/// Units and rollback payloads held in memory.
///
/// Units are returned in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    units: Vec<MigrationUnit>,
    rollbacks: HashMap<UnitName, String>,
}

impl MemorySource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a unit.
    pub fn with_unit(mut self, name: impl Into<String>, sql: impl Into<String>) -> Self {
        self.units
            .push(MigrationUnit::inline(UnitName::new(name), sql));
        self
    }

    /// Register a rollback payload for `name`.
    pub fn with_rollback(mut self, name: impl Into<String>, sql: impl Into<String>) -> Self {
        self.rollbacks.insert(UnitName::new(name), sql.into());
        self
    }
}

impl MigrationSource for MemorySource {
    fn units(&self) -> Result<Vec<MigrationUnit>, SourceError> {
        Ok(self.units.clone())
    }

    fn rollback_payload(&self, name: &UnitName) -> Result<Option<String>, SourceError> {
        Ok(self.rollbacks.get(name).cloned())
    }

    fn describe(&self) -> String {
        format!("memory ({} units)", self.units.len())
    }
}

#[cfg(test)]
#[path = "source_test.rs"]
mod tests;
