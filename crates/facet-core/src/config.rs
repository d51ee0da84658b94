//! Configuration types and parsing for facet.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Conventional config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "facet.yml";

/// Path value that selects an in-memory database.
pub const MEMORY_DB_PATH: &str = ":memory:";

/// Main configuration from facet.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Migration source and ledger configuration
    #[serde(default)]
    pub migrations: MigrationsConfig,

    /// Startup connectivity probe configuration
    #[serde(default)]
    pub startup: StartupConfig,

    /// Health endpoint configuration
    #[serde(default)]
    pub server: ServerConfig,
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database path (DuckDB file or `:memory:`)
    #[serde(default = "default_db_path")]
    pub path: String,

    /// Maximum number of idle pooled connections
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            pool_size: default_pool_size(),
        }
    }
}

impl DatabaseConfig {
    /// Returns `true` when the configured target is an in-memory database.
    pub fn is_memory(&self) -> bool {
        self.path == MEMORY_DB_PATH
    }
}

/// Migration source and ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MigrationsConfig {
    /// Directory holding the migration units
    #[serde(default = "default_migrations_dir")]
    pub dir: PathBuf,

    /// Directory holding rollback payloads, one `<unit>.sql` per unit
    #[serde(default = "default_rollback_dir")]
    pub rollback_dir: PathBuf,

    /// Glob pattern a file name must match to be treated as a unit
    #[serde(default = "default_pattern")]
    pub pattern: String,

    /// Ledger table name, optionally schema-qualified
    #[serde(default = "default_ledger_table")]
    pub ledger_table: String,
}

impl Default for MigrationsConfig {
    fn default() -> Self {
        Self {
            dir: default_migrations_dir(),
            rollback_dir: default_rollback_dir(),
            pattern: default_pattern(),
            ledger_table: default_ledger_table(),
        }
    }
}

/// Startup connectivity probe configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StartupConfig {
    /// Additional connectivity attempts after the first one fails
    #[serde(default = "default_connect_retries")]
    pub connect_retries: u32,

    /// Delay before the first retry, in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Upper bound on the delay between retries, in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            connect_retries: default_connect_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

/// Health endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address the health endpoint binds to
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_db_path() -> String {
    "storefront.duckdb".to_string()
}

fn default_pool_size() -> usize {
    4
}

fn default_migrations_dir() -> PathBuf {
    PathBuf::from("migrations")
}

fn default_rollback_dir() -> PathBuf {
    PathBuf::from("migrations/rollback")
}

fn default_pattern() -> String {
    "*.sql".to_string()
}

fn default_ledger_table() -> String {
    "schema_migrations".to_string()
}

fn default_connect_retries() -> u32 {
    5
}

fn default_initial_backoff_ms() -> u64 {
    250
}

fn default_max_backoff_ms() -> u64 {
    5_000
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

impl Config {
    /// Load configuration from a file path.
    ///
    /// Relative paths in the file are resolved against the file's directory.
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let mut config = Self::parse(&content)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults resolved
    /// against `base`.
    pub fn load_or_default(path: &Path, base: &Path) -> CoreResult<Self> {
        if path.exists() {
            return Self::load(path);
        }
        log::debug!(
            "No config file at {}, using defaults",
            path.display()
        );
        let mut config = Self::default();
        config.resolve_paths(base);
        Ok(config)
    }

    /// Parse and validate configuration from YAML text.
    pub fn parse(content: &str) -> CoreResult<Self> {
        let config: Config = if content.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Resolve relative directory and database paths against `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        if self.migrations.dir.is_relative() {
            self.migrations.dir = base.join(&self.migrations.dir);
        }
        if self.migrations.rollback_dir.is_relative() {
            self.migrations.rollback_dir = base.join(&self.migrations.rollback_dir);
        }
        if !self.database.is_memory() && Path::new(&self.database.path).is_relative() {
            self.database.path = base.join(&self.database.path).display().to_string();
        }
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.database.path.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "database.path cannot be empty".to_string(),
            });
        }

        if self.database.pool_size == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "database.pool_size must be at least 1".to_string(),
            });
        }

        if let Err(e) = glob::Pattern::new(&self.migrations.pattern) {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "migrations.pattern '{}' is not a valid glob: {}",
                    self.migrations.pattern, e
                ),
            });
        }

        if !is_valid_table_name(&self.migrations.ledger_table) {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "migrations.ledger_table '{}' must be an identifier, optionally schema-qualified",
                    self.migrations.ledger_table
                ),
            });
        }

        if self.startup.initial_backoff_ms > self.startup.max_backoff_ms {
            return Err(CoreError::ConfigInvalid {
                message: "startup.initial_backoff_ms cannot exceed startup.max_backoff_ms"
                    .to_string(),
            });
        }

        Ok(())
    }
}

/// Check that `name` is `ident` or `schema.ident`.
///
/// The ledger table name is interpolated into DDL, so only plain
/// identifiers are accepted.
pub fn is_valid_table_name(name: &str) -> bool {
    let mut parts = name.split('.');
    let valid = parts.by_ref().take(2).all(is_valid_identifier);
    valid && parts.next().is_none()
}

fn is_valid_identifier(ident: &str) -> bool {
    let mut chars = ident.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
