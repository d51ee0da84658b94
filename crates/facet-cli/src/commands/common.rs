//! Shared helpers for CLI commands

use anyhow::{Context, Result};
use facet_core::config::DEFAULT_CONFIG_FILE;
use facet_core::Config;
use facet_db::ConnectionPool;
use facet_migrate::MigrationRunner;
use std::sync::Arc;

use crate::cli::GlobalArgs;

/// Load the config named by `--config`, or `./facet.yml` if present, and
/// apply the `--database` override.
pub(crate) fn load_config(global: &GlobalArgs) -> Result<Config> {
    let mut config = match &global.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => {
            let cwd = std::env::current_dir().context("Failed to read current directory")?;
            Config::load_or_default(&cwd.join(DEFAULT_CONFIG_FILE), &cwd)
                .context("Failed to load facet.yml")?
        }
    };

    if let Some(database) = &global.database {
        config.database.path = database.clone();
    }
    Ok(config)
}

/// Open the configured database.
pub(crate) fn open_pool(config: &Config) -> Result<Arc<ConnectionPool>> {
    let pool = ConnectionPool::from_config(&config.database)
        .with_context(|| format!("Failed to open database {}", config.database.path))?;
    Ok(Arc::new(pool))
}

/// Open the database and build a runner over the configured migrations
/// directory.
pub(crate) fn build_runner(config: &Config) -> Result<MigrationRunner> {
    let pool = open_pool(config)?;
    MigrationRunner::from_config(pool, &config.migrations)
        .context("Invalid migrations configuration")
}

/// Run a blocking closure on tokio's blocking pool.
pub(crate) async fn blocking<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .context("Blocking task panicked")?
}

/// Calculate column widths for a table given headers and rows.
///
/// Each width is the maximum of the header length and every cell length in
/// that column.
pub(crate) fn calculate_column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.len());
        }
    }
    widths
}

/// Render a left-aligned table: header, dashed separator, then rows.
/// Columns are separated by two spaces and trailing padding is trimmed.
pub(crate) fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let widths = calculate_column_widths(headers, rows);
    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:<width$}", cell, width = w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = Vec::with_capacity(rows.len() + 2);
    out.push(line(headers.to_vec()));
    out.push(
        widths
            .iter()
            .map(|&w| "-".repeat(w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in rows {
        out.push(line(row.iter().map(String::as_str).collect()));
    }
    out.join("\n")
}

/// Print a formatted table to stdout.
pub(crate) fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    println!("{}", format_table(headers, rows));
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
