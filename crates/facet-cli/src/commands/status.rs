//! Status command implementation

use anyhow::{Context, Result};
use facet_migrate::{StatusEntry, UnitState};

use crate::cli::{GlobalArgs, StatusArgs};
use crate::commands::common::{blocking, build_runner, load_config, print_table};

/// Execute the status command
pub(crate) async fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?;
    let runner = build_runner(&config)?;
    let entries = blocking(move || runner.status().context("Failed to read migration status"))
        .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No migrations found in {}", config.migrations.dir.display());
        return Ok(());
    }

    print_table(&["NAME", "STATE", "APPLIED AT"], &status_rows(&entries));

    let pending = entries
        .iter()
        .filter(|e| e.state == UnitState::Pending)
        .count();
    println!("\n{} migration(s), {pending} pending", entries.len());
    Ok(())
}

pub(crate) fn status_rows(entries: &[StatusEntry]) -> Vec<Vec<String>> {
    entries
        .iter()
        .map(|e| {
            vec![
                e.name.clone(),
                e.state.to_string(),
                e.applied_at
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect()
}

#[cfg(test)]
#[path = "status_test.rs"]
mod tests;
