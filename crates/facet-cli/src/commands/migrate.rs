//! Migrate command implementation

use anyhow::{Context, Result};
use facet_migrate::{UnitOutcome, UnitReport};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::cli::{GlobalArgs, MigrateArgs};
use crate::commands::common::{blocking, build_runner, load_config};

/// Execute the migrate command
pub(crate) async fn execute(args: &MigrateArgs, global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?;
    let stop = Arc::new(AtomicBool::new(false));
    let runner = build_runner(&config)?.with_stop_flag(Arc::clone(&stop));

    let signal = tokio::spawn({
        let stop = Arc::clone(&stop);
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::warn!("Interrupt received, stopping after the current migration");
                stop.store(true, Ordering::SeqCst);
            }
        }
    });

    let json = args.json;
    if !json {
        println!("Migrating {}", config.database.path);
    }
    let result = blocking(move || {
        runner
            .run_with(|unit| {
                if !json {
                    print_unit(unit);
                }
            })
            .context("Migration failed")
    })
    .await;
    signal.abort();
    let report = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "\nDone: {} applied, {} skipped",
            report.applied().len(),
            report.skipped().len()
        );
    }
    Ok(())
}

fn print_unit(unit: &UnitReport) {
    match (unit.outcome, unit.elapsed_ms) {
        (UnitOutcome::Skipped, _) => println!("  = {} (already applied)", unit.name),
        (UnitOutcome::Applied, Some(ms)) => println!("  + {} [{ms}ms]", unit.name),
        (UnitOutcome::Applied, None) => println!("  + {}", unit.name),
        (UnitOutcome::Failed, _) => println!("  ! {} FAILED", unit.name),
    }
}

#[cfg(test)]
#[path = "migrate_test.rs"]
mod tests;
