//! Rollback command implementation

use anyhow::{Context, Result};

use crate::cli::{GlobalArgs, RollbackArgs};
use crate::commands::common::{blocking, build_runner, load_config};

/// Execute the rollback command
pub(crate) async fn execute(args: &RollbackArgs, global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?;
    let runner = build_runner(&config)?;
    let name = args.name.clone();

    blocking(move || {
        runner
            .rollback(&name)
            .with_context(|| format!("Rollback of {name} failed"))
    })
    .await?;

    println!("Rolled back {}", args.name);
    Ok(())
}

#[cfg(test)]
#[path = "rollback_test.rs"]
mod tests;
