//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Facet - schema migrations for the storefront database
#[derive(Parser, Debug)]
#[command(name = "facet")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (default: ./facet.yml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the database path from the config
    #[arg(long, global = true, env = "FACET_DATABASE")]
    pub database: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply all pending migrations
    Migrate(MigrateArgs),

    /// Roll back a single applied migration
    Rollback(RollbackArgs),

    /// Show applied, pending, and orphaned migrations
    Status(StatusArgs),

    /// Create a new, empty migration and rollback file
    New(NewArgs),

    /// Connect, migrate, and serve the health endpoint
    Serve(ServeArgs),
}

/// Arguments for the migrate command
#[derive(Args, Debug, Default)]
pub struct MigrateArgs {
    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the rollback command
#[derive(Args, Debug)]
pub struct RollbackArgs {
    /// Name of the migration to roll back (file stem)
    pub name: String,
}

/// Arguments for the status command
#[derive(Args, Debug, Default)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the new command
#[derive(Args, Debug)]
pub struct NewArgs {
    /// Short description, used to build the file name
    pub description: String,
}

/// Arguments for the serve command
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Override the bind address from the config
    #[arg(short, long)]
    pub bind: Option<String>,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
