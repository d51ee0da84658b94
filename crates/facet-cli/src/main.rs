//! Facet CLI - schema migrations for the jewelry storefront database

use anyhow::Result;
use clap::Parser;

mod bootstrap;
mod cli;
mod commands;
mod health;
mod logging;

use cli::Cli;
use commands::{migrate, new, rollback, serve, status};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.global.verbose);

    match &cli.command {
        cli::Commands::Migrate(args) => migrate::execute(args, &cli.global).await,
        cli::Commands::Rollback(args) => rollback::execute(args, &cli.global).await,
        cli::Commands::Status(args) => status::execute(args, &cli.global).await,
        cli::Commands::New(args) => new::execute(args, &cli.global).await,
        cli::Commands::Serve(args) => serve::execute(args, &cli.global).await,
    }
}
