//! Serve command implementation

use anyhow::{Context, Result};

use crate::bootstrap;
use crate::cli::{GlobalArgs, ServeArgs};
use crate::commands::common::load_config;
use crate::health::{self, HealthState};

/// Execute the serve command
pub(crate) async fn execute(args: &ServeArgs, global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?;
    let bind = args
        .bind
        .clone()
        .unwrap_or_else(|| config.server.bind.clone());

    let state = bootstrap::start(&config).await?;
    if state.is_degraded() {
        log::warn!("Serving in degraded state");
    }

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    log::info!("Health endpoint on http://{bind}/health");

    let app = health::router(HealthState {
        runner: state.runner,
        startup_error: state.migration_error,
    });
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            log::info!("Shutting down");
        })
        .await
        .context("Health server error")?;
    Ok(())
}
