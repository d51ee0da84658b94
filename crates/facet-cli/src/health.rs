//! `GET /health` endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use facet_migrate::MigrationRunner;
use serde::Serialize;
use std::sync::Arc;

/// Shared state behind the health route.
#[derive(Clone)]
pub(crate) struct HealthState {
    pub runner: Arc<MigrationRunner>,
    pub startup_error: Option<String>,
}

/// Response body of `GET /health`.
#[derive(Debug, Serialize)]
pub(crate) struct HealthReport {
    pub status: &'static str,
    pub database: &'static str,
    pub pending: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub migration_error: Option<String>,
}

impl HealthReport {
    fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Probe the database and the ledger. Runs on a blocking thread.
pub(crate) fn check(state: &HealthState) -> HealthReport {
    let reachable = state.runner.pool().ping().is_ok();
    let pending = if reachable {
        match state.runner.pending_count() {
            Ok(count) => Some(count),
            Err(e) => {
                log::warn!("Health check could not read migration status: {e}");
                None
            }
        }
    } else {
        None
    };

    let healthy = reachable && pending.is_some() && state.startup_error.is_none();
    HealthReport {
        status: if healthy { "ok" } else { "degraded" },
        database: if reachable { "up" } else { "down" },
        pending,
        migration_error: state.startup_error.clone(),
    }
}

async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthReport>) {
    let fallback = state.startup_error.clone();
    let report = match tokio::task::spawn_blocking(move || check(&state)).await {
        Ok(report) => report,
        Err(e) => {
            log::error!("Health check task failed: {e}");
            HealthReport {
                status: "degraded",
                database: "unknown",
                pending: None,
                migration_error: fallback,
            }
        }
    };

    let code = if report.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(report))
}

pub(crate) fn router(state: HealthState) -> Router {
    Router::new()
        .route("/health", get(health))
        .with_state(state)
}

#[cfg(test)]
#[path = "health_test.rs"]
mod tests;
