//! Health check handlers

use crate::{
    error::Result,
    health::{measure, RunMode, RunOutcome, Verdict},
    AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::time::Duration;
use tracing::{error, info, warn};

const ORCHESTRATOR_SOURCE: &str = "orchestrator";

pub async fn handle_healthcheck(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /healthcheck - Running serial health check");

    let (result, elapsed) = measure(state.orchestrator.run(RunMode::Serial)).await;
    let failure = failure_of(result);

    (StatusCode::OK, render_body(failure.as_ref(), elapsed))
}

pub async fn handle_parallel_healthcheck(State(state): State<AppState>) -> impl IntoResponse {
    info!(
        "GET /parallel-healthcheck - Running parallel health check ({:?})",
        state.parallel_strategy
    );

    let mode = RunMode::Parallel(state.parallel_strategy);
    let (result, elapsed) = measure(state.orchestrator.run(mode)).await;
    let failure = failure_of(result);

    let status_code = if failure.is_some() {
        warn!("Parallel health check is failing");
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    };

    (status_code, render_body(failure.as_ref(), elapsed))
}

pub async fn handle_probe_healthcheck(
    State(state): State<AppState>,
    Path(probe): Path<String>,
) -> impl IntoResponse {
    info!("GET /healthcheck/{} - Checking single probe", probe);

    let (verdict, elapsed) = measure(state.orchestrator.check_probe(&probe)).await;

    match verdict {
        Some(verdict) if verdict.is_healthy() => {
            (StatusCode::OK, render_body(None, elapsed))
        }
        Some(verdict) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            render_body(Some(&verdict), elapsed),
        ),
        None => (
            StatusCode::NOT_FOUND,
            format!("Probe '{}' not found", probe),
        ),
    }
}

/// Maps a run result to its failing verdict. An orchestration error is
/// reported as a generic failure so the endpoint still answers.
fn failure_of(result: Result<RunOutcome>) -> Option<Verdict> {
    match result {
        Ok(outcome) => outcome.failure,
        Err(e) => {
            error!("Health check run failed: {}", e);
            Some(Verdict::unhealthy(
                ORCHESTRATOR_SOURCE,
                "health check could not be completed",
            ))
        }
    }
}

pub fn render_body(failure: Option<&Verdict>, elapsed: Duration) -> String {
    match failure {
        Some(verdict) => format!("{} - {} ms", verdict, elapsed.as_millis()),
        None => format!("WORKING - {} ms", elapsed.as_millis()),
    }
}
