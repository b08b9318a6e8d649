//! Route table for the health endpoints

use crate::{
    handlers::health::{handle_healthcheck, handle_parallel_healthcheck, handle_probe_healthcheck},
    AppState,
};
use axum::{routing::get, Router};

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/healthcheck", get(handle_healthcheck))
        .route("/healthcheck/:probe", get(handle_probe_healthcheck))
        .route("/parallel-healthcheck", get(handle_parallel_healthcheck))
}
