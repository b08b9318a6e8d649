//! Core library for the liveness aggregation service: probes, the
//! orchestrator that runs them, and the HTTP handlers that report on them.

pub mod config;
pub mod error;
pub mod handlers;
pub mod health;
pub mod middleware;

pub use config::AppConfig;
pub use error::{HealthError, ProbeError, Result};
pub use handlers::routes::create_routes;
pub use health::{
    Aggregation, CacheProbe, DatabaseProbe, DependencyProbe, Orchestrator, Probe, RunMode,
    RunOutcome, Verdict,
};

use axum::Router;
use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub app_name: String,
    pub version: String,
    pub orchestrator: Arc<Orchestrator>,
    pub parallel_strategy: Aggregation,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            app_name: "Liveness Aggregator".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            orchestrator: Arc::new(orchestrator),
            parallel_strategy: Aggregation::default(),
        }
    }

    /// Database first, then cache, with timeouts and delay from `config`.
    pub fn from_config(config: &AppConfig) -> Self {
        let orchestrator = Orchestrator::new()
            .add_probe(DatabaseProbe::from_config(&config.database))
            .add_probe(CacheProbe::from_config(&config.cache))
            .with_probe_delay(config.health.probe_delay());

        Self::new(orchestrator).with_parallel_strategy(config.health.parallel_strategy)
    }

    pub fn with_parallel_strategy(mut self, strategy: Aggregation) -> Self {
        self.parallel_strategy = strategy;
        self
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(create_routes())
        .layer(middleware::logging::logging_layer())
        .with_state(state)
}

pub async fn run_server(app: Router, addr: SocketAddr) -> Result<()> {
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
