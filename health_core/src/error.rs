//! Application error types and handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HealthError>;

/// Failure raised by a probe's raw dependency call.
///
/// Never escapes a probe: `Probe::check` turns every variant into an
/// unhealthy [`Verdict`](crate::health::Verdict).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("Timeout")]
    Timeout,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

impl From<std::io::Error> for ProbeError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::TimedOut => ProbeError::Timeout,
            std::io::ErrorKind::InvalidData => ProbeError::Protocol(err.to_string()),
            _ => ProbeError::Connection(err.to_string()),
        }
    }
}

impl From<sqlx::Error> for ProbeError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => ProbeError::Timeout,
            sqlx::Error::Io(io) => ProbeError::Connection(io.to_string()),
            sqlx::Error::Tls(e) => ProbeError::Connection(e.to_string()),
            sqlx::Error::PoolClosed => ProbeError::Connection("pool closed".to_string()),
            sqlx::Error::Configuration(e) => ProbeError::Connection(e.to_string()),
            sqlx::Error::Database(db_err) => ProbeError::Protocol(db_err.to_string()),
            sqlx::Error::Protocol(msg) => ProbeError::Protocol(msg),
            other => ProbeError::Unexpected(other.to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum HealthError {
    #[error("Orchestration error: {0}")]
    Orchestration(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<tokio::task::JoinError> for HealthError {
    fn from(err: tokio::task::JoinError) -> Self {
        HealthError::Orchestration(err.to_string())
    }
}

impl IntoResponse for HealthError {
    fn into_response(self) -> Response {
        match &self {
            HealthError::Orchestration(msg) => tracing::error!("Orchestration error: {}", msg),
            HealthError::Config(err) => tracing::error!("Configuration error: {}", err),
            HealthError::Io(err) => tracing::error!("IO error: {:?}", err),
            HealthError::Other(err) => tracing::error!("Unexpected error: {:?}", err),
        }

        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
    }
}
