use crate::config::DatabaseConfig;
use crate::error::ProbeError;
use crate::health::Probe;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Document store probe: lists the store's collections.
///
/// The pool is created on the first check and kept for the life of the
/// probe.
pub struct DatabaseProbe {
    name: String,
    url: String,
    timeout: Duration,
    pool: OnceCell<SqlitePool>,
}

impl DatabaseProbe {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            name: "database".to_string(),
            url: url.into(),
            timeout,
            pool: OnceCell::new(),
        }
    }

    pub fn from_config(config: &DatabaseConfig) -> Self {
        Self::new(config.url.clone(), config.timeout())
    }

    /// Probe around an already-established pool.
    pub fn with_pool(pool: SqlitePool, timeout: Duration) -> Self {
        Self {
            name: "database".to_string(),
            url: String::new(),
            timeout,
            pool: OnceCell::from(pool),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn is_connected(&self) -> bool {
        self.pool.initialized()
    }

    async fn pool(&self) -> Result<&SqlitePool, ProbeError> {
        let pool = self
            .pool
            .get_or_try_init(|| async {
                info!("Connecting probe '{}' to {}", self.name, self.url);
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .acquire_timeout(self.timeout)
                    .connect(&self.url)
                    .await
            })
            .await?;

        Ok(pool)
    }

    pub async fn collections(&self) -> Result<Vec<String>, ProbeError> {
        let pool = self.pool().await?;

        let names: Vec<String> =
            sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
                .fetch_all(pool)
                .await?;

        Ok(names)
    }
}

#[async_trait::async_trait]
impl Probe for DatabaseProbe {
    fn name(&self) -> &str {
        &self.name
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn ping(&self) -> Result<(), ProbeError> {
        let collections = self.collections().await?;
        debug!("Probe '{}' sees {} collections", self.name, collections.len());
        Ok(())
    }
}
