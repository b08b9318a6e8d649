use crate::health::Aggregation;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub health: HealthConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthConfig {
    pub probe_delay_ms: u64,
    pub parallel_strategy: Aggregation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub address: String,
    pub timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            timeout_seconds: 3,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:6379".to_string(),
            timeout_seconds: 3,
        }
    }
}

impl HealthConfig {
    pub fn probe_delay(&self) -> Duration {
        Duration::from_millis(self.probe_delay_ms)
    }
}

impl DatabaseConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl CacheConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl AppConfig {
    /// Defaults, then `config.toml` if present, then `APP_*` variables
    /// (`APP_CACHE__TIMEOUT_SECONDS=5`).
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?);

        if std::path::Path::new("config.toml").exists() {
            builder = builder.add_source(File::with_name("config"));
        }

        builder = builder.add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        app_config.validate()?;

        Ok(app_config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message("Server port cannot be 0".to_string()));
        }

        if self.database.url.is_empty() {
            return Err(ConfigError::Message(
                "Database URL cannot be empty".to_string(),
            ));
        }

        if self.database.timeout_seconds == 0 {
            return Err(ConfigError::Message(
                "Database timeout must be greater than 0".to_string(),
            ));
        }

        if self.cache.address.is_empty() {
            return Err(ConfigError::Message(
                "Cache address cannot be empty".to_string(),
            ));
        }

        if self.cache.timeout_seconds == 0 {
            return Err(ConfigError::Message(
                "Cache timeout must be greater than 0".to_string(),
            ));
        }

        if self.health.probe_delay_ms > 0 {
            tracing::warn!(
                "Serial health checks pause {} ms after each probe",
                self.health.probe_delay_ms
            );
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.database.timeout(), Duration::from_secs(3));
        assert_eq!(config.cache.timeout(), Duration::from_secs(3));
        assert_eq!(config.health.probe_delay(), Duration::ZERO);
        assert_eq!(config.health.parallel_strategy, Aggregation::Race);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();

        config.server.port = 0;
        assert!(config.validate().is_err());

        config = AppConfig::default();
        config.database.url = String::new();
        assert!(config.validate().is_err());

        config = AppConfig::default();
        config.cache.timeout_seconds = 0;
        assert!(config.validate().is_err());

        config = AppConfig::default();
        config.database.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bind_address() {
        let config = AppConfig::default();
        assert_eq!(config.bind_address(), "127.0.0.1:3000");

        let mut config = AppConfig::default();
        config.server.host = "0.0.0.0".to_string();
        config.server.port = 8080;
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_config_loading() {
        let config = AppConfig::load().expect("Should load default configuration");

        assert!(!config.server.host.is_empty());
        assert!(config.server.port > 0);
        assert!(!config.cache.address.is_empty());
        assert!(config.database.timeout_seconds > 0);
    }

    #[test]
    fn test_parallel_strategy_names() {
        let config = Config::builder()
            .add_source(Config::try_from(&AppConfig::default()).unwrap())
            .set_override("health.parallel_strategy", "join_all")
            .unwrap()
            .build()
            .unwrap();

        let app_config: AppConfig = config.try_deserialize().unwrap();
        assert_eq!(app_config.health.parallel_strategy, Aggregation::JoinAll);
    }
}
