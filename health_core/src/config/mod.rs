pub mod settings;

pub use settings::{AppConfig, CacheConfig, DatabaseConfig, HealthConfig, ServerConfig};
