//! Concrete probes for the dependencies the service watches

pub mod cache;
pub mod database;
pub mod dependency;

pub use cache::CacheProbe;
pub use database::DatabaseProbe;
pub use dependency::DependencyProbe;
