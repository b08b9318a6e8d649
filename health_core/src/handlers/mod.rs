//! HTTP handlers for the health endpoints

pub mod health;
pub mod routes;
