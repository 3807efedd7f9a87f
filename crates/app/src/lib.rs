//! svckit HTTP scaffolding
//!
//! Default router with a health check, JSON responses, settings and a
//! signal-driven graceful shutdown for services built on svckit.

pub mod settings;
pub mod shutdown;

use axum::{http::StatusCode, response::Response, routing::get, Router};
use serde::Serialize;

pub use settings::Settings;
pub use shutdown::{serve, serve_until, shutdown_signal, ServeError};
pub use svckit_common::response::respond_json;

/// Path of the health check endpoint
pub const HEALTH_PATH: &str = "/health";

#[derive(Debug, Serialize)]
struct HealthStatus {
    status: &'static str,
}

/// Health check endpoint
pub async fn health_check() -> Response {
    respond_json(StatusCode::OK, &HealthStatus { status: "ok" })
}

/// Router every service starts from; currently just the health check
pub fn default_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route(HEALTH_PATH, get(health_check))
}
