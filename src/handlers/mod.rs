//! HTTP endpoint handlers for the exporter.
//!
//! This module provides handlers for all HTTP endpoints:
//! - `/`: Landing page
//! - `/probe`: Single probe against a JSON target
//! - `/metrics`: Exporter self-observability metrics
//! - `/health`: Health check endpoint

pub mod health;
pub mod metrics;
pub mod probe;
pub mod root;

use axum::{routing::get, Router};

use crate::state::SharedState;

// Re-export handlers
pub use health::health_handler;
pub use metrics::metrics_handler;
pub use probe::probe_handler;
pub use root::root_handler;

/// Builds the HTTP routing table.
pub fn router(state: SharedState) -> Router {
    let mut app = Router::new()
        .route("/", get(root_handler))
        .route("/probe", get(probe_handler))
        .route("/metrics", get(metrics_handler));

    if state.config.enable_health.unwrap_or(true) {
        app = app.route("/health", get(health_handler));
    }

    app.with_state(state)
}
