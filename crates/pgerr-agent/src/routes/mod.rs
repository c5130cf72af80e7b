//! HTTP routes and router builder.

pub mod health;
pub mod metrics;

use axum::Router;
use axum::routing::get;
use prometheus::Registry;
use tower_http::trace::TraceLayer;

/// Build the router serving `/metrics` from `registry` and `/health`.
pub fn build_router(registry: Registry) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/metrics", get(metrics::metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(registry)
}
