//! Liveness probe for the agent.

use axum::Json;
use axum::extract::State;
use pgerr_collector::COLLECTOR_NAME;
use prometheus::Registry;
use serde_json::{Value, json};

/// GET /health: agent version plus how many metric families are exported.
///
/// `metric_families` stays 0 until the collector has registered its counters.
pub async fn health(State(registry): State<Registry>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "collector": COLLECTOR_NAME,
        "metric_families": registry.gather().len(),
    }))
}
