use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns a status object with service version and current catalog size.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let aggregator = state.aggregator.read().await;
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "jobmatch-api",
        "catalog_size": aggregator.jobs().len(),
        "sources": aggregator.sources().len(),
    }))
}
