//! Health endpoint.

use axum::Json;
use serde_json::{json, Value};

/// GET /health — liveness probe, no auth required.
pub async fn get_health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
