//! Cache administration routes.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::api::server::AppState;
use crate::cache::CacheStatus;

/// GET /api/cache/status — entry counts and cache configuration.
pub async fn get_cache_status(State(state): State<Arc<AppState>>) -> Json<CacheStatus> {
    Json(state.cache.status())
}

/// DELETE /api/cache — drop every cached result.
pub async fn clear_cache(State(state): State<Arc<AppState>>) -> Json<Value> {
    let cleared = state.cache.clear();
    Json(json!({ "cleared": cleared }))
}

/// GET /api/cache/entries — per-entry diagnostics, most recent first.
pub async fn list_entries(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({ "entries": state.cache.entries() }))
}
