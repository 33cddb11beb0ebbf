//! Axum API server for the gateway.

use axum::middleware as axum_mw;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::cache::QueryCache;
use crate::config::ApiConfig;
use crate::error::Result;

/// Shared state for all API handlers.
#[derive(Clone)]
pub struct AppState {
    /// Expected `X-API-Key` value. Empty disables authentication.
    pub api_key: String,
    /// The process-wide query cache, built once by the composition root.
    pub cache: Arc<QueryCache>,
}

impl AppState {
    pub fn new(api_key: String, cache: Arc<QueryCache>) -> Self {
        Self { api_key, cache }
    }
}

/// Build the axum router with all API routes.
pub fn build_router(state: AppState) -> Router {
    let shared_state = Arc::new(state);

    Router::new()
        .route("/health", get(super::routes::health::get_health))
        // Cache administration
        .route(
            "/api/cache",
            axum::routing::delete(super::routes::cache::clear_cache),
        )
        .route(
            "/api/cache/status",
            get(super::routes::cache::get_cache_status),
        )
        .route(
            "/api/cache/entries",
            get(super::routes::cache::list_entries),
        )
        .layer(axum_mw::from_fn_with_state(
            shared_state.clone(),
            super::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(axum_mw::from_fn(super::middleware::request_id_middleware))
        .with_state(shared_state)
}

/// Start the API server and run until Ctrl-C.
pub async fn start_server(config: &ApiConfig, state: AppState) -> Result<()> {
    let app = build_router(state);
    let addr = format!("{}:{}", config.bind, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        auth = !config.api_key.is_empty(),
        "Gateway API server listening on {addr}"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Gateway API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
