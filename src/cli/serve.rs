//! `annygate serve` — build the shared cache and run the REST server.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use annygate::api::{start_server, AppState};
use annygate::cache::QueryCache;
use annygate::config::Config;

pub(crate) async fn cmd_serve(
    mut config: Config,
    port: Option<u16>,
    bind: Option<String>,
) -> Result<()> {
    if let Some(port) = port {
        config.api.port = port;
    }
    if let Some(bind) = bind {
        config.api.bind = bind;
    }

    // The one cache instance for this process.
    let cache = Arc::new(QueryCache::new(&config.cache));
    info!(
        ttl_secs = config.cache.ttl_secs,
        max_entries = cache.max_entries(),
        "Query cache ready"
    );

    let state = AppState::new(config.api.api_key.clone(), cache);
    start_server(&config.api, state)
        .await
        .with_context(|| format!("serving on {}:{}", config.api.bind, config.api.port))
}
