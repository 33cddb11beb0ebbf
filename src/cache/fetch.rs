//! Fetch-through helper used by report services.
//!
//! The cache lock is only taken inside [`QueryCache::get`] and
//! [`QueryCache::put`]; the vendor call is awaited between them with no lock
//! held. Concurrent misses on the same fingerprint each run their own fetch
//! and the last `put` wins.

use std::future::Future;

use serde_json::Value;
use tracing::debug;

use super::QueryCache;

/// Return the cached value for `key`, or run `fetch` and cache its result.
///
/// `fetch` is only polled on a miss. Errors are propagated and never cached.
pub async fn get_or_fetch<F, E>(
    cache: &QueryCache,
    key: &str,
    api: &str,
    summary: &str,
    fetch: F,
) -> Result<Value, E>
where
    F: Future<Output = Result<Value, E>>,
{
    if let Some(hit) = cache.get(key) {
        debug!(api, summary, "Query cache hit");
        return Ok(hit);
    }

    debug!(api, summary, "Query cache miss, fetching");
    let result = fetch.await?;
    cache.put(key, result.clone(), Some(api), Some(summary));
    Ok(result)
}
