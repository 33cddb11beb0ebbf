//! Shared query cache with TTL expiry and least-recently-accessed eviction.
//!
//! One instance is built at startup and handed to every caller behind an
//! `Arc`. All operations run under a single mutex held for the whole
//! operation; nothing in here performs I/O, so critical sections are short.
//! Callers must never hold a cache operation open across a vendor API call:
//! see [`super::fetch::get_or_fetch`].

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::CacheConfig;

/// A single cached result.
#[derive(Debug, Clone)]
struct CacheEntry {
    result: Value,
    /// Query type that produced the entry (diagnostics only).
    api: String,
    /// Human-readable description of the query (diagnostics only).
    summary: String,
    created_at: Instant,
    /// Refreshed on every hit. Never earlier than `created_at`.
    last_accessed_at: Instant,
    /// Position in the global access order; breaks `last_accessed_at` ties.
    access_tick: u64,
    hit_count: u32,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.created_at) > ttl
    }
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    next_tick: u64,
}

impl CacheState {
    fn tick(&mut self) -> u64 {
        let tick = self.next_tick;
        self.next_tick = self.next_tick.wrapping_add(1);
        tick
    }

    fn evict_lru(&mut self) {
        if let Some(lru_key) = self
            .entries
            .iter()
            .min_by_key(|(_, e)| (e.last_accessed_at, e.access_tick))
            .map(|(k, _)| k.clone())
        {
            debug!(key = %short(&lru_key), "Evicting least-recently-accessed cache entry");
            self.entries.remove(&lru_key);
        }
    }
}

/// Read-only snapshot returned by [`QueryCache::status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStatus {
    /// Entries currently held, expired or not.
    pub total_entries: usize,
    /// Entries still within their TTL.
    pub active_entries: usize,
    pub max_entries: usize,
    pub ttl_seconds: u64,
}

/// Diagnostic view of one entry, returned by [`QueryCache::entries`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryInfo {
    pub key: String,
    pub api: String,
    pub summary: String,
    pub age_secs: u64,
    pub idle_secs: u64,
    pub hit_count: u32,
    pub expired: bool,
}

/// In-memory query cache keyed by fingerprint.
#[derive(Debug)]
pub struct QueryCache {
    state: Mutex<CacheState>,
    ttl: Duration,
    max_entries: usize,
}

impl QueryCache {
    /// Create an empty cache. `max_entries` is clamped to a minimum of 1.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            state: Mutex::new(CacheState::default()),
            ttl: Duration::from_secs(config.ttl_secs),
            max_entries: config.max_entries.max(1),
        }
    }

    /// Fingerprint for `api` called with `params`. See [`super::fingerprint`].
    pub fn make_key(api: &str, params: &Value) -> String {
        super::fingerprint::make_key(api, params)
    }

    /// Look up a cached result. Returns `None` if the key is absent or expired.
    ///
    /// Expired entries are removed here; there is no background sweep. A hit
    /// refreshes the entry's access time, which protects it from eviction.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.get_at(key, Instant::now())
    }

    fn get_at(&self, key: &str, now: Instant) -> Option<Value> {
        let mut state = self.lock();
        let expired = state.entries.get(key)?.is_expired(now, self.ttl);
        if expired {
            debug!(key = %short(key), "Cache entry expired, removing");
            state.entries.remove(key);
            return None;
        }

        let tick = state.tick();
        let entry = state.entries.get_mut(key)?;
        entry.last_accessed_at = now;
        entry.access_tick = tick;
        entry.hit_count = entry.hit_count.saturating_add(1);
        Some(entry.result.clone())
    }

    /// Store `result` under `key`.
    ///
    /// Inserting a new key into a full cache first evicts the entry with the
    /// oldest access time. Overwriting an existing key never evicts.
    pub fn put(&self, key: &str, result: Value, api: Option<&str>, summary: Option<&str>) {
        self.put_at(key, result, api, summary, Instant::now());
    }

    fn put_at(
        &self,
        key: &str,
        result: Value,
        api: Option<&str>,
        summary: Option<&str>,
        now: Instant,
    ) {
        let mut state = self.lock();

        if !state.entries.contains_key(key) && state.entries.len() >= self.max_entries {
            state.evict_lru();
        }

        let tick = state.tick();
        state.entries.insert(
            key.to_string(),
            CacheEntry {
                result,
                api: api.unwrap_or_default().to_string(),
                summary: summary.unwrap_or_default().to_string(),
                created_at: now,
                last_accessed_at: now,
                access_tick: tick,
                hit_count: 0,
            },
        );
    }

    /// Remove every entry. Returns how many were removed.
    pub fn clear(&self) -> usize {
        let mut state = self.lock();
        let count = state.entries.len();
        state.entries.clear();
        info!(removed = count, "Cache cleared");
        count
    }

    /// Counts and configuration. Does not touch access times or purge.
    pub fn status(&self) -> CacheStatus {
        self.status_at(Instant::now())
    }

    fn status_at(&self, now: Instant) -> CacheStatus {
        let state = self.lock();
        let active = state
            .entries
            .values()
            .filter(|e| !e.is_expired(now, self.ttl))
            .count();
        CacheStatus {
            total_entries: state.entries.len(),
            active_entries: active,
            max_entries: self.max_entries,
            ttl_seconds: self.ttl.as_secs(),
        }
    }

    /// Per-entry diagnostics, most recently accessed first. Pure read.
    pub fn entries(&self) -> Vec<EntryInfo> {
        let state = self.lock();
        let now = Instant::now();
        let mut rows: Vec<(u64, EntryInfo)> = state
            .entries
            .iter()
            .map(|(key, e)| {
                (
                    e.access_tick,
                    EntryInfo {
                        key: key.clone(),
                        api: e.api.clone(),
                        summary: e.summary.clone(),
                        age_secs: now.saturating_duration_since(e.created_at).as_secs(),
                        idle_secs: now.saturating_duration_since(e.last_accessed_at).as_secs(),
                        hit_count: e.hit_count,
                        expired: e.is_expired(now, self.ttl),
                    },
                )
            })
            .collect();
        rows.sort_by(|a, b| b.0.cmp(&a.0));
        rows.into_iter().map(|(_, info)| info).collect()
    }

    /// Number of entries currently held, expired or not.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    // Every critical section leaves the map consistent, so a poisoned lock
    // is still safe to use.
    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn short(key: &str) -> &str {
    key.get(..8).unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use std::thread;

    fn test_cache(ttl_secs: u64, max_entries: usize) -> QueryCache {
        QueryCache::new(&CacheConfig {
            ttl_secs,
            max_entries,
        })
    }

    fn later(secs: u64) -> Instant {
        Instant::now() + Duration::from_secs(secs)
    }

    #[test]
    fn test_put_and_get() {
        let cache = test_cache(60, 500);
        cache.put("test-key", json!([{"a": 1}]), Some("ga4"), Some("test"));
        assert_eq!(cache.get("test-key"), Some(json!([{"a": 1}])));
    }

    #[test]
    fn test_get_missing_key() {
        let cache = test_cache(3600, 500);
        assert!(cache.get("nonexistent").is_none());
    }

    #[test]
    fn test_ttl_zero_expires_immediately() {
        let cache = test_cache(0, 500);
        cache.put("expires", json!("data"), None, None);
        thread::sleep(Duration::from_millis(5));
        assert!(cache.get("expires").is_none());
    }

    #[test]
    fn test_expired_entry_purged_on_lookup() {
        let cache = test_cache(60, 500);
        cache.put("old", json!(1), None, None);
        assert_eq!(cache.status_at(later(61)).active_entries, 0);
        assert_eq!(cache.len(), 1, "expiry is lazy");
        assert!(cache.get_at("old", later(61)).is_none());
        assert_eq!(cache.len(), 0, "lookup purges the expired entry");
    }

    #[test]
    fn test_entry_within_ttl_is_served() {
        let cache = test_cache(60, 500);
        let t0 = Instant::now();
        cache.put_at("fresh", json!(1), None, None, t0);
        assert_eq!(
            cache.get_at("fresh", t0 + Duration::from_secs(60)),
            Some(json!(1)),
            "an entry exactly at its TTL is still fresh"
        );
        assert!(cache
            .get_at("fresh", t0 + Duration::from_millis(60_001))
            .is_none());
    }

    #[test]
    fn test_eviction_when_full() {
        let cache = test_cache(60, 2);
        cache.put("k1", json!("v1"), None, None);
        cache.put("k2", json!("v2"), None, None);
        cache.put("k3", json!("v3"), None, None);
        assert_eq!(cache.get("k3"), Some(json!("v3")));
        assert_eq!(cache.get("k2"), Some(json!("v2")));
        // k1 was the least recently accessed when k3 arrived
        assert!(cache.get("k1").is_none());
    }

    #[test]
    fn test_read_protects_from_eviction() {
        let cache = test_cache(60, 3);
        cache.put("k1", json!(1), None, None);
        cache.put("k2", json!(2), None, None);
        cache.put("k3", json!(3), None, None);
        assert!(cache.get("k1").is_some());
        cache.put("k4", json!(4), None, None);
        assert_eq!(cache.len(), 3, "exactly one eviction");
        assert!(cache.get("k1").is_some(), "k1 was read, must survive");
        assert!(cache.get("k2").is_none(), "k2 had the oldest access");
        assert!(cache.get("k3").is_some());
        assert!(cache.get("k4").is_some());
    }

    #[test]
    fn test_overwrite_at_capacity_does_not_evict() {
        let cache = test_cache(60, 2);
        cache.put("k1", json!("v1"), None, None);
        cache.put("k2", json!("v2"), None, None);
        cache.put("k1", json!("v1b"), None, None);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("k1"), Some(json!("v1b")));
        assert_eq!(cache.get("k2"), Some(json!("v2")));
    }

    #[test]
    fn test_overwrite_resets_created_at() {
        let cache = test_cache(60, 10);
        let t0 = Instant::now();
        cache.put_at("k", json!(1), None, None, t0);
        cache.put_at("k", json!(2), None, None, t0 + Duration::from_secs(120));
        assert_eq!(
            cache.get_at("k", t0 + Duration::from_secs(150)),
            Some(json!(2))
        );
    }

    #[test]
    fn test_max_entries_zero_clamped() {
        let cache = test_cache(60, 0);
        assert_eq!(cache.max_entries(), 1);
        cache.put("a", json!(1), None, None);
        cache.put("b", json!(2), None, None);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("b"), Some(json!(2)));
    }

    #[test]
    fn test_clear() {
        let cache = test_cache(3600, 500);
        cache.put("k1", json!("v1"), None, None);
        cache.put("k2", json!("v2"), None, None);
        assert_eq!(cache.clear(), 2);
        assert!(cache.get("k1").is_none());
        let status = cache.status();
        assert_eq!(status.total_entries, 0);
        assert_eq!(status.active_entries, 0);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_status() {
        let cache = test_cache(3600, 500);
        cache.put("k1", json!("v1"), None, None);
        assert_eq!(
            cache.status(),
            CacheStatus {
                total_entries: 1,
                active_entries: 1,
                max_entries: 500,
                ttl_seconds: 3600,
            }
        );
    }

    #[test]
    fn test_status_counts_expired_separately_and_is_pure() {
        let cache = test_cache(60, 10);
        let t0 = Instant::now();
        cache.put_at("stale", json!(2), None, None, t0);
        cache.put_at("live", json!(1), None, None, t0 + Duration::from_secs(90));

        let at = t0 + Duration::from_secs(100);
        let first = cache.status_at(at);
        assert_eq!(first.total_entries, 2);
        assert_eq!(first.active_entries, 1);
        for _ in 0..3 {
            assert_eq!(cache.status_at(at), first);
        }
        assert_eq!(cache.len(), 2, "status must not purge");

        let before = cache.lock().entries.get("live").unwrap().last_accessed_at;
        let _ = cache.status_at(at);
        let after = cache.lock().entries.get("live").unwrap().last_accessed_at;
        assert_eq!(before, after, "status must not touch access times");
    }

    #[test]
    fn test_status_serializes_with_snake_case_fields() {
        let cache = test_cache(3600, 500);
        let body = serde_json::to_value(cache.status()).unwrap();
        assert_eq!(
            body,
            json!({"total_entries": 0, "active_entries": 0, "max_entries": 500, "ttl_seconds": 3600})
        );
    }

    #[test]
    fn test_last_accessed_never_before_created() {
        let cache = test_cache(60, 10);
        cache.put("k", json!(1), None, None);
        let _ = cache.get("k");
        let state = cache.lock();
        let entry = state.entries.get("k").unwrap();
        assert!(entry.last_accessed_at >= entry.created_at);
    }

    #[test]
    fn test_hit_count_and_labels() {
        let cache = test_cache(60, 10);
        cache.put("k", json!(1), Some("ga4"), Some("top_pages"));
        let _ = cache.get("k");
        let _ = cache.get("k");
        let rows = cache.entries();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].api, "ga4");
        assert_eq!(rows[0].summary, "top_pages");
        assert_eq!(rows[0].hit_count, 2);
        assert!(!rows[0].expired);
    }

    #[test]
    fn test_entries_most_recent_first() {
        let cache = test_cache(60, 10);
        cache.put("a", json!(1), None, None);
        cache.put("b", json!(2), None, None);
        let _ = cache.get("a");
        let keys: Vec<String> = cache.entries().into_iter().map(|e| e.key).collect();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_make_key_delegates_to_fingerprint() {
        let params = json!({"metrics": "sessions", "date": "last_7_days"});
        assert_eq!(
            QueryCache::make_key("ga4", &params),
            super::super::fingerprint::make_key("ga4", &params)
        );
    }

    #[test]
    fn test_thread_safety() {
        let cache = Arc::new(test_cache(60, 1000));
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for i in 0..50 {
                        cache.put(&format!("k-{t}-{i}"), json!(format!("v-{t}-{i}")), None, None);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.status().total_entries, 200);
        for t in 0..4 {
            for i in 0..50 {
                assert_eq!(
                    cache.get(&format!("k-{t}-{i}")),
                    Some(json!(format!("v-{t}-{i}")))
                );
            }
        }
    }

    #[test]
    fn test_concurrent_mixed_operations_respect_capacity() {
        let cache = Arc::new(test_cache(60, 16));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for i in 0..200 {
                        let key = format!("k-{}", (t * 7 + i) % 40);
                        if i % 3 == 0 {
                            let _ = cache.get(&key);
                        } else {
                            cache.put(&key, json!(i), None, None);
                        }
                        assert!(cache.status().total_entries <= 16);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(cache.len() <= 16);
    }
}
