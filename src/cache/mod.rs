//! Query result caching: fingerprints, the shared TTL/LRU store, and the
//! fetch-through helper callers use around vendor API calls.

pub mod fetch;
pub mod fingerprint;
pub mod query_cache;

pub use fetch::get_or_fetch;
pub use fingerprint::make_key;
pub use query_cache::{CacheStatus, EntryInfo, QueryCache};
