//! Annygate: a gateway over web-analytics, search-performance and
//! tag-management APIs, fronted by a shared in-memory query cache.
//!
//! The composition root builds one [`cache::QueryCache`] from
//! [`config::CacheConfig`] and passes it, behind an `Arc`, to every caller
//! that needs it.

pub mod api;
pub mod cache;
pub mod config;
pub mod date_range;
pub mod error;
pub mod logging;

pub use cache::{CacheStatus, QueryCache};
pub use config::Config;
pub use error::{GatewayError, Result};
