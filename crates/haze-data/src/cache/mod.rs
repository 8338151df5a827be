//! Caching layer for loaded series.

pub mod sqlite;

pub use sqlite::{CACHE_TTL_SECS, CacheStats, ProviderKind, SqliteCache};
