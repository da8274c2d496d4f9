//! Key/value cache used for the bulk index and per-name lookup results.
//!
//! The resolver only needs `get` and `put` of JSON values by string key.
//! Two stores are provided:
//! - [`MemoryCache`]: process-local, optional TTL
//! - [`FileCache`]: one JSON file per key under a directory, optional TTL
//!
//! Store failures never abort a resolution. The typed helpers here log them
//! and report a miss.

mod file;
mod memory;

use async_trait::async_trait;
use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::errors::CacheError;

pub use file::FileCache;
pub use memory::MemoryCache;

/// Async key/value store holding JSON values.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch a value. Expired or absent entries return `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError>;

    /// Store a value, replacing any previous one.
    async fn put(&self, key: &str, value: Value) -> Result<(), CacheError>;
}

/// Canonical form of an equity name for cache keys.
///
/// Trims, collapses internal whitespace and upper-cases, so "Apple  Inc."
/// and "apple inc." share one entry.
pub fn normalize_name_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Cache key for a name lookup inside `namespace`.
pub fn name_cache_key(namespace: &str, name: &str) -> String {
    format!("{}:{}", namespace, normalize_name_key(name))
}

/// Read and decode a value. Errors and undecodable values are a miss.
pub(crate) async fn load<T: DeserializeOwned>(cache: &dyn CacheStore, key: &str) -> Option<T> {
    let value = match cache.get(key).await {
        Ok(Some(value)) => value,
        Ok(None) => return None,
        Err(e) => {
            warn!("Cache read failed for '{}': {}", key, e);
            return None;
        }
    };

    match serde_json::from_value(value) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            warn!("Ignoring undecodable cache entry '{}': {}", key, e);
            None
        }
    }
}

/// Encode and write a value. Failures are logged and dropped.
pub(crate) async fn store<T: Serialize + ?Sized>(cache: &dyn CacheStore, key: &str, value: &T) {
    let encoded = match serde_json::to_value(value) {
        Ok(encoded) => encoded,
        Err(e) => {
            warn!("Could not encode cache entry '{}': {}", key, e);
            return;
        }
    };

    if let Err(e) = cache.put(key, encoded).await {
        warn!("Cache write failed for '{}': {}", key, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NameMatch;

    /// Store whose every call fails.
    struct BrokenStore;

    #[async_trait]
    impl CacheStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<Value>, CacheError> {
            Err(CacheError::InvalidConfig("offline".to_string()))
        }

        async fn put(&self, _key: &str, _value: Value) -> Result<(), CacheError> {
            Err(CacheError::InvalidConfig("offline".to_string()))
        }
    }

    #[test]
    fn test_name_keys_are_normalized() {
        assert_eq!(normalize_name_key("  Apple   Inc. "), "APPLE INC.");
        assert_eq!(
            name_cache_key("gleif_names", "apple inc."),
            name_cache_key("gleif_names", "Apple  Inc.")
        );
        assert_eq!(name_cache_key("gleif_names", "Apple"), "gleif_names:APPLE");
    }

    #[tokio::test]
    async fn test_typed_round_trip() {
        let cache = MemoryCache::new();
        store(&cache, "k", &NameMatch::NotFound).await;

        let loaded: Option<NameMatch> = load(&cache, "k").await;
        assert_eq!(loaded, Some(NameMatch::NotFound));
    }

    #[tokio::test]
    async fn test_store_errors_are_a_miss() {
        store(&BrokenStore, "k", &NameMatch::NotFound).await;
        let loaded: Option<NameMatch> = load(&BrokenStore, "k").await;
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_a_miss() {
        let cache = MemoryCache::new();
        cache
            .put("k", serde_json::json!({"unexpected": true}))
            .await
            .unwrap();

        let loaded: Option<NameMatch> = load(&cache, "k").await;
        assert!(loaded.is_none());
    }
}
