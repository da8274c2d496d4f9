//! In-process cache store.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use log::warn;
use serde_json::Value;

use super::CacheStore;
use crate::errors::CacheError;

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    stored_at: Instant,
}

/// Thread-safe in-memory store with an optional time-to-live.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
    ttl: Option<Duration>,
}

impl MemoryCache {
    /// Store without expiry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose entries expire `ttl` after being written.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl: Some(ttl),
        }
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_entries().is_empty()
    }

    fn lock_entries(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            warn!("Memory cache mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn is_expired(&self, entry: &Entry) -> bool {
        self.ttl
            .is_some_and(|ttl| entry.stored_at.elapsed() >= ttl)
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let mut entries = self.lock_entries();

        match entries.get(key) {
            Some(entry) if self.is_expired(entry) => {
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, value: Value) -> Result<(), CacheError> {
        self.lock_entries().insert(
            key.to_string(),
            Entry {
                value,
                stored_at: Instant::now(),
            },
        );
        Ok(())
    }
}
