//! Directory-backed cache store.
//!
//! Each key maps to `<dir>/<sha256(key)>.json` holding the value and the time
//! it was written. Writes go to a temporary sibling first and are renamed into
//! place, so a reader never sees a half-written entry.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::CacheStore;
use crate::errors::CacheError;

/// Environment variable naming the cache directory.
pub const CACHE_DIR_ENV: &str = "CACHE_DIR";

/// Environment variable holding the entry lifetime in minutes (0 = never expire).
pub const CACHE_TTL_ENV: &str = "CACHE_TTL_MINUTES";

const DEFAULT_CACHE_DIR: &str = "./data/cache";
const DEFAULT_TTL_MINUTES: u64 = 1440;

#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    stored_at: DateTime<Utc>,
    value: Value,
}

/// Cache persisting one JSON file per key.
#[derive(Clone, Debug)]
pub struct FileCache {
    dir: PathBuf,
    ttl: Option<Duration>,
}

impl FileCache {
    /// Store under `dir` without expiry. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ttl: None,
        }
    }

    /// Set the entry lifetime. `None` keeps entries forever.
    pub fn with_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.ttl = ttl;
        self
    }

    /// Configure from `CACHE_DIR` and `CACHE_TTL_MINUTES`.
    ///
    /// Defaults to `./data/cache` and one day.
    pub fn from_env() -> Result<Self, CacheError> {
        Self::from_settings(
            std::env::var(CACHE_DIR_ENV).ok(),
            std::env::var(CACHE_TTL_ENV).ok(),
        )
    }

    fn from_settings(dir: Option<String>, ttl_minutes: Option<String>) -> Result<Self, CacheError> {
        let dir = dir
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CACHE_DIR.to_string());

        let minutes = match ttl_minutes.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_TTL_MINUTES,
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                CacheError::InvalidConfig(format!(
                    "{} must be a non-negative integer, got '{}'",
                    CACHE_TTL_ENV, raw
                ))
            })?,
        };

        let ttl = (minutes > 0).then(|| Duration::from_secs(minutes.saturating_mul(60)));
        Ok(Self::new(dir).with_ttl(ttl))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let digest = hex::encode(Sha256::digest(key.as_bytes()));
        self.dir.join(format!("{}.json", digest))
    }

    fn is_expired(&self, stored_at: DateTime<Utc>) -> bool {
        let Some(ttl) = self.ttl else {
            return false;
        };
        // A timestamp in the future counts as fresh.
        (Utc::now() - stored_at)
            .to_std()
            .is_ok_and(|age| age >= ttl)
    }
}

#[async_trait]
impl CacheStore for FileCache {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let path = self.path_for(key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let entry: StoredEntry = serde_json::from_slice(&bytes)?;
        if self.is_expired(entry.stored_at) {
            debug!("Cache entry '{}' expired", key);
            return Ok(None);
        }

        Ok(Some(entry.value))
    }

    async fn put(&self, key: &str, value: Value) -> Result<(), CacheError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.path_for(key);
        let staging = path.with_extension(format!("{:016x}.tmp", rand::random::<u64>()));
        let bytes = serde_json::to_vec(&StoredEntry {
            stored_at: Utc::now(),
            value,
        })?;

        tokio::fs::write(&staging, bytes).await?;
        if let Err(e) = tokio::fs::rename(&staging, &path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e.into());
        }
        Ok(())
    }
}
