//! Resolver configuration.

use serde::{Deserialize, Serialize};

use crate::matching::DEFAULT_SCORE_CUTOFF;
use crate::retry::RetryPolicy;

/// ISIN->LEI bulk mapping metadata endpoint.
pub const DEFAULT_ISIN_LEI_URL: &str = "https://mapping.gleif.org/api/v2/isin-lei/latest";

/// Entity name autocompletion endpoint.
pub const DEFAULT_AUTOCOMPLETIONS_URL: &str = "https://api.gleif.org/api/v1/autocompletions";

/// LEI records endpoint, used for active-status filtering and parent lookups.
pub const DEFAULT_LEI_RECORDS_URL: &str = "https://api.gleif.org/api/v1/lei-records";

/// Default cache key for the bulk index.
pub const DEFAULT_INDEX_CACHE_KEY: &str = "gleif";

/// Default namespace for per-name lookup results.
pub const DEFAULT_NAME_CACHE_NAMESPACE: &str = "gleif_names";

/// Configuration for [`LeiResolver`](crate::LeiResolver).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GleifConfig {
    pub isin_lei_url: String,
    pub autocompletions_url: String,
    pub lei_records_url: String,

    /// Cache key for the bulk index. `None` disables index persistence.
    pub index_cache_key: Option<String>,

    /// Prefix for per-name cache keys.
    pub name_cache_namespace: String,

    /// Retry policy for search, active-filter and parent calls.
    pub retry: RetryPolicy,

    /// Concurrent live search sequences allowed per resolver.
    pub api_concurrency: usize,

    /// Candidates scoring at or below this (0-100) are discarded.
    pub score_cutoff: f64,

    /// Per-request timeout in seconds for the default transport.
    pub request_timeout_secs: u64,
}

impl Default for GleifConfig {
    fn default() -> Self {
        Self {
            isin_lei_url: DEFAULT_ISIN_LEI_URL.to_string(),
            autocompletions_url: DEFAULT_AUTOCOMPLETIONS_URL.to_string(),
            lei_records_url: DEFAULT_LEI_RECORDS_URL.to_string(),
            index_cache_key: Some(DEFAULT_INDEX_CACHE_KEY.to_string()),
            name_cache_namespace: DEFAULT_NAME_CACHE_NAMESPACE.to_string(),
            retry: RetryPolicy::default(),
            api_concurrency: 1,
            score_cutoff: DEFAULT_SCORE_CUTOFF,
            request_timeout_secs: 30,
        }
    }
}

impl GleifConfig {
    /// Gate size, never below one slot.
    pub fn effective_api_concurrency(&self) -> usize {
        self.api_concurrency.max(1)
    }

    /// Disable index persistence.
    pub fn without_index_cache(mut self) -> Self {
        self.index_cache_key = None;
        self
    }
}
