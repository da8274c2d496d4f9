//! Three-tier LEI resolution.
//!
//! Each query walks the tiers in order and stops at the first answer:
//!
//! 1. **ISIN index**: only when the query carries an ISIN. The bulk index is
//!    loaded lazily on first use (cache first, then download) and at most
//!    once per resolver.
//! 2. **Name cache**: a stored [`NameMatch`] for the normalized name.
//!    `NotFound` is a definitive miss and skips the network.
//! 3. **Registry search**: autocomplete, active filter, ranking and parent
//!    traversal, all under the admission gate. The outcome is cached.

mod trace;

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use log::{debug, error, info, warn};
use tokio::sync::{OnceCell, Semaphore};

use crate::api::GleifClient;
use crate::cache::{self, name_cache_key, CacheStore, MemoryCache};
use crate::config::GleifConfig;
use crate::errors::GleifError;
use crate::http::{HttpTransport, ReqwestTransport};
use crate::index::BulkIndexBuilder;
use crate::matching::{rank_candidates, select_best_parent, strip_corporate_suffix};
use crate::models::{IdentifierQuery, IsinIndex, NameMatch, ResolutionSource, ResolvedIdentity};

pub use trace::SearchTrace;

/// Outcome of the one-shot index initialization.
enum IndexState {
    Loaded(Arc<IsinIndex>),
    Unavailable,
}

/// Resolves equities to LEIs.
///
/// Safe to share between tasks; all methods take `&self`.
pub struct LeiResolver {
    client: GleifClient,
    builder: BulkIndexBuilder,
    cache: Arc<dyn CacheStore>,
    config: Arc<GleifConfig>,
    index: OnceCell<IndexState>,
    gate: Semaphore,
}

impl LeiResolver {
    /// Create a resolver over the given transport and cache.
    pub fn new(
        config: GleifConfig,
        transport: Arc<dyn HttpTransport>,
        cache: Arc<dyn CacheStore>,
    ) -> Self {
        let config = Arc::new(config);
        let client = GleifClient::new(transport, Arc::clone(&config));

        Self {
            builder: BulkIndexBuilder::new(client.clone()),
            client,
            cache,
            gate: Semaphore::new(config.effective_api_concurrency()),
            config,
            index: OnceCell::new(),
        }
    }

    /// Create a resolver using `reqwest` with the configured timeout.
    pub fn with_reqwest(config: GleifConfig, cache: Arc<dyn CacheStore>) -> Self {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let transport = Arc::new(ReqwestTransport::new(Some(timeout)));
        Self::new(config, transport, cache)
    }

    /// Resolver with default configuration and an in-memory cache.
    pub fn in_memory(transport: Arc<dyn HttpTransport>) -> Self {
        Self::new(
            GleifConfig::default(),
            transport,
            Arc::new(MemoryCache::new()),
        )
    }

    /// Use a ready-made index instead of loading one.
    pub fn with_index(mut self, index: IsinIndex) -> Self {
        let state = if index.is_empty() {
            IndexState::Unavailable
        } else {
            IndexState::Loaded(Arc::new(index))
        };
        self.index = OnceCell::new_with(Some(state));
        self
    }

    pub fn config(&self) -> &GleifConfig {
        &self.config
    }

    /// Resolve one equity.
    pub async fn resolve(
        &self,
        symbol: &str,
        name: &str,
        isin: Option<&str>,
    ) -> Result<ResolvedIdentity, GleifError> {
        let mut query = IdentifierQuery::new(symbol, name);
        query.isin = isin.map(str::to_string);
        self.resolve_query(&query).await
    }

    /// Resolve one equity from a query record.
    ///
    /// Returns [`GleifError::LeiNotFound`] when every tier comes up empty.
    pub async fn resolve_query(
        &self,
        query: &IdentifierQuery,
    ) -> Result<ResolvedIdentity, GleifError> {
        if let Some(isin) = query.normalized_isin() {
            if let Some(index) = self.index().await {
                if let Some(lei) = index.get(&isin) {
                    debug!("ISIN {} resolved from bulk index", isin);
                    return Ok(ResolvedIdentity::from_query(
                        query,
                        lei.to_string(),
                        ResolutionSource::IsinIndex,
                    ));
                }
                debug!("ISIN {} not in bulk index, falling back to name", isin);
            }
        }

        let key = name_cache_key(&self.config.name_cache_namespace, &query.name);
        if let Some(cached) = cache::load::<NameMatch>(self.cache.as_ref(), &key).await {
            return cached_outcome(query, cached);
        }

        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| GleifError::GateClosed)?;

        // Another task may have answered this name while we waited.
        if let Some(cached) = cache::load::<NameMatch>(self.cache.as_ref(), &key).await {
            return cached_outcome(query, cached);
        }

        let trace = self.search(&query.name).await;
        let outcome = NameMatch::from_lei(trace.lei);
        cache::store(self.cache.as_ref(), &key, &outcome).await;

        match outcome {
            NameMatch::Found(lei) => {
                info!("Resolved '{}' to {} via registry search", query.name, lei);
                Ok(ResolvedIdentity::from_query(
                    query,
                    lei,
                    ResolutionSource::RegistrySearch,
                ))
            }
            NameMatch::NotFound => {
                warn!("No LEI found for '{}'", query.name);
                Err(GleifError::not_found(&query.name, query.isin.as_deref()))
            }
        }
    }

    /// Resolve many queries concurrently.
    ///
    /// Results are returned in input order; a failure affects only its own
    /// slot.
    pub async fn resolve_all(
        &self,
        queries: &[IdentifierQuery],
    ) -> Vec<Result<ResolvedIdentity, GleifError>> {
        join_all(queries.iter().map(|query| self.resolve_query(query))).await
    }

    /// Run the live search for `name` and report each step.
    ///
    /// Bypasses the name cache in both directions but still goes through the
    /// admission gate.
    pub async fn explain(&self, name: &str) -> Result<SearchTrace, GleifError> {
        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| GleifError::GateClosed)?;
        Ok(self.search(name).await)
    }

    /// The bulk index, loading it on first call.
    ///
    /// Returns `None` when no index could be obtained.
    pub async fn index(&self) -> Option<Arc<IsinIndex>> {
        let state = self.index.get_or_init(|| self.load_index()).await;
        match state {
            IndexState::Loaded(index) => Some(Arc::clone(index)),
            IndexState::Unavailable => None,
        }
    }

    async fn load_index(&self) -> IndexState {
        let cache_key = self.config.index_cache_key.as_deref();

        if let Some(key) = cache_key {
            if let Some(index) = cache::load::<IsinIndex>(self.cache.as_ref(), key).await {
                if !index.is_empty() {
                    info!("Loaded ISIN->LEI index from cache ({} entries)", index.len());
                    return IndexState::Loaded(Arc::new(index));
                }
            }
        }

        let index = match self.builder.build().await {
            Ok(index) => index,
            Err(e) => {
                error!("ISIN->LEI index unavailable, using name search only: {}", e);
                return IndexState::Unavailable;
            }
        };

        if index.is_empty() {
            warn!("ISIN->LEI archive produced no entries, using name search only");
            return IndexState::Unavailable;
        }

        if let Some(key) = cache_key {
            cache::store(self.cache.as_ref(), key, &index).await;
        }
        IndexState::Loaded(Arc::new(index))
    }

    /// Search, rank, and prefer the best candidate's parent.
    async fn search(&self, name: &str) -> SearchTrace {
        let mut trace = SearchTrace::new(name, strip_corporate_suffix(name));
        if name.trim().is_empty() {
            return trace;
        }

        trace.candidates = self.client.search_by_name(name).await;
        trace.ranked = rank_candidates(name, &trace.candidates, self.config.score_cutoff);

        let Some(best) = trace.best().cloned() else {
            debug!(
                "No candidate for '{}' above cutoff ({} returned)",
                name,
                trace.candidates.len()
            );
            return trace;
        };

        trace.parents = self.client.fetch_parents(&best.lei).await;
        trace.chosen_parent = select_best_parent(name, &trace.parents).cloned();

        trace.lei = Some(match &trace.chosen_parent {
            Some(parent) => {
                debug!(
                    "Using parent '{}' of '{}' for '{}'",
                    parent.legal_name, best.legal_name, name
                );
                parent.lei.clone()
            }
            None => best.lei,
        });
        trace
    }
}

fn cached_outcome(
    query: &IdentifierQuery,
    cached: NameMatch,
) -> Result<ResolvedIdentity, GleifError> {
    match cached {
        NameMatch::Found(lei) => {
            debug!("'{}' resolved from name cache", query.name);
            Ok(ResolvedIdentity::from_query(
                query,
                lei,
                ResolutionSource::NameCache,
            ))
        }
        NameMatch::NotFound => {
            debug!("'{}' cached as not found", query.name);
            Err(GleifError::not_found(&query.name, query.isin.as_deref()))
        }
    }
}

impl std::fmt::Debug for LeiResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeiResolver")
            .field("config", &self.config)
            .field(
                "index_loaded",
                &matches!(self.index.get(), Some(IndexState::Loaded(_))),
            )
            .field("available_permits", &self.gate.available_permits())
            .finish_non_exhaustive()
    }
}
