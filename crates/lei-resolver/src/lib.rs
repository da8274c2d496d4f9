//! Equity LEI Resolver Crate
//!
//! This crate resolves a canonical Legal Entity Identifier (LEI) for equities
//! arriving from market-data feeds with inconsistent or missing identifiers.
//!
//! # Overview
//!
//! Resolution walks three tiers and stops at the first answer:
//! - The GLEIF bulk ISIN->LEI index, loaded lazily and at most once
//! - A per-name cache of earlier search outcomes, including "not found"
//! - A live GLEIF search with fuzzy ranking and parent traversal
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! | IdentifierQuery  |  (symbol, name, isin?)
//! +------------------+
//!          |
//!          v
//! +------------------+     +------------------+
//! |   LeiResolver    | --> |    IsinIndex     |  (bulk archive, cached)
//! +------------------+     +------------------+
//!          |
//!          v
//! +------------------+
//! |   CacheStore     |  (NameMatch per normalized name)
//! +------------------+
//!          |
//!          v
//! +------------------+     +------------------+
//! |   GleifClient    | --> |  HttpTransport   |  (reqwest, retry + backoff)
//! +------------------+     +------------------+
//!          |
//!          v
//! +------------------+
//! | rank / parents   |  (weighted ratio, cutoff, best owner)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! | ResolvedIdentity |  (lei + source tier)
//! +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`LeiResolver`] - Tiered resolution with lazy index and admission gate
//! - [`IdentifierQuery`] / [`ResolvedIdentity`] - Input and output records
//! - [`NameMatch`] - Cached outcome of a name lookup
//! - [`GleifConfig`] - Endpoints, retry policy, gate size and cutoff
//! - [`CacheStore`] - Cache collaborator ([`MemoryCache`], [`FileCache`])
//! - [`HttpTransport`] - HTTP collaborator ([`ReqwestTransport`])
//! - [`GleifError`] - Error type

pub mod api;
pub mod cache;
pub mod config;
pub mod errors;
pub mod http;
pub mod index;
pub mod matching;
pub mod models;
pub mod resolver;
pub mod retry;

pub use api::GleifClient;
pub use cache::{name_cache_key, normalize_name_key, CacheStore, FileCache, MemoryCache};
pub use config::GleifConfig;
pub use errors::{CacheError, GleifError, RetryClass};
pub use http::{HttpResponse, HttpTransport, ReqwestTransport};
pub use index::BulkIndexBuilder;
pub use matching::{
    rank_candidates, select_best_parent, strip_corporate_suffix, weighted_ratio,
    DEFAULT_SCORE_CUTOFF,
};
pub use models::{
    ArchiveMetadata, EntityCandidate, IdentifierQuery, IsinIndex, NameMatch, ResolutionSource,
    ResolvedIdentity, ScoredCandidate,
};
pub use resolver::{LeiResolver, SearchTrace};
pub use retry::{backoff_delays, RetryPolicy};
