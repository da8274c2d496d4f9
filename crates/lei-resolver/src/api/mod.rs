//! GLEIF REST API client.
//!
//! Three endpoints are used:
//! - autocompletions, for fuzzy name search
//! - lei-records, for active-status filtering and ownership (parent) lookups
//! - the isin-lei mapping metadata, for locating the bulk archive
//!
//! Search and parent calls share one retry loop: transient statuses
//! (429, 502, 503, 504) are retried with exponential backoff, everything
//! else ends the loop. Failures are logged and degrade to an empty result
//! so a single bad lookup never aborts a batch.

mod payloads;

use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, error, warn};

use crate::config::GleifConfig;
use crate::errors::{GleifError, RetryClass};
use crate::http::{HttpResponse, HttpTransport};
use crate::matching::strip_corporate_suffix;
use crate::models::{ArchiveMetadata, EntityCandidate};

use payloads::{parse_autocompletions, parse_lei_ids, parse_lei_records, parse_metadata};

type Parser<T> = fn(&HttpResponse) -> Result<Vec<T>, GleifError>;

/// Thin client over the GLEIF endpoints.
#[derive(Clone)]
pub struct GleifClient {
    transport: Arc<dyn HttpTransport>,
    config: Arc<GleifConfig>,
}

impl GleifClient {
    pub fn new(transport: Arc<dyn HttpTransport>, config: Arc<GleifConfig>) -> Self {
        Self { transport, config }
    }

    pub fn transport(&self) -> &Arc<dyn HttpTransport> {
        &self.transport
    }

    pub fn config(&self) -> &GleifConfig {
        &self.config
    }

    /// Search the registry for active entities matching an equity name.
    ///
    /// Corporate suffixes are stripped before querying. Returns `(legal_name,
    /// lei)` candidates in API order, restricted to ACTIVE entities.
    pub async fn search_by_name(&self, name: &str) -> Vec<EntityCandidate> {
        let query = strip_corporate_suffix(name);
        debug!("GLEIF search for '{}' (query '{}')", name, query);

        let candidates = self
            .fetch_with_retry(
                &self.config.autocompletions_url,
                &[("field", "fulltext"), ("q", query.as_str())],
                parse_autocompletions,
            )
            .await;

        self.filter_active(candidates).await
    }

    /// Keep only candidates whose LEI is reported ACTIVE, preserving order.
    async fn filter_active(&self, candidates: Vec<EntityCandidate>) -> Vec<EntityCandidate> {
        if candidates.is_empty() {
            return candidates;
        }

        let leis = candidates
            .iter()
            .map(|c| c.lei.as_str())
            .collect::<Vec<_>>()
            .join(",");

        let active: HashSet<String> = self
            .fetch_with_retry(
                &self.config.lei_records_url,
                &[
                    ("filter[lei]", leis.as_str()),
                    ("filter[entity.status]", "ACTIVE"),
                ],
                parse_lei_ids,
            )
            .await
            .into_iter()
            .collect();

        candidates
            .into_iter()
            .filter(|c| active.contains(&c.lei))
            .collect()
    }

    /// Fetch the entities that own `lei`.
    pub async fn fetch_parents(&self, lei: &str) -> Vec<EntityCandidate> {
        self.fetch_with_retry(
            &self.config.lei_records_url,
            &[("filter[owns]", lei)],
            parse_lei_records,
        )
        .await
    }

    /// Fetch the bulk mapping metadata. Single attempt, no retry.
    pub async fn fetch_metadata(&self) -> Option<ArchiveMetadata> {
        match self.try_fetch_metadata().await {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                error!("Failed to fetch GLEIF ISIN->LEI metadata: {}", e);
                None
            }
        }
    }

    pub(crate) async fn try_fetch_metadata(&self) -> Result<ArchiveMetadata, GleifError> {
        let url = &self.config.isin_lei_url;
        let response = self
            .transport
            .get(url, &[])
            .await
            .map_err(|e| GleifError::MetadataUnavailable(e.to_string()))?;

        if !response.is_success() {
            return Err(GleifError::HttpStatus {
                status: response.status,
                url: url.clone(),
            });
        }

        parse_metadata(&response)
    }

    /// GET with retry on transient statuses.
    ///
    /// The first attempt runs immediately; each retry waits for the next
    /// backoff delay. Transport errors, non-retryable statuses, exhausted
    /// retries and unparseable bodies all produce an empty result.
    async fn fetch_with_retry<T>(
        &self,
        url: &str,
        params: &[(&str, &str)],
        parser: Parser<T>,
    ) -> Vec<T> {
        let schedule = self.config.retry.schedule();
        let total = schedule.len();
        let mut outcome: Option<HttpResponse> = None;

        for (attempt, delay) in schedule.into_iter().enumerate() {
            if !delay.is_zero() {
                debug!(
                    "Retrying {} in {:.2}s (attempt {}/{})",
                    url,
                    delay.as_secs_f64(),
                    attempt + 1,
                    total
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self.transport.get(url, params).await {
                Ok(response) => response,
                Err(e) => {
                    error!("GLEIF request to {} failed: {}", url, e);
                    return Vec::new();
                }
            };

            match RetryClass::for_status(response.status) {
                RetryClass::WithBackoff => {
                    warn!("GLEIF returned {} for {}", response.status, url);
                }
                RetryClass::Success | RetryClass::Never => {
                    outcome = Some(response);
                    break;
                }
            }
        }

        let Some(response) = outcome else {
            error!("GLEIF retries exhausted for {}", url);
            return Vec::new();
        };

        if !response.is_success() {
            error!("GLEIF returned {} for {}, giving up", response.status, url);
            return Vec::new();
        }

        match parser(&response) {
            Ok(items) => items,
            Err(e) => {
                error!("Failed to parse GLEIF response from {}: {}", url, e);
                Vec::new()
            }
        }
    }
}

impl std::fmt::Debug for GleifClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GleifClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::RetryPolicy;
    use async_trait::async_trait;
    use serde_json::json;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    type Handler = dyn Fn(&str, &[(&str, &str)]) -> Result<HttpResponse, GleifError> + Send + Sync;

    /// Transport answering from a closure and recording every request.
    struct MockTransport {
        handler: Box<Handler>,
        calls: AtomicUsize,
        requests: Mutex<Vec<(String, Vec<(String, String)>)>>,
    }

    impl MockTransport {
        fn new(
            handler: impl Fn(&str, &[(&str, &str)]) -> Result<HttpResponse, GleifError>
                + Send
                + Sync
                + 'static,
        ) -> Self {
            Self {
                handler: Box::new(handler),
                calls: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl HttpTransport for MockTransport {
        async fn get(
            &self,
            url: &str,
            params: &[(&str, &str)],
        ) -> Result<HttpResponse, GleifError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push((
                url.to_string(),
                params
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ));
            (self.handler)(url, params)
        }

        async fn download(&self, url: &str, _destination: &Path) -> Result<u64, GleifError> {
            Err(GleifError::Transport {
                message: format!("unexpected download of {}", url),
            })
        }
    }

    fn ok(value: serde_json::Value) -> Result<HttpResponse, GleifError> {
        Ok(HttpResponse::new(200, serde_json::to_vec(&value).unwrap()))
    }

    fn status(code: u16) -> Result<HttpResponse, GleifError> {
        Ok(HttpResponse::new(code, Vec::new()))
    }

    fn fast_config() -> Arc<GleifConfig> {
        Arc::new(GleifConfig {
            retry: RetryPolicy {
                attempts: 3,
                base_secs: 0.001,
                cap_secs: 0.004,
                jitter: 0.0,
                seed: Some(7),
            },
            ..GleifConfig::default()
        })
    }

    fn client(transport: Arc<MockTransport>) -> GleifClient {
        GleifClient::new(transport, fast_config())
    }

    fn param<'a>(params: &'a [(&str, &str)], key: &str) -> Option<&'a str> {
        params.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }

    #[tokio::test]
    async fn test_search_by_name_filters_inactive() {
        let transport = Arc::new(MockTransport::new(|url, params| {
            if url.ends_with("autocompletions") {
                assert_eq!(param(params, "field"), Some("fulltext"));
                assert_eq!(param(params, "q"), Some("Apple"));
                ok(json!({"data": [
                    {"attributes": {"value": "Apple Inc."},
                     "relationships": {"lei-records": {"data": {"id": "ACTIVE_LEI"}}}},
                    {"attributes": {"value": "Apple Retired Inc."},
                     "relationships": {"lei-records": {"data": {"id": "LAPSED_LEI"}}}}
                ]}))
            } else {
                assert_eq!(param(params, "filter[lei]"), Some("ACTIVE_LEI,LAPSED_LEI"));
                assert_eq!(param(params, "filter[entity.status]"), Some("ACTIVE"));
                ok(json!({"data": [{"id": "ACTIVE_LEI"}]}))
            }
        }));

        let candidates = client(transport.clone()).search_by_name("Apple Inc.").await;

        assert_eq!(candidates, vec![EntityCandidate::new("Apple Inc.", "ACTIVE_LEI")]);
        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test]
    async fn test_search_without_candidates_skips_filter_call() {
        let transport = Arc::new(MockTransport::new(|_, _| ok(json!({"data": []}))));

        let candidates = client(transport.clone()).search_by_name("Nothing Ltd").await;

        assert!(candidates.is_empty());
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_retry_on_transient_status_then_success() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let seen = attempts.clone();
        let transport = Arc::new(MockTransport::new(move |_, _| {
            if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                status(503)
            } else {
                ok(json!({"data": [{"id": "PARENT_LEI",
                    "attributes": {"entity": {"legalName": {"name": "Parent AG"}}}}]}))
            }
        }));

        let parents = client(transport.clone()).fetch_parents("CHILD_LEI").await;

        assert_eq!(parents, vec![EntityCandidate::new("Parent AG", "PARENT_LEI")]);
        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test]
    async fn test_non_retryable_status_aborts_immediately() {
        let transport = Arc::new(MockTransport::new(|_, _| status(404)));

        let parents = client(transport.clone()).fetch_parents("CHILD_LEI").await;

        assert!(parents.is_empty());
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_retries_exhausted_returns_empty() {
        let transport = Arc::new(MockTransport::new(|_, _| status(429)));

        let parents = client(transport.clone()).fetch_parents("CHILD_LEI").await;

        assert!(parents.is_empty());
        // first attempt plus three retries
        assert_eq!(transport.call_count(), 4);
    }

    #[tokio::test]
    async fn test_transport_error_returns_empty_without_retry() {
        let transport = Arc::new(MockTransport::new(|url, _| {
            Err(GleifError::Timeout {
                url: url.to_string(),
            })
        }));

        let parents = client(transport.clone()).fetch_parents("CHILD_LEI").await;

        assert!(parents.is_empty());
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_malformed_body_returns_empty() {
        let transport = Arc::new(MockTransport::new(|_, _| {
            Ok(HttpResponse::new(200, b"not json".to_vec()))
        }));

        assert!(client(transport).fetch_parents("CHILD_LEI").await.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_parents_uses_owns_filter() {
        let transport = Arc::new(MockTransport::new(|_, _| ok(json!({"data": []}))));

        client(transport.clone()).fetch_parents("CHILD_LEI").await;

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests[0].0, crate::config::DEFAULT_LEI_RECORDS_URL);
        assert_eq!(
            requests[0].1,
            vec![("filter[owns]".to_string(), "CHILD_LEI".to_string())]
        );
    }

    #[tokio::test]
    async fn test_fetch_metadata() {
        let transport = Arc::new(MockTransport::new(|_, _| {
            ok(json!({"data": {"id": "abc", "attributes": {
                "fileName": "isin_lei.zip", "downloadLink": "https://example.test/isin_lei.zip"}}}))
        }));

        let metadata = client(transport).fetch_metadata().await.unwrap();

        assert_eq!(
            metadata.download_link.as_deref(),
            Some("https://example.test/isin_lei.zip")
        );
    }

    #[tokio::test]
    async fn test_fetch_metadata_failure_is_none_and_not_retried() {
        let transport = Arc::new(MockTransport::new(|_, _| status(503)));

        let client = client(transport.clone());
        assert!(client.fetch_metadata().await.is_none());
        assert_eq!(transport.call_count(), 1);

        let err = client.try_fetch_metadata().await.unwrap_err();
        assert!(matches!(err, GleifError::HttpStatus { status: 503, .. }));
    }
}
