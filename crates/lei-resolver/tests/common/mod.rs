//! Shared fixtures: an in-process stand-in for the GLEIF endpoints.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use equity_lei_resolver::config::{
    DEFAULT_AUTOCOMPLETIONS_URL, DEFAULT_ISIN_LEI_URL, DEFAULT_LEI_RECORDS_URL,
};
use equity_lei_resolver::{GleifConfig, GleifError, HttpResponse, HttpTransport, RetryPolicy};
use serde_json::{json, Value};
use zip::write::SimpleFileOptions;

pub const ARCHIVE_LINK: &str = "https://fake.gleif.test/isin_lei.zip";

/// Fake registry serving metadata, archive, search, active filter and parents.
#[derive(Default)]
pub struct FakeRegistry {
    archive: Option<Vec<u8>>,
    completions: HashMap<String, Vec<(String, String)>>,
    inactive: HashSet<String>,
    parents: HashMap<String, Vec<(String, String)>>,
    api_failures: Mutex<VecDeque<u16>>,
    download_delay: Duration,
    api_delay: Duration,

    pub metadata_calls: AtomicUsize,
    pub downloads: AtomicUsize,
    pub searches: AtomicUsize,
    pub api_calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a bulk archive built from `(lei, isin)` rows.
    pub fn with_archive(mut self, rows: &[(&str, &str)]) -> Self {
        self.archive = Some(isin_archive(rows));
        self
    }

    /// Autocompletion results for the (already suffix-stripped) query `q`.
    pub fn with_completions(mut self, q: &str, entities: &[(&str, &str)]) -> Self {
        self.completions.insert(q.to_string(), owned(entities));
        self
    }

    pub fn with_inactive(mut self, lei: &str) -> Self {
        self.inactive.insert(lei.to_string());
        self
    }

    pub fn with_parents(mut self, lei: &str, parents: &[(&str, &str)]) -> Self {
        self.parents.insert(lei.to_string(), owned(parents));
        self
    }

    /// Statuses returned, in order, by the next API calls before normal answers.
    pub fn with_api_failures(self, statuses: &[u16]) -> Self {
        self.api_failures
            .lock()
            .unwrap()
            .extend(statuses.iter().copied());
        self
    }

    pub fn with_download_delay(mut self, delay: Duration) -> Self {
        self.download_delay = delay;
        self
    }

    pub fn with_api_delay(mut self, delay: Duration) -> Self {
        self.api_delay = delay;
        self
    }

    /// Every network interaction, downloads included.
    pub fn total_calls(&self) -> usize {
        self.metadata_calls.load(Ordering::SeqCst)
            + self.downloads.load(Ordering::SeqCst)
            + self.api_calls.load(Ordering::SeqCst)
    }

    fn answer_api(&self, url: &str, params: &[(&str, &str)]) -> Value {
        let param = |key: &str| {
            params
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        };

        if url == DEFAULT_AUTOCOMPLETIONS_URL {
            self.searches.fetch_add(1, Ordering::SeqCst);
            let q = param("q").unwrap_or_default();
            let data: Vec<Value> = self
                .completions
                .get(&q)
                .map(|entities| {
                    entities
                        .iter()
                        .map(|(name, lei)| {
                            json!({
                                "type": "autocompletions",
                                "attributes": {"value": name},
                                "relationships": {"lei-records": {"data": {"type": "lei-records", "id": lei}}}
                            })
                        })
                        .collect()
                })
                .unwrap_or_default();
            return json!({ "data": data });
        }

        if let Some(leis) = param("filter[lei]") {
            assert_eq!(param("filter[entity.status]").as_deref(), Some("ACTIVE"));
            let data: Vec<Value> = leis
                .split(',')
                .filter(|lei| !self.inactive.contains(*lei))
                .map(|lei| json!({"type": "lei-records", "id": lei}))
                .collect();
            return json!({ "data": data });
        }

        if let Some(child) = param("filter[owns]") {
            let data: Vec<Value> = self
                .parents
                .get(&child)
                .map(|parents| {
                    parents
                        .iter()
                        .map(|(name, lei)| {
                            json!({
                                "type": "lei-records",
                                "id": lei,
                                "attributes": {"entity": {"legalName": {"name": name, "language": "en"}}}
                            })
                        })
                        .collect()
                })
                .unwrap_or_default();
            return json!({ "data": data });
        }

        json!({ "data": [] })
    }
}

#[async_trait]
impl HttpTransport for FakeRegistry {
    async fn get(&self, url: &str, params: &[(&str, &str)]) -> Result<HttpResponse, GleifError> {
        if url == DEFAULT_ISIN_LEI_URL {
            self.metadata_calls.fetch_add(1, Ordering::SeqCst);
            return Ok(match self.archive {
                Some(_) => json_response(json!({
                    "data": {
                        "id": "fake-latest",
                        "type": "isin-lei",
                        "attributes": {
                            "fileName": "isin_lei_fake.zip",
                            "uploadedAt": "2025-01-01T06:00:00Z",
                            "downloadLink": ARCHIVE_LINK
                        }
                    }
                })),
                None => HttpResponse::new(404, Vec::new()),
            });
        }

        assert!(
            url == DEFAULT_AUTOCOMPLETIONS_URL || url == DEFAULT_LEI_RECORDS_URL,
            "unexpected url {}",
            url
        );
        self.api_calls.fetch_add(1, Ordering::SeqCst);

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.api_delay.is_zero() {
            tokio::time::sleep(self.api_delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let failure = self.api_failures.lock().unwrap().pop_front();
        if let Some(status) = failure {
            return Ok(HttpResponse::new(status, Vec::new()));
        }

        Ok(json_response(self.answer_api(url, params)))
    }

    async fn download(&self, url: &str, destination: &Path) -> Result<u64, GleifError> {
        assert_eq!(url, ARCHIVE_LINK);
        self.downloads.fetch_add(1, Ordering::SeqCst);

        if !self.download_delay.is_zero() {
            tokio::time::sleep(self.download_delay).await;
        }

        let bytes = self.archive.clone().unwrap_or_default();
        tokio::fs::write(destination, &bytes).await?;
        Ok(bytes.len() as u64)
    }
}

fn owned(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect()
}

fn json_response(value: Value) -> HttpResponse {
    HttpResponse::new(200, serde_json::to_vec(&value).unwrap())
}

/// Zip archive holding one `LEI,ISIN` CSV.
pub fn isin_archive(rows: &[(&str, &str)]) -> Vec<u8> {
    let mut csv = String::from("LEI,ISIN\n");
    for (lei, isin) in rows {
        csv.push_str(&format!("{},{}\n", lei, isin));
    }

    let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    zip.start_file("isin_lei.csv", SimpleFileOptions::default())
        .unwrap();
    zip.write_all(csv.as_bytes()).unwrap();
    zip.finish().unwrap().into_inner()
}

/// Default configuration with millisecond backoff.
pub fn fast_config() -> GleifConfig {
    GleifConfig {
        retry: RetryPolicy {
            attempts: 3,
            base_secs: 0.001,
            cap_secs: 0.004,
            jitter: 0.0,
            seed: Some(1),
        },
        ..GleifConfig::default()
    }
}
