//! `reqwest` backed transport.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use tokio::io::AsyncWriteExt;

use super::{HttpResponse, HttpTransport};
use crate::errors::GleifError;

/// Default HTTP request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport over a shared `reqwest::Client`.
///
/// The client owns the connection pool; cloning this transport shares it.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a transport with its own client and the given request timeout.
    pub fn new(timeout: Option<Duration>) -> Self {
        let client = Client::builder()
            .timeout(timeout.unwrap_or(REQUEST_TIMEOUT))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client }
    }

    /// Wrap a caller-supplied client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

fn map_request_error(url: &str, error: reqwest::Error) -> GleifError {
    if error.is_timeout() {
        GleifError::Timeout {
            url: url.to_string(),
        }
    } else {
        GleifError::Transport {
            message: format!("Request to {} failed: {}", url, error),
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, params: &[(&str, &str)]) -> Result<HttpResponse, GleifError> {
        debug!("GLEIF request: {} with {} params", url, params.len());

        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| map_request_error(url, e))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| map_request_error(url, e))?;

        Ok(HttpResponse::new(status, body.to_vec()))
    }

    async fn download(&self, url: &str, destination: &Path) -> Result<u64, GleifError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| map_request_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GleifError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let mut file = tokio::fs::File::create(destination).await?;
        let mut written: u64 = 0;

        // One network chunk in memory at a time.
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| map_request_error(url, e))?
        {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        debug!("Downloaded {} bytes from {}", written, url);
        Ok(written)
    }
}
