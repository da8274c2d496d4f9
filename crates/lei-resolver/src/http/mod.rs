//! HTTP transport abstraction.
//!
//! The resolver never manages connections itself. Callers hand it an
//! [`HttpTransport`]; the default is [`ReqwestTransport`], which wraps a
//! caller-supplied or freshly built `reqwest::Client`.

mod reqwest_transport;

use std::path::Path;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::errors::GleifError;

pub use reqwest_transport::ReqwestTransport;

/// A buffered HTTP response.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, GleifError> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Transport used for every registry call.
///
/// Implementations return `Ok` for any HTTP status; status handling and
/// retries belong to the caller. `Err` is reserved for transport failures
/// (connection refused, timeout, I/O).
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Perform a GET request with query parameters.
    async fn get(&self, url: &str, params: &[(&str, &str)]) -> Result<HttpResponse, GleifError>;

    /// Stream a GET response body into `destination`.
    ///
    /// Returns the number of bytes written. A non-success status is an error.
    async fn download(&self, url: &str, destination: &Path) -> Result<u64, GleifError>;
}
