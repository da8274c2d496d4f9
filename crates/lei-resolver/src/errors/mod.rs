//! Error types and retry classification for LEI resolution.
//!
//! This module provides:
//! - [`GleifError`]: The main error enum for registry, index and lookup operations
//! - [`CacheError`]: Errors raised by cache stores
//! - [`RetryClass`]: Classification of HTTP statuses for the retry loop

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

/// Errors raised by cache stores.
///
/// Cache failures never abort a resolution: the resolver logs them and
/// behaves as if the entry were absent.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Reading or writing the backing storage failed.
    #[error("Cache I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A stored value could not be encoded or decoded.
    #[error("Cache value could not be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The cache was configured with an invalid value.
    #[error("Invalid cache configuration: {0}")]
    InvalidConfig(String),
}

/// Errors that can occur while resolving LEIs.
#[derive(Error, Debug)]
pub enum GleifError {
    /// No tier produced an LEI for this equity.
    /// Terminal for this equity only; callers skip it and continue the batch.
    #[error("No LEI found for {name} (ISIN: {})", .isin.as_deref().unwrap_or("none"))]
    LeiNotFound {
        /// The equity name that was looked up
        name: String,
        /// The ISIN supplied with the query, if any
        isin: Option<String>,
    },

    /// The request could not be sent or the connection failed.
    #[error("Transport error: {message}")]
    Transport {
        /// Description of the transport failure
        message: String,
    },

    /// The request timed out at the transport level.
    #[error("Request timed out: {url}")]
    Timeout {
        /// The URL that timed out
        url: String,
    },

    /// The registry answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    HttpStatus {
        /// The HTTP status code
        status: u16,
        /// The requested URL
        url: String,
    },

    /// A response body did not match the expected shape.
    #[error("Malformed payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    /// The mapping metadata could not be retrieved.
    #[error("ISIN->LEI metadata unavailable: {0}")]
    MetadataUnavailable(String),

    /// The mapping metadata carried no download link.
    #[error("ISIN->LEI metadata missing download link")]
    MissingDownloadLink,

    /// The downloaded archive contained no CSV entry.
    #[error("No CSV file found in ISIN->LEI archive")]
    MissingCsv,

    /// The downloaded archive could not be read.
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// The CSV inside the archive could not be read.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Local file handling failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A blocking task was cancelled or panicked.
    #[error("Background task failed: {0}")]
    Task(String),

    /// The API admission gate was closed.
    #[error("API admission gate closed")]
    GateClosed,
}

impl GleifError {
    /// Shorthand for the terminal lookup failure.
    pub fn not_found(name: impl Into<String>, isin: Option<&str>) -> Self {
        Self::LeiNotFound {
            name: name.into(),
            isin: isin.map(str::to_string),
        }
    }

    /// Returns true when this error means "no LEI for this equity".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::LeiNotFound { .. })
    }
}
