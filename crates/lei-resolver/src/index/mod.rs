//! Bulk ISIN->LEI index construction.
//!
//! The registry publishes the full ISIN->LEI relationship file as a zip
//! archive holding one large CSV. Building the index means:
//!
//! 1. Fetch the mapping metadata for the latest archive link
//! 2. Stream the archive into a private temporary directory
//! 3. Parse the first CSV entry on the blocking pool
//!
//! The temporary directory is removed once parsing finishes, whether it
//! succeeded or not.

mod archive;

use log::info;

use crate::api::GleifClient;
use crate::errors::GleifError;
use crate::models::IsinIndex;

pub use archive::{parse_archive, parse_csv};

/// File name used for the downloaded archive inside the temp directory.
const ARCHIVE_FILE_NAME: &str = "isin_lei.zip";

/// Downloads and parses the bulk relationship file.
#[derive(Clone, Debug)]
pub struct BulkIndexBuilder {
    client: GleifClient,
}

impl BulkIndexBuilder {
    pub fn new(client: GleifClient) -> Self {
        Self { client }
    }

    /// Build a fresh index from the latest published archive.
    pub async fn build(&self) -> Result<IsinIndex, GleifError> {
        let metadata = self.client.try_fetch_metadata().await?;
        let link = metadata
            .download_link
            .ok_or(GleifError::MissingDownloadLink)?;

        info!(
            "Building ISIN->LEI index from {}",
            metadata.file_name.as_deref().unwrap_or(&link)
        );
        self.download_and_parse(&link).await
    }

    /// Download the archive at `link` and parse it.
    pub async fn download_and_parse(&self, link: &str) -> Result<IsinIndex, GleifError> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(ARCHIVE_FILE_NAME);

        let size = self.client.transport().download(link, &path).await?;
        info!("Downloaded ISIN->LEI archive ({} bytes)", size);

        let index = tokio::task::spawn_blocking(move || {
            let parsed = parse_archive(&path);
            drop(dir);
            parsed
        })
        .await
        .map_err(|e| GleifError::Task(e.to_string()))??;

        info!("ISIN->LEI index built with {} entries", index.len());
        Ok(index)
    }
}
