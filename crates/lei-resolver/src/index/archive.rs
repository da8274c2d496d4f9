//! Reading the ISIN->LEI relationship archive.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::ReaderBuilder;
use log::{debug, warn};
use serde::Deserialize;
use zip::ZipArchive;

use crate::errors::GleifError;
use crate::models::IsinIndex;

/// One row of the relationship file. Other columns are ignored.
#[derive(Debug, Deserialize)]
struct MappingRow {
    #[serde(rename = "LEI", default)]
    lei: String,
    #[serde(rename = "ISIN", default)]
    isin: String,
}

/// Parse CSV rows into an index.
///
/// Values are trimmed and upper-cased. Rows missing either value are skipped;
/// when an ISIN repeats, the last row wins.
pub fn parse_csv<R: Read>(reader: R) -> Result<IsinIndex, GleifError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut entries: HashMap<String, String> = HashMap::new();
    let mut skipped = 0usize;

    for (idx, result) in reader.deserialize::<MappingRow>().enumerate() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                // I/O failures end the read; a single bad row does not.
                if e.is_io_error() {
                    return Err(e.into());
                }
                debug!("Skipping ISIN->LEI row {}: {}", idx + 1, e);
                skipped += 1;
                continue;
            }
        };

        let isin = row.isin.trim().to_uppercase();
        let lei = row.lei.trim().to_uppercase();
        if isin.is_empty() || lei.is_empty() {
            skipped += 1;
            continue;
        }
        entries.insert(isin, lei);
    }

    if skipped > 0 {
        warn!("Skipped {} incomplete ISIN->LEI rows", skipped);
    }

    Ok(IsinIndex::from(entries))
}

/// Open a zip archive and parse its first `.csv` entry.
///
/// The entry is streamed; the decompressed file is never held in memory.
pub fn parse_archive(path: &Path) -> Result<IsinIndex, GleifError> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;

    let mut csv_index = None;
    for i in 0..archive.len() {
        let entry = archive.by_index(i)?;
        if !entry.is_dir() && entry.name().to_lowercase().ends_with(".csv") {
            csv_index = Some(i);
            break;
        }
    }
    let csv_index = csv_index.ok_or(GleifError::MissingCsv)?;

    let entry = archive.by_index(csv_index)?;
    debug!("Parsing ISIN->LEI entry '{}'", entry.name());

    parse_csv(BufReader::new(entry))
}
