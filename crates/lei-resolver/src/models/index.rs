//! The bulk ISIN->LEI index.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Metadata describing the latest published ISIN->LEI relationship file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveMetadata {
    pub id: Option<String>,
    pub file_name: Option<String>,
    pub uploaded_at: Option<String>,
    pub download_link: Option<String>,
}

/// Immutable ISIN->LEI mapping.
///
/// Keys and values are stored trimmed and upper-cased. Once built the index
/// is only read, and is shared behind an `Arc` between concurrent lookups.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IsinIndex {
    entries: HashMap<String, String>,
}

impl IsinIndex {
    /// Look up the LEI for an ISIN.
    pub fn get(&self, isin: &str) -> Option<&str> {
        self.entries.get(isin).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<HashMap<String, String>> for IsinIndex {
    fn from(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for IsinIndex {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(isin, lei)| (isin.into(), lei.into()))
                .collect(),
        }
    }
}
