//! Resolution input and output.

use serde::{Deserialize, Serialize};

/// Input to a single resolution.
///
/// Upstream feeds send richer records; unknown fields are ignored on
/// deserialization so the resolver never couples to their shape.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierQuery {
    /// Ticker symbol as reported by the feed (e.g., "AAPL")
    pub symbol: String,

    /// Equity or issuer name as reported by the feed
    pub name: String,

    /// ISIN, when the feed carries one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isin: Option<String>,
}

impl IdentifierQuery {
    /// Create a query without an ISIN.
    pub fn new(symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            isin: None,
        }
    }

    /// Set the ISIN.
    pub fn with_isin(mut self, isin: impl Into<String>) -> Self {
        self.isin = Some(isin.into());
        self
    }

    /// The ISIN trimmed and upper-cased, or `None` when absent or blank.
    pub fn normalized_isin(&self) -> Option<String> {
        self.isin
            .as_deref()
            .map(|isin| isin.trim().to_uppercase())
            .filter(|isin| !isin.is_empty())
    }
}

/// Which tier produced the LEI.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolutionSource {
    /// Bulk ISIN->LEI index.
    IsinIndex,
    /// Previously cached name lookup.
    NameCache,
    /// Live registry search with parent traversal.
    RegistrySearch,
}

/// Successful resolution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedIdentity {
    pub name: String,
    pub symbol: String,
    pub isin: Option<String>,
    pub lei: String,
    pub source: ResolutionSource,
}

impl ResolvedIdentity {
    pub(crate) fn from_query(
        query: &IdentifierQuery,
        lei: String,
        source: ResolutionSource,
    ) -> Self {
        Self {
            name: query.name.clone(),
            symbol: query.symbol.clone(),
            isin: query.isin.clone(),
            lei,
            source,
        }
    }
}
