//! Step-by-step record of a live registry search.

use serde::Serialize;

use crate::models::{EntityCandidate, ScoredCandidate};

/// Everything the live search saw for one name.
///
/// Returned by [`LeiResolver::explain`](crate::LeiResolver::explain) and
/// used internally to drive the search tier.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SearchTrace {
    /// The equity name as supplied.
    pub name: String,
    /// The query sent to the autocompletion endpoint.
    pub query: String,
    /// Active candidates returned by the registry, in API order.
    pub candidates: Vec<EntityCandidate>,
    /// Candidates above the score cutoff, best first.
    pub ranked: Vec<ScoredCandidate>,
    /// Owners of the best candidate.
    pub parents: Vec<EntityCandidate>,
    /// The parent chosen over the best candidate, if any.
    pub chosen_parent: Option<EntityCandidate>,
    /// The final LEI.
    pub lei: Option<String>,
}

impl SearchTrace {
    pub(crate) fn new(name: &str, query: String) -> Self {
        Self {
            name: name.to_string(),
            query,
            ..Self::default()
        }
    }

    /// Best-ranked candidate.
    pub fn best(&self) -> Option<&EntityCandidate> {
        self.ranked.first().map(|scored| &scored.candidate)
    }
}
