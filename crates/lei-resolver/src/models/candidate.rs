//! Registry entities returned by search and parent lookups.

use serde::{Deserialize, Serialize};

/// A registry entity: legal name plus LEI.
///
/// Used both for search candidates and for owning parent entities.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityCandidate {
    pub legal_name: String,
    pub lei: String,
}

impl EntityCandidate {
    pub fn new(legal_name: impl Into<String>, lei: impl Into<String>) -> Self {
        Self {
            legal_name: legal_name.into(),
            lei: lei.into(),
        }
    }
}

/// A candidate with its similarity score (0-100) against the equity name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub candidate: EntityCandidate,
    pub score: f64,
}
