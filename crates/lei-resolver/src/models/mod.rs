//! LEI resolution models
//!
//! - `identity` - Query input and resolved output (IdentifierQuery, ResolvedIdentity)
//! - `candidate` - Registry entities and their similarity scores
//! - `index` - The bulk ISIN->LEI index and its archive metadata
//! - `name_match` - Cached outcome of a name-based lookup

mod candidate;
mod identity;
mod index;
mod name_match;

pub use candidate::{EntityCandidate, ScoredCandidate};
pub use identity::{IdentifierQuery, ResolutionSource, ResolvedIdentity};
pub use index::{ArchiveMetadata, IsinIndex};
pub use name_match::NameMatch;
