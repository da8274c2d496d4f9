//! Name matching: suffix stripping, similarity scoring, candidate ranking.

mod normalise;
mod rank;
mod similarity;

pub use normalise::strip_corporate_suffix;
pub use rank::{rank_candidates, select_best_parent, DEFAULT_SCORE_CUTOFF};
pub use similarity::{normalise_for_matching, weighted_ratio};
