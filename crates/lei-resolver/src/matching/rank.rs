//! Candidate ranking and parent selection.

use crate::models::{EntityCandidate, ScoredCandidate};

use super::similarity::weighted_ratio;

/// Default similarity cutoff. Candidates scoring at or below it are discarded.
pub const DEFAULT_SCORE_CUTOFF: f64 = 70.0;

/// Rank registry candidates by similarity to the equity name.
///
/// Scores of zero or at/below `cutoff` are dropped. The remainder is sorted by
/// descending score; equal scores keep their input order.
pub fn rank_candidates(
    equity_name: &str,
    candidates: &[EntityCandidate],
    cutoff: f64,
) -> Vec<ScoredCandidate> {
    let mut scored: Vec<ScoredCandidate> = candidates
        .iter()
        .map(|candidate| ScoredCandidate {
            score: weighted_ratio(equity_name, &candidate.legal_name),
            candidate: candidate.clone(),
        })
        .filter(|scored| scored.score > 0.0 && scored.score > cutoff)
        .collect();

    // sort_by is stable
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored
}

/// Pick the owning parent whose name best matches the equity.
///
/// Returns `None` only when there are no parents. Any parent is preferred over
/// the original candidate because the parent is the issuing root entity.
/// Ties go to the earliest parent.
pub fn select_best_parent<'a>(
    equity_name: &str,
    parents: &'a [EntityCandidate],
) -> Option<&'a EntityCandidate> {
    let (first, rest) = parents.split_first()?;

    let mut best = first;
    let mut best_score = weighted_ratio(equity_name, &first.legal_name);

    for parent in rest {
        let score = weighted_ratio(equity_name, &parent.legal_name);
        if score > best_score {
            best = parent;
            best_score = score;
        }
    }

    Some(best)
}
