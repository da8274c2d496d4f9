//! Weighted string similarity for entity names.
//!
//! Scores are on a 0-100 scale. Both inputs are normalised first: lower-cased,
//! every non-alphanumeric character replaced by a space, whitespace collapsed.
//! The final score is the best of several views of the two strings:
//!
//! - plain ratio over the whole strings
//! - token-sort and token-set ratios, which ignore word order and duplicates
//! - partial ratios, which align the shorter string against the best window
//!   of the longer one, scaled down as the length difference grows
//!
//! The base ratio is `strsim::normalized_levenshtein`, where a substitution
//! costs one edit. Ratios built on insert/delete distance count it as two, so
//! scores near the cutoff can differ by a few points from such scorers.

use std::collections::BTreeSet;

/// Scale applied to token based ratios.
const TOKEN_SCALE: f64 = 0.95;

/// Length ratio below which partial alignment is not considered.
const PARTIAL_THRESHOLD: f64 = 1.5;

/// Length ratio above which partial alignment is heavily discounted.
const LONG_PARTIAL_THRESHOLD: f64 = 8.0;

const PARTIAL_SCALE: f64 = 0.9;
const LONG_PARTIAL_SCALE: f64 = 0.6;

/// Normalise a name for comparison.
pub fn normalise_for_matching(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_lowercase().next().unwrap_or(c)
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Weighted similarity between two names, 0-100.
pub fn weighted_ratio(left: &str, right: &str) -> f64 {
    let left = normalise_for_matching(left);
    let right = normalise_for_matching(right);

    if left.is_empty() || right.is_empty() {
        return 0.0;
    }

    let left_len = left.chars().count() as f64;
    let right_len = right.chars().count() as f64;
    let len_ratio = left_len.max(right_len) / left_len.min(right_len);

    let base = ratio(&left, &right);

    if len_ratio < PARTIAL_THRESHOLD {
        return base
            .max(token_sort_ratio(&left, &right) * TOKEN_SCALE)
            .max(token_set_ratio(&left, &right) * TOKEN_SCALE);
    }

    let partial_scale = if len_ratio < LONG_PARTIAL_THRESHOLD {
        PARTIAL_SCALE
    } else {
        LONG_PARTIAL_SCALE
    };

    base.max(partial_ratio(&left, &right) * partial_scale)
        .max(partial_ratio(&sorted_tokens(&left), &sorted_tokens(&right)) * TOKEN_SCALE * partial_scale)
}

/// Normalised edit similarity of two already-normalised strings, 0-100.
fn ratio(left: &str, right: &str) -> f64 {
    strsim::normalized_levenshtein(left, right) * 100.0
}

fn sorted_tokens(value: &str) -> String {
    let mut tokens: Vec<&str> = value.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn token_sort_ratio(left: &str, right: &str) -> f64 {
    ratio(&sorted_tokens(left), &sorted_tokens(right))
}

fn token_set_ratio(left: &str, right: &str) -> f64 {
    let left_tokens: BTreeSet<&str> = left.split_whitespace().collect();
    let right_tokens: BTreeSet<&str> = right.split_whitespace().collect();

    let common = left_tokens
        .intersection(&right_tokens)
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    let left_only = left_tokens
        .difference(&right_tokens)
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    let right_only = right_tokens
        .difference(&left_tokens)
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

    // One side's words are a subset of the other's.
    if !common.is_empty() && (left_only.is_empty() || right_only.is_empty()) {
        return 100.0;
    }

    let left_combined = join_non_empty(&common, &left_only);
    let right_combined = join_non_empty(&common, &right_only);

    let mut best = ratio(&left_combined, &right_combined);
    if !common.is_empty() {
        best = best
            .max(ratio(&common, &left_combined))
            .max(ratio(&common, &right_combined));
    }
    best
}

fn join_non_empty(first: &str, second: &str) -> String {
    match (first.is_empty(), second.is_empty()) {
        (true, _) => second.to_string(),
        (_, true) => first.to_string(),
        _ => format!("{} {}", first, second),
    }
}

/// Best ratio of the shorter string against every equal-length window of the longer.
fn partial_ratio(left: &str, right: &str) -> f64 {
    let (shorter, longer) = if left.chars().count() <= right.chars().count() {
        (left, right)
    } else {
        (right, left)
    };

    let short_chars: Vec<char> = shorter.chars().collect();
    let long_chars: Vec<char> = longer.chars().collect();
    let window = short_chars.len();

    if window == 0 {
        return 0.0;
    }

    long_chars
        .windows(window)
        .map(|slice| {
            let candidate: String = slice.iter().collect();
            ratio(shorter, &candidate)
        })
        .fold(0.0, f64::max)
}
