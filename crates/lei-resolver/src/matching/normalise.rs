//! Corporate suffix stripping for registry search queries.
//!
//! Feed names carry legal-form suffixes in many spellings ("PLC", "P.L.C.",
//! "Inc.", ", Inc."). The registry's autocomplete matches better on the bare
//! name, so the trailing legal form is removed before searching.

/// Single-word legal forms, compared after removing dots and a trailing comma.
const SINGLE_WORD_SUFFIXES: &[&str] = &[
    "AB",
    "AG",
    "ASA",
    "BV",
    "CO",
    "CORP",
    "CORPORATION",
    "GMBH",
    "INC",
    "INCORPORATED",
    "KG",
    "KGAA",
    "LIMITED",
    "LLC",
    "LP",
    "LTD",
    "NV",
    "OYJ",
    "PLC",
    "SA",
    "SARL",
    "SAS",
    "SE",
    "SPA",
];

/// Multi-word legal forms, compared word by word.
const MULTI_WORD_SUFFIXES: &[&[&str]] = &[&["PUBLIC", "LIMITED", "COMPANY"]];

/// Strip a trailing legal-form suffix from an equity name.
///
/// Multi-word suffixes are tried first, then a single trailing word. Returns
/// the original name when nothing matches or when stripping would leave an
/// empty string.
///
/// ```
/// use equity_lei_resolver::strip_corporate_suffix;
///
/// assert_eq!(strip_corporate_suffix("AIB Group (UK) P.L.C."), "AIB Group (UK)");
/// assert_eq!(strip_corporate_suffix("Alphabet, Inc."), "Alphabet");
/// assert_eq!(strip_corporate_suffix("PLC"), "PLC");
/// ```
pub fn strip_corporate_suffix(name: &str) -> String {
    let words: Vec<&str> = name.split_whitespace().collect();

    strip_multi_word(&words)
        .or_else(|| strip_single_word(&words))
        .filter(|stripped| !stripped.is_empty())
        .unwrap_or_else(|| name.to_string())
}

fn strip_multi_word(words: &[&str]) -> Option<String> {
    MULTI_WORD_SUFFIXES.iter().find_map(|suffix| {
        let n = suffix.len();
        if words.len() <= n {
            return None;
        }

        let (head, tail) = words.split_at(words.len() - n);
        let matches = tail
            .iter()
            .zip(suffix.iter())
            .all(|(word, expected)| normalise_multi_word(word) == *expected);

        matches.then(|| join_remainder(head))
    })
}

fn strip_single_word(words: &[&str]) -> Option<String> {
    let (last, head) = words.split_last()?;
    if head.is_empty() {
        return None;
    }

    let normalised = last.to_uppercase().replace('.', "");
    let normalised = normalised.trim_end_matches(',');

    SINGLE_WORD_SUFFIXES
        .contains(&normalised)
        .then(|| join_remainder(head))
}

fn normalise_multi_word(word: &str) -> String {
    word.to_uppercase()
        .trim_matches(|c| c == '.' || c == ',')
        .to_string()
}

fn join_remainder(words: &[&str]) -> String {
    words
        .join(" ")
        .trim_end_matches(|c| c == ' ' || c == ',' || c == '.')
        .to_string()
}
