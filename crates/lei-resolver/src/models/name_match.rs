//! Cached outcome of a name-based lookup.

use serde::{Deserialize, Serialize};

/// Stored result of searching the registry by equity name.
///
/// `NotFound` is a real cached answer. It is distinct from the entry being
/// absent, which means the name was never looked up.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "lei", rename_all = "snake_case")]
pub enum NameMatch {
    Found(String),
    NotFound,
}

impl NameMatch {
    pub fn from_lei(lei: Option<String>) -> Self {
        match lei {
            Some(lei) => Self::Found(lei),
            None => Self::NotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_forms_are_distinct() {
        let found = serde_json::to_value(NameMatch::Found(String::new())).unwrap();
        let not_found = serde_json::to_value(NameMatch::NotFound).unwrap();

        assert_eq!(found, serde_json::json!({"status": "found", "lei": ""}));
        assert_eq!(not_found, serde_json::json!({"status": "not_found"}));
        assert_ne!(found, not_found);
    }

    #[test]
    fn test_round_trips_through_json() {
        let value = serde_json::json!({"status": "found", "lei": "529900NNUPAGGOMPXZ31"});
        let entry: NameMatch = serde_json::from_value(value).unwrap();
        assert_eq!(entry, NameMatch::Found("529900NNUPAGGOMPXZ31".to_string()));
    }
}
