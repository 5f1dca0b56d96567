//! Keyword/value metadata taken from TEXT (and ANALYSIS) segments

use crate::error::{FcsError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Keyword map. Keys are stored upper-cased so lookups ignore case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Keywords {
    entries: BTreeMap<String, String>,
}

impl Keywords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl AsRef<str>, value: impl Into<String>) -> Option<String> {
        self.entries
            .insert(normalize_key(key.as_ref()), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(&normalize_key(key)).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(&normalize_key(key))
    }

    pub fn get_required(&self, key: &str) -> Result<&str> {
        self.get(key)
            .ok_or_else(|| FcsError::MissingKeyword(normalize_key(key)))
    }

    /// Parse a keyword value, trimming surrounding whitespace first.
    pub fn parse<T: FromStr>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| FcsError::invalid_keyword(normalize_key(key), raw)),
        }
    }

    pub fn parse_required<T: FromStr>(&self, key: &str) -> Result<T> {
        self.parse(key)?
            .ok_or_else(|| FcsError::MissingKeyword(normalize_key(key)))
    }

    /// Look up a `$Pn<suffix>` keyword for the 1-based parameter `index`.
    pub fn parameter(&self, index: usize, suffix: &str) -> Option<&str> {
        self.get(&parameter_key(index, suffix))
    }

    /// Add every entry of `other` that is not already present.
    pub fn merge_missing(&mut self, other: Keywords) {
        for (key, value) in other.entries {
            self.entries.entry(key).or_insert(value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Keywords {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut keywords = Keywords::new();
        for (key, value) in iter {
            keywords.insert(key, value);
        }
        keywords
    }
}

pub fn parameter_key(index: usize, suffix: &str) -> String {
    format!("$P{}{}", index, suffix)
}

fn normalize_key(key: &str) -> String {
    key.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_ignore_case() {
        let keywords: Keywords = [("$Tot", "100"), ("$p1n", "FSC-A")].into_iter().collect();
        assert_eq!(keywords.get("$TOT"), Some("100"));
        assert_eq!(keywords.get("$tot"), Some("100"));
        assert_eq!(keywords.parameter(1, "N"), Some("FSC-A"));
    }

    #[test]
    fn parse_reports_bad_values() {
        let keywords: Keywords = [("$PAR", " 3 "), ("$TOT", "many")].into_iter().collect();
        assert_eq!(keywords.parse_required::<usize>("$PAR").unwrap(), 3);
        match keywords.parse::<usize>("$TOT") {
            Err(FcsError::InvalidKeyword { key, value }) => {
                assert_eq!(key, "$TOT");
                assert_eq!(value, "many");
            }
            other => panic!("unexpected result {:?}", other),
        }
        assert!(matches!(
            keywords.parse_required::<usize>("$MODE"),
            Err(FcsError::MissingKeyword(k)) if k == "$MODE"
        ));
    }

    #[test]
    fn merge_keeps_existing_values() {
        let mut primary: Keywords = [("$CYT", "Aria")].into_iter().collect();
        let supplemental: Keywords = [("$CYT", "Other"), ("$SRC", "tube 1")].into_iter().collect();
        primary.merge_missing(supplemental);
        assert_eq!(primary.get("$CYT"), Some("Aria"));
        assert_eq!(primary.get("$SRC"), Some("tube 1"));
        assert_eq!(primary.len(), 2);
    }
}
