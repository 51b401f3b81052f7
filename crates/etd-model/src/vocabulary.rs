//! Controlled vocabulary of canonical academic majors.

use std::collections::BTreeSet;

use serde::Serialize;

/// Immutable lookup of canonical major names. Constructed once at startup
/// from the institutional majors list and passed by reference into
/// validation; nothing mutates it afterwards.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MajorVocabulary {
    entries: BTreeSet<String>,
}

impl MajorVocabulary {
    /// Build a vocabulary from canonical names. Entries are trimmed; blank
    /// entries are dropped. Matching is exact and case-sensitive.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|entry| entry.into().trim().to_string())
            .filter(|entry| !entry.is_empty())
            .collect();
        Self { entries }
    }

    /// Exact membership test.
    pub fn contains(&self, major: &str) -> bool {
        self.entries.contains(major)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Canonical names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}
