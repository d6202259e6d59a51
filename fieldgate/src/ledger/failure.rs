//! Validation failures and the per-attempt failure set.

use crate::core::Severity;
use serde::{Deserialize, Serialize};

/// A rule that rejected a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailure {
    /// Name of the rule's target field, as registered.
    pub rule: String,
    /// Message shown to the user.
    pub message: String,
    /// UI element associated with the field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<String>,
    /// Messages of failing sub-checks.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
    /// Whether the failure blocks publication.
    #[serde(default)]
    pub severity: Severity,
}

impl ValidationFailure {
    /// Creates a blocking failure with no details.
    #[must_use]
    pub fn new(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            message: message.into(),
            highlight: None,
            details: Vec::new(),
            severity: Severity::Error,
        }
    }

    /// Sets the highlight reference.
    #[must_use]
    pub fn with_highlight(mut self, highlight: Option<String>) -> Self {
        self.highlight = highlight;
        self
    }

    /// Sets the sub-check details.
    #[must_use]
    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }

    /// Sets the severity.
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Returns true if this failure blocks publication.
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// A failure stored under its sanitized key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureEntry {
    /// Sanitized rule name.
    pub key: String,
    /// The failure.
    pub failure: ValidationFailure,
}

/// Failures of one save attempt, keyed by sanitized rule name.
///
/// Keys keep the position of their first insertion. Inserting an existing key
/// replaces the earlier failure in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FailureSet {
    entries: Vec<FailureEntry>,
}

impl FailureSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failure, replacing any failure already stored under `key`.
    pub fn insert(&mut self, key: impl Into<String>, failure: ValidationFailure) {
        let key = key.into();
        match self.entries.iter_mut().find(|entry| entry.key == key) {
            Some(entry) => entry.failure = failure,
            None => self.entries.push(FailureEntry { key, failure }),
        }
    }

    /// Gets the failure stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ValidationFailure> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| &entry.failure)
    }

    /// Returns true if a failure is stored under `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Returns the keys in display order.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.key.as_str()).collect()
    }

    /// Iterates entries in display order.
    pub fn iter(&self) -> impl Iterator<Item = &FailureEntry> {
        self.entries.iter()
    }

    /// Returns the number of failures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no failures.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if any failure blocks publication.
    #[must_use]
    pub fn has_blocking(&self) -> bool {
        self.entries.iter().any(|entry| entry.failure.is_blocking())
    }
}

impl IntoIterator for FailureSet {
    type Item = FailureEntry;
    type IntoIter = std::vec::IntoIter<FailureEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_insert_overwrites_in_place() {
        let mut set = FailureSet::new();
        set.insert("a", ValidationFailure::new("a", "first a"));
        set.insert("b", ValidationFailure::new("b", "b"));
        set.insert("a", ValidationFailure::new("A", "second a"));

        assert_eq!(set.keys(), vec!["a", "b"]);
        assert_eq!(set.get("a").unwrap().message, "second a");
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_has_blocking() {
        let mut set = FailureSet::new();
        set.insert(
            "w",
            ValidationFailure::new("w", "warn").with_severity(Severity::Warning),
        );
        assert!(!set.has_blocking());

        set.insert("e", ValidationFailure::new("e", "err"));
        assert!(set.has_blocking());
    }

    #[test]
    fn test_serde_round_trip_keeps_order() {
        let mut set = FailureSet::new();
        set.insert(
            "post_excerpt",
            ValidationFailure::new("post_excerpt", "Excerpt is required before you can publish.")
                .with_highlight(Some("#postexcerpt".to_string())),
        );
        set.insert(
            "isbn",
            ValidationFailure::new("isbn", "Check the ISBN").with_details(vec!["too short".into()]),
        );

        let json = serde_json::to_string(&set).unwrap();
        let back: FailureSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
        assert_eq!(back.keys(), vec!["post_excerpt", "isbn"]);
    }
}
