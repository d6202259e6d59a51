//! Finds the value a rule should validate.

use crate::core::{FieldValue, Submission};
use crate::host::MetadataStore;
use std::sync::Arc;

/// Resolves rule field names against a submission and the item's metadata.
///
/// Primary submission keys always win, even when their value is empty. Only
/// names absent from the submission are looked up in metadata.
#[derive(Clone)]
pub struct FieldLocator {
    metadata: Arc<dyn MetadataStore>,
}

impl FieldLocator {
    /// Creates a locator over a metadata store.
    #[must_use]
    pub fn new(metadata: Arc<dyn MetadataStore>) -> Self {
        Self { metadata }
    }

    /// Locates `name` for the submitted item.
    #[must_use]
    pub fn locate(&self, name: &str, submission: &Submission) -> FieldValue {
        if let Some(value) = submission.get(name) {
            return FieldValue::Scalar(value.clone());
        }

        let Some(item_id) = submission.id() else {
            return FieldValue::Missing;
        };

        match self.metadata.values(item_id, name) {
            Some(mut values) if values.len() == 1 => FieldValue::Scalar(values.remove(0)),
            Some(values) if !values.is_empty() => FieldValue::List(values),
            _ => FieldValue::Missing,
        }
    }
}

impl std::fmt::Debug for FieldLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldLocator").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{InMemoryMetadata, MockMetadataStore};
    use serde_json::json;

    fn locator_with(meta: InMemoryMetadata) -> FieldLocator {
        FieldLocator::new(Arc::new(meta))
    }

    #[test]
    fn test_submission_key_wins_even_when_empty() {
        let meta = InMemoryMetadata::new();
        meta.add(5, "post_title", "from meta");
        let locator = locator_with(meta);

        let sub = Submission::from_value(json!({"ID": 5, "post_title": ""}));
        assert_eq!(locator.locate("post_title", &sub), FieldValue::text(""));

        let null = Submission::from_value(json!({"ID": 5, "post_title": null}));
        assert_eq!(
            locator.locate("post_title", &null),
            FieldValue::Scalar(serde_json::Value::Null)
        );
    }

    #[test]
    fn test_metadata_single_value_is_unwrapped() {
        let meta = InMemoryMetadata::new();
        meta.add(5, "title", "a");
        let locator = locator_with(meta);

        let sub = Submission::from_value(json!({"ID": 5}));
        assert_eq!(locator.locate("title", &sub), FieldValue::text("a"));
    }

    #[test]
    fn test_metadata_multiple_values_are_listed() {
        let meta = InMemoryMetadata::new();
        meta.add(5, "title", "a");
        meta.add(5, "title", "b");
        let locator = locator_with(meta);

        let sub = Submission::from_value(json!({"ID": 5}));
        assert_eq!(
            locator.locate("title", &sub),
            FieldValue::List(vec![json!("a"), json!("b")])
        );
    }

    #[test]
    fn test_missing_everywhere() {
        let locator = locator_with(InMemoryMetadata::new());
        let sub = Submission::from_value(json!({"ID": 5}));
        assert_eq!(locator.locate("title", &sub), FieldValue::Missing);
    }

    #[test]
    fn test_empty_metadata_list_is_missing() {
        let meta = InMemoryMetadata::new();
        meta.set(5, "title", Vec::new());
        let locator = locator_with(meta);

        let sub = Submission::from_value(json!({"ID": 5}));
        assert_eq!(locator.locate("title", &sub), FieldValue::Missing);
    }

    #[test]
    fn test_metadata_not_consulted_without_id() {
        let mut meta = MockMetadataStore::new();
        meta.expect_values().never();
        let locator = FieldLocator::new(Arc::new(meta));

        assert_eq!(
            locator.locate("title", &Submission::new()),
            FieldValue::Missing
        );
    }

    #[test]
    fn test_metadata_not_consulted_for_primary_keys() {
        let mut meta = MockMetadataStore::new();
        meta.expect_values().never();
        let locator = FieldLocator::new(Arc::new(meta));

        let sub = Submission::from_value(json!({"ID": 3, "post_excerpt": "Summary"}));
        assert_eq!(locator.locate("post_excerpt", &sub), FieldValue::text("Summary"));
    }
}
