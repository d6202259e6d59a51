//! Built-in rule callbacks.

use super::rule::{RuleRef, ValidationRule};
use crate::core::{FieldValue, Submission};
use crate::host::MediaLibrary;
use crate::settings::{image_size_minimum, SettingsSource};
use std::sync::Arc;
use tracing::debug;

/// Id of the reserved default category.
pub const UNCATEGORIZED_ID: u64 = 1;

/// Fails when the trimmed value is empty, zero, null or an empty list.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotEmpty;

impl NotEmpty {
    /// Identity shared by every instance.
    pub const IDENTITY: &'static str = "fieldgate::not_empty";
}

impl ValidationRule for NotEmpty {
    fn evaluate(&self, value: &FieldValue, _submission: &Submission) -> bool {
        value.trimmed().is_truthy()
    }

    fn identity(&self) -> Option<&str> {
        Some(Self::IDENTITY)
    }
}

/// Fails unless the value is truthy.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsTrue;

impl IsTrue {
    /// Identity shared by every instance.
    pub const IDENTITY: &'static str = "fieldgate::is_true";
}

impl ValidationRule for IsTrue {
    fn evaluate(&self, value: &FieldValue, _submission: &Submission) -> bool {
        value.is_truthy()
    }

    fn identity(&self) -> Option<&str> {
        Some(Self::IDENTITY)
    }
}

/// Fails unless a category other than the default one is selected.
#[derive(Debug, Clone, Copy, Default)]
pub struct HasCategory;

impl HasCategory {
    /// Identity shared by every instance.
    pub const IDENTITY: &'static str = "fieldgate::has_category";
}

impl ValidationRule for HasCategory {
    fn evaluate(&self, _value: &FieldValue, submission: &Submission) -> bool {
        submission
            .category_ids()
            .iter()
            .any(|id| *id > UNCATEGORIZED_ID)
    }

    fn identity(&self) -> Option<&str> {
        Some(Self::IDENTITY)
    }
}

/// Fails unless the comma-separated tag input names at least one tag.
#[derive(Debug, Clone, Copy, Default)]
pub struct HasTag;

impl HasTag {
    /// Identity shared by every instance.
    pub const IDENTITY: &'static str = "fieldgate::has_tag";
}

impl ValidationRule for HasTag {
    fn evaluate(&self, _value: &FieldValue, submission: &Submission) -> bool {
        !submission.tag_names().is_empty()
    }

    fn identity(&self) -> Option<&str> {
        Some(Self::IDENTITY)
    }
}

/// Requires the featured image to be larger than the configured minimum.
///
/// The located value is the attached image id. Both the width and the height
/// of the image must be strictly greater than the minimum.
pub struct ImageSize {
    settings: Arc<dyn SettingsSource>,
    media: Arc<dyn MediaLibrary>,
}

impl ImageSize {
    /// Identity shared by every instance.
    pub const IDENTITY: &'static str = "fieldgate::image_size";

    /// Creates the rule over a settings source and a media library.
    #[must_use]
    pub fn new(settings: Arc<dyn SettingsSource>, media: Arc<dyn MediaLibrary>) -> Self {
        Self { settings, media }
    }
}

impl ValidationRule for ImageSize {
    fn evaluate(&self, value: &FieldValue, submission: &Submission) -> bool {
        let content_type = submission.content_type().unwrap_or_default();
        let minimum = image_size_minimum(self.settings.as_ref(), content_type);
        if minimum.is_zero() {
            return true;
        }

        let Some(attachment_id) = value.as_id().filter(|id| *id > 0) else {
            return true;
        };

        match self.media.image_dimensions(attachment_id) {
            Some(actual) => actual.exceeds(&minimum),
            None => {
                debug!(attachment_id, "Featured image has no known dimensions");
                false
            }
        }
    }

    fn identity(&self) -> Option<&str> {
        Some(Self::IDENTITY)
    }
}

impl std::fmt::Debug for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageSize").finish_non_exhaustive()
    }
}

/// Shared handle to the default not-empty rule.
#[must_use]
pub fn not_empty() -> RuleRef {
    Arc::new(NotEmpty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Dimensions, InMemoryMedia, MockMediaLibrary};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    fn sub(value: Value) -> Submission {
        Submission::from_value(value)
    }

    #[test]
    fn test_not_empty() {
        let rule = NotEmpty;
        let s = Submission::new();

        assert!(!rule.evaluate(&FieldValue::Missing, &s));
        assert!(!rule.evaluate(&FieldValue::Scalar(Value::Null), &s));
        assert!(!rule.evaluate(&FieldValue::text(""), &s));
        assert!(!rule.evaluate(&FieldValue::text("  "), &s));
        assert!(rule.evaluate(&FieldValue::text("x"), &s));
        assert!(!rule.evaluate(&FieldValue::Scalar(json!([])), &s));
        assert!(!rule.evaluate(&FieldValue::List(vec![]), &s));
        assert!(rule.evaluate(&FieldValue::Scalar(json!([1])), &s));
        assert!(rule.evaluate(&FieldValue::List(vec![json!(1)]), &s));
        assert!(!rule.evaluate(&FieldValue::Scalar(json!(0)), &s));
    }

    #[test]
    fn test_is_true() {
        let rule = IsTrue;
        let s = Submission::new();

        assert!(rule.evaluate(&FieldValue::Scalar(json!(true)), &s));
        assert!(rule.evaluate(&FieldValue::text("yes"), &s));
        assert!(!rule.evaluate(&FieldValue::text("0"), &s));
        assert!(!rule.evaluate(&FieldValue::Scalar(json!(false)), &s));
        assert!(!rule.evaluate(&FieldValue::Missing, &s));
    }

    #[test]
    fn test_has_category() {
        let rule = HasCategory;
        let v = FieldValue::Missing;

        assert!(!rule.evaluate(&v, &sub(json!({"post_category": [1]}))));
        assert!(rule.evaluate(&v, &sub(json!({"post_category": [1, 5]}))));
        assert!(!rule.evaluate(&v, &sub(json!({"post_category": []}))));
        assert!(!rule.evaluate(&v, &sub(json!({}))));
        assert!(!rule.evaluate(&v, &sub(json!({"post_category": [0, "1"]}))));
    }

    #[test]
    fn test_has_tag() {
        let rule = HasTag;
        let v = FieldValue::Missing;

        assert!(rule.evaluate(&v, &sub(json!({"tax_input": {"post_tag": "rust"}}))));
        assert!(!rule.evaluate(&v, &sub(json!({"tax_input": {"post_tag": ", ,"}}))));
        assert!(!rule.evaluate(&v, &sub(json!({"tax_input": {}}))));
    }

    fn image_rule(min: Option<Value>, media: InMemoryMedia) -> ImageSize {
        let mut settings: HashMap<String, Value> = HashMap::new();
        if let Some(min) = min {
            settings.insert("require_image_size_post".to_string(), min);
        }
        ImageSize::new(Arc::new(settings), Arc::new(media))
    }

    #[test]
    fn test_image_size_strictly_greater() {
        let media = InMemoryMedia::new();
        media.insert(10, Dimensions::new(150, 150));
        media.insert(11, Dimensions::new(100, 100));
        media.insert(12, Dimensions::new(150, 90));
        let rule = image_rule(Some(json!([100, 100])), media);
        let post = sub(json!({"post_type": "post"}));

        assert!(rule.evaluate(&FieldValue::Scalar(json!(10)), &post));
        assert!(!rule.evaluate(&FieldValue::Scalar(json!(11)), &post));
        assert!(!rule.evaluate(&FieldValue::text("12"), &post));
    }

    #[test]
    fn test_image_size_passes_without_image_or_minimum() {
        let media = InMemoryMedia::new();
        media.insert(11, Dimensions::new(10, 10));

        let unset = image_rule(None, InMemoryMedia::new());
        let zero = image_rule(Some(json!([0, 0])), media);
        let post = sub(json!({"post_type": "post"}));

        assert!(unset.evaluate(&FieldValue::Scalar(json!(11)), &post));
        assert!(zero.evaluate(&FieldValue::Scalar(json!(11)), &post));
        assert!(zero.evaluate(&FieldValue::Missing, &post));

        let strict = image_rule(Some(json!([100, 100])), InMemoryMedia::new());
        assert!(strict.evaluate(&FieldValue::Missing, &post));
        assert!(strict.evaluate(&FieldValue::text("-1"), &post));
    }

    #[test]
    fn test_image_size_unknown_attachment_fails() {
        let mut media = MockMediaLibrary::new();
        media
            .expect_image_dimensions()
            .withf(|id| *id == 77)
            .times(1)
            .returning(|_| None);

        let mut settings: HashMap<String, Value> = HashMap::new();
        settings.insert("require_image_size_post".to_string(), json!([1, 1]));
        let rule = ImageSize::new(Arc::new(settings), Arc::new(media));

        assert!(!rule.evaluate(&FieldValue::Scalar(json!(77)), &sub(json!({"post_type": "post"}))));
    }

    #[test]
    fn test_builtin_identities_are_distinct() {
        let ids = [
            NotEmpty.identity(),
            IsTrue.identity(),
            HasCategory.identity(),
            HasTag.identity(),
        ];
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
