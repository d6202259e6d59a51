//! Raw submissions and the data the host is about to persist.

use super::status::ContentStatus;
use super::value::value_as_id;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Submission key holding the content item id.
pub const ID_KEY: &str = "ID";
/// Submission key holding the content type name.
pub const CONTENT_TYPE_KEY: &str = "post_type";
/// Key holding the item status, in both submissions and save data.
pub const STATUS_KEY: &str = "post_status";
/// Submission key holding the status the item had before this save.
pub const ORIGINAL_STATUS_KEY: &str = "original_post_status";
/// Submission key holding the selected category ids.
pub const CATEGORY_KEY: &str = "post_category";
/// Submission key holding taxonomy input, keyed by taxonomy name.
pub const TAX_INPUT_KEY: &str = "tax_input";
/// Taxonomy name of free-form tags.
pub const TAG_TAXONOMY: &str = "post_tag";

/// Placeholder the edit screen submits instead of an empty value so the
/// host's own "required" check does not reject the save first.
pub const MASK_PLACEHOLDER: &str = " ";

/// The raw incoming save request for a content item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Submission {
    fields: Map<String, Value>,
}

impl Submission {
    /// Creates an empty submission.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a submission from a JSON object. Non-object values yield an
    /// empty submission.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self { fields },
            _ => Self::default(),
        }
    }

    /// Creates a submission from an existing field map.
    #[must_use]
    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Adds a field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Sets a field, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Gets a field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Checks whether a key is present, regardless of its value.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Returns all fields.
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Returns the content item id. Zero and unparsable ids count as absent.
    #[must_use]
    pub fn id(&self) -> Option<u64> {
        self.get(ID_KEY).and_then(value_as_id).filter(|id| *id > 0)
    }

    /// Returns the content type name.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.get(CONTENT_TYPE_KEY).and_then(Value::as_str)
    }

    /// Returns the status the item had before this save, if submitted.
    #[must_use]
    pub fn original_status(&self) -> Option<ContentStatus> {
        self.get(ORIGINAL_STATUS_KEY)
            .and_then(Value::as_str)
            .map(ContentStatus::from)
    }

    /// Returns the submitted category ids. Unparsable entries are skipped.
    #[must_use]
    pub fn category_ids(&self) -> Vec<u64> {
        match self.get(CATEGORY_KEY) {
            Some(Value::Array(items)) => items.iter().filter_map(value_as_id).collect(),
            Some(other) => value_as_id(other).into_iter().collect(),
            None => Vec::new(),
        }
    }

    /// Returns the non-empty tag names from the comma-separated tag input.
    ///
    /// Array input is accepted too; each entry may itself be comma-separated.
    #[must_use]
    pub fn tag_names(&self) -> Vec<String> {
        let raw = self
            .get(TAX_INPUT_KEY)
            .and_then(|taxonomies| taxonomies.get(TAG_TAXONOMY));

        let chunks: Vec<&str> = match raw {
            Some(Value::String(s)) => vec![s.as_str()],
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        };

        chunks
            .into_iter()
            .flat_map(|chunk| chunk.split(','))
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(String::from)
            .collect()
    }

    /// Resets fields masked with [`MASK_PLACEHOLDER`] back to empty strings.
    pub fn unmask(&mut self) {
        unmask_fields(&mut self.fields);
    }
}

/// The data the host will persist for this save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SaveData {
    fields: Map<String, Value>,
}

impl SaveData {
    /// Creates empty save data.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates save data from a JSON object. Non-object values yield empty data.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self { fields },
            _ => Self::default(),
        }
    }

    /// Adds a field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Gets a field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Returns all fields.
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Converts back into a JSON object.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }

    /// Returns the outgoing status, if set.
    #[must_use]
    pub fn status(&self) -> Option<ContentStatus> {
        self.get(STATUS_KEY)
            .and_then(Value::as_str)
            .map(ContentStatus::from)
    }

    /// Sets the outgoing status.
    pub fn set_status(&mut self, status: &ContentStatus) {
        self.fields
            .insert(STATUS_KEY.to_string(), Value::String(status.as_str().to_string()));
    }

    /// Resets fields masked with [`MASK_PLACEHOLDER`] back to empty strings.
    pub fn unmask(&mut self) {
        unmask_fields(&mut self.fields);
    }
}

fn unmask_fields(fields: &mut Map<String, Value>) {
    for value in fields.values_mut() {
        if value.as_str() == Some(MASK_PLACEHOLDER) {
            *value = Value::String(String::new());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_id_parsing() {
        assert_eq!(Submission::from_value(json!({"ID": 12})).id(), Some(12));
        assert_eq!(Submission::from_value(json!({"ID": "34"})).id(), Some(34));
        assert_eq!(Submission::from_value(json!({"ID": 0})).id(), None);
        assert_eq!(Submission::from_value(json!({"ID": "new"})).id(), None);
        assert_eq!(Submission::new().id(), None);
    }

    #[test]
    fn test_non_object_is_empty() {
        assert!(Submission::from_value(json!([1, 2])).fields().is_empty());
        assert!(SaveData::from_value(json!("x")).fields().is_empty());
    }

    #[test]
    fn test_category_ids() {
        let sub = Submission::from_value(json!({"post_category": [0, "1", 5, "x"]}));
        assert_eq!(sub.category_ids(), vec![0, 1, 5]);

        let single = Submission::from_value(json!({"post_category": 7}));
        assert_eq!(single.category_ids(), vec![7]);

        assert!(Submission::new().category_ids().is_empty());
    }

    #[test]
    fn test_tag_names_filters_empty_entries() {
        let sub = Submission::from_value(json!({"tax_input": {"post_tag": "rust, ,news,,"}}));
        assert_eq!(sub.tag_names(), vec!["rust".to_string(), "news".to_string()]);

        let empty = Submission::from_value(json!({"tax_input": {"post_tag": " , "}}));
        assert!(empty.tag_names().is_empty());

        let array = Submission::from_value(json!({"tax_input": {"post_tag": ["a,b", "c"]}}));
        assert_eq!(array.tag_names().len(), 3);
    }

    #[test]
    fn test_unmask_resets_single_space_only() {
        let mut sub = Submission::from_value(json!({
            "post_title": " ",
            "post_content": "  ",
            "post_excerpt": "text"
        }));
        sub.unmask();

        assert_eq!(sub.get("post_title"), Some(&json!("")));
        assert_eq!(sub.get("post_content"), Some(&json!("  ")));
        assert_eq!(sub.get("post_excerpt"), Some(&json!("text")));
    }

    #[test]
    fn test_save_data_status() {
        let mut data = SaveData::new().with_field("post_status", "publish");
        assert_eq!(data.status(), Some(ContentStatus::Publish));

        data.set_status(&ContentStatus::Draft);
        assert_eq!(data.get("post_status"), Some(&json!("draft")));
    }

    #[test]
    fn test_original_status() {
        let sub = Submission::from_value(json!({"original_post_status": "publish"}));
        assert_eq!(sub.original_status(), Some(ContentStatus::Publish));
    }
}
