//! Fixtures for gate tests.

use serde_json::{Map, Value};
use std::sync::Arc;

use crate::core::{
    ContentStatus, SaveData, Submission, CATEGORY_KEY, CONTENT_TYPE_KEY, ID_KEY,
    ORIGINAL_STATUS_KEY, STATUS_KEY, TAG_TAXONOMY, TAX_INPUT_KEY,
};
use crate::events::CollectingEventSink;
use crate::host::{InMemoryMedia, InMemoryMetadata, StaticContentTypes};
use crate::ledger::{ErrorLedger, InMemoryLedgerStore};
use crate::locator::FieldLocator;
use crate::notices::NoticeHandler;
use crate::registry::RuleRegistry;
use crate::runner::{SaveContext, ValidationRunner};

/// Builds the submission and save data of one edit-form save.
#[derive(Debug, Clone, Default)]
pub struct SubmissionBuilder {
    fields: Map<String, Value>,
    status: Option<ContentStatus>,
}

impl SubmissionBuilder {
    /// Starts a save of item `id` of `content_type`.
    #[must_use]
    pub fn new(id: u64, content_type: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(ID_KEY.to_string(), Value::from(id));
        fields.insert(CONTENT_TYPE_KEY.to_string(), Value::String(content_type.into()));
        Self {
            fields,
            status: None,
        }
    }

    /// Starts a save of a new item that has no id yet.
    #[must_use]
    pub fn unsaved(content_type: impl Into<String>) -> Self {
        let mut builder = Self::new(0, content_type);
        builder.fields.remove(ID_KEY);
        builder
    }

    /// Sets a submitted field.
    #[must_use]
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Sets the selected category ids.
    #[must_use]
    pub fn categories(self, ids: &[u64]) -> Self {
        self.field(CATEGORY_KEY, Value::from(ids.to_vec()))
    }

    /// Sets the comma-separated tag input.
    #[must_use]
    pub fn tags(mut self, tags: impl Into<String>) -> Self {
        let mut tax = Map::new();
        tax.insert(TAG_TAXONOMY.to_string(), Value::String(tags.into()));
        self.fields.insert(TAX_INPUT_KEY.to_string(), Value::Object(tax));
        self
    }

    /// Presses the publish button.
    #[must_use]
    pub fn publish(mut self) -> Self {
        self.fields.insert("publish".to_string(), Value::from("Publish"));
        self.status = Some(ContentStatus::Publish);
        self
    }

    /// Presses the save-draft button.
    #[must_use]
    pub fn save_draft(mut self) -> Self {
        self.fields.insert("save".to_string(), Value::from("Save Draft"));
        self.status = Some(ContentStatus::Draft);
        self
    }

    /// Updates an item that is already published.
    #[must_use]
    pub fn update_published(mut self) -> Self {
        self.fields.insert(
            ORIGINAL_STATUS_KEY.to_string(),
            Value::from(ContentStatus::Publish.as_str()),
        );
        self.status = Some(ContentStatus::Publish);
        self
    }

    /// Builds the raw submission.
    #[must_use]
    pub fn build(&self) -> Submission {
        let mut fields = self.fields.clone();
        if let Some(status) = &self.status {
            fields.insert(STATUS_KEY.to_string(), Value::from(status.as_str()));
        }
        Submission::from_map(fields)
    }

    /// Builds the data the host would persist: the submitted fields and status.
    #[must_use]
    pub fn save_data(&self) -> SaveData {
        SaveData::from_value(self.build().fields().clone().into())
    }

    /// Builds the save context for `user_id`, with the action the buttons imply.
    #[must_use]
    pub fn context(&self, user_id: u64) -> SaveContext {
        SaveContext::for_submission(user_id, &self.build())
    }
}

/// An in-memory host: content types, metadata, media, ledger and events.
#[derive(Debug, Clone)]
pub struct TestHost {
    /// Public content types.
    pub catalog: Arc<StaticContentTypes>,
    /// Item metadata.
    pub metadata: Arc<InMemoryMetadata>,
    /// Attachment dimensions.
    pub media: Arc<InMemoryMedia>,
    /// Ledger backend.
    pub ledger_store: Arc<InMemoryLedgerStore>,
    /// Collected events.
    pub events: Arc<CollectingEventSink>,
}

impl Default for TestHost {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHost {
    /// Creates a host with the `post` and `page` content types.
    #[must_use]
    pub fn new() -> Self {
        Self::with_types(["post", "page"])
    }

    /// Creates a host with the given public content types.
    #[must_use]
    pub fn with_types<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            catalog: Arc::new(StaticContentTypes::new(types)),
            metadata: Arc::new(InMemoryMetadata::new()),
            media: Arc::new(InMemoryMedia::new()),
            ledger_store: Arc::new(InMemoryLedgerStore::new()),
            events: Arc::new(CollectingEventSink::new()),
        }
    }

    /// Creates an empty registry over this host's content types.
    #[must_use]
    pub fn registry(&self) -> Arc<RuleRegistry> {
        Arc::new(RuleRegistry::new(self.catalog.clone()))
    }

    /// Returns a ledger over this host's ledger backend.
    #[must_use]
    pub fn ledger(&self) -> ErrorLedger {
        ErrorLedger::new(self.ledger_store.clone())
    }

    /// Creates a runner over `registry` reporting to this host's events.
    #[must_use]
    pub fn runner(&self, registry: Arc<RuleRegistry>) -> ValidationRunner {
        ValidationRunner::new(
            registry,
            FieldLocator::new(self.metadata.clone()),
            self.ledger(),
        )
        .with_event_sink(self.events.clone())
    }

    /// Creates a notice handler over `registry` reporting to this host's events.
    #[must_use]
    pub fn notices(&self, registry: Arc<RuleRegistry>) -> NoticeHandler {
        NoticeHandler::new(registry, self.ledger()).with_event_sink(self.events.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SaveAction;
    use serde_json::json;

    #[test]
    fn test_publish_builder() {
        let builder = SubmissionBuilder::new(7, "post")
            .field("post_excerpt", "")
            .categories(&[1, 5])
            .tags("a, b")
            .publish();

        let sub = builder.build();
        assert_eq!(sub.id(), Some(7));
        assert_eq!(sub.content_type(), Some("post"));
        assert_eq!(sub.category_ids(), vec![1, 5]);
        assert_eq!(sub.tag_names(), vec!["a".to_string(), "b".to_string()]);

        assert_eq!(builder.save_data().status(), Some(ContentStatus::Publish));
        assert_eq!(builder.context(2).action, SaveAction::Publish);
    }

    #[test]
    fn test_unsaved_has_no_id() {
        let sub = SubmissionBuilder::unsaved("post").build();
        assert_eq!(sub.id(), None);
        assert_eq!(sub.get("post_type"), Some(&json!("post")));
    }
}
