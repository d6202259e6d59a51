//! Startup wiring and the built-in rules.
//!
//! [`FieldgateBuilder`] assembles the registry, runner and notice handler
//! from host collaborators. Built-in rules are installed from settings once
//! per registry, so running startup twice does not register them twice.

use crate::core::{SaveData, Submission};
use crate::errors::{RegistrationError, Result};
use crate::events::{EventSink, NoOpEventSink};
use crate::host::{ContentTypeCatalog, MediaLibrary, MetadataStore};
use crate::ledger::{ErrorLedger, InMemoryLedgerStore, LedgerKey, LedgerStore};
use crate::locator::FieldLocator;
use crate::notices::{EditScreenNotices, NoticeHandler};
use crate::registry::{CallbackMatch, ContentTypes, RuleRegistry, RuleSpec};
use crate::rules::{not_empty, HasCategory, HasTag, ImageSize, RuleRef};
use crate::runner::{SaveContext, ValidationRunner};
use crate::settings::{builtin_enabled, image_size_minimum, SettingsSource};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuiltinCheck {
    NotEmpty,
    HasCategory,
    HasTag,
}

#[derive(Debug, Clone, Copy)]
struct Builtin {
    key: &'static str,
    label: &'static str,
    field: &'static str,
    content_type: Option<&'static str>,
    message: Option<&'static str>,
    highlight: &'static str,
    check: BuiltinCheck,
}

const BUILTINS: &[Builtin] = &[
    Builtin {
        key: "post_title",
        label: "Title",
        field: "post_title",
        content_type: None,
        message: None,
        highlight: "#titlediv",
        check: BuiltinCheck::NotEmpty,
    },
    Builtin {
        key: "post_content",
        label: "Content",
        field: "post_content",
        content_type: None,
        message: None,
        highlight: "#postdivrich",
        check: BuiltinCheck::NotEmpty,
    },
    Builtin {
        key: "post_excerpt",
        label: "Excerpt",
        field: "post_excerpt",
        content_type: Some("post"),
        message: None,
        highlight: "#postexcerpt",
        check: BuiltinCheck::NotEmpty,
    },
    Builtin {
        key: "category",
        label: "Category",
        field: "post_category",
        content_type: Some("post"),
        message: Some("You must choose a category other than the default."),
        highlight: "#categorydiv",
        check: BuiltinCheck::HasCategory,
    },
    Builtin {
        key: "post_tag",
        label: "Tags",
        field: "tax_input[post_tag]",
        content_type: Some("post"),
        message: Some("You must add at least one tag."),
        highlight: "#tagsdiv-post_tag",
        check: BuiltinCheck::HasTag,
    },
    Builtin {
        key: "featured_image",
        label: "Featured Image",
        field: "_thumbnail_id",
        content_type: None,
        message: None,
        highlight: "#postimagediv",
        check: BuiltinCheck::NotEmpty,
    },
];

const IMAGE_SIZE_FIELD: &str = "_thumbnail_id";
const IMAGE_SIZE_HIGHLIGHT: &str = "#postimagediv";

/// Registers the built-in rules enabled in `settings`.
///
/// Returns false without touching the registry when built-ins were already
/// installed on it.
pub fn install_builtins(
    registry: &RuleRegistry,
    settings: &Arc<dyn SettingsSource>,
    media: &Arc<dyn MediaLibrary>,
) -> std::result::Result<bool, RegistrationError> {
    if !registry.claim_builtins() {
        debug!("Built-in rules already installed");
        return Ok(false);
    }

    let mut installed = 0;
    for builtin in BUILTINS {
        let defaults = match builtin.content_type {
            Some(t) => ContentTypes::One(t.to_string()),
            None => ContentTypes::Any,
        };
        let types: Vec<String> = registry
            .expand(&defaults)
            .into_iter()
            .filter(|t| builtin_enabled(settings.as_ref(), builtin.key, t))
            .collect();
        if types.is_empty() {
            continue;
        }

        let callback: RuleRef = match builtin.check {
            BuiltinCheck::NotEmpty => not_empty(),
            BuiltinCheck::HasCategory => Arc::new(HasCategory),
            BuiltinCheck::HasTag => Arc::new(HasTag),
        };

        let mut spec = RuleSpec::new(builtin.field)
            .with_label(builtin.label)
            .with_callback(callback)
            .with_content_types(types)
            .with_highlight(builtin.highlight);
        if let Some(message) = builtin.message {
            spec = spec.with_message(message);
        }
        registry.register(spec)?;
        installed += 1;
    }

    let image_size: RuleRef = Arc::new(ImageSize::new(settings.clone(), media.clone()));
    for content_type in registry.expand(&ContentTypes::Any) {
        let minimum = image_size_minimum(settings.as_ref(), &content_type);
        if minimum.is_zero() {
            continue;
        }
        registry.register(
            RuleSpec::new(IMAGE_SIZE_FIELD)
                .with_label("Featured Image")
                .with_message(format!(
                    "The featured image must be larger than {minimum} pixels."
                ))
                .with_callback(image_size.clone())
                .with_content_types(content_type)
                .with_highlight(IMAGE_SIZE_HIGHLIGHT),
        )?;
        installed += 1;
    }

    info!(installed, "Installed built-in rules");
    Ok(true)
}

/// The assembled gate.
#[derive(Clone)]
pub struct Fieldgate {
    registry: Arc<RuleRegistry>,
    runner: ValidationRunner,
    notices: NoticeHandler,
    settings: Arc<dyn SettingsSource>,
    media: Arc<dyn MediaLibrary>,
}

impl Fieldgate {
    /// Starts building a gate over host collaborators.
    #[must_use]
    pub fn builder(
        catalog: Arc<dyn ContentTypeCatalog>,
        metadata: Arc<dyn MetadataStore>,
        media: Arc<dyn MediaLibrary>,
    ) -> FieldgateBuilder {
        FieldgateBuilder::new(catalog, metadata, media)
    }

    /// Installs the built-in rules enabled in settings.
    ///
    /// Safe to call repeatedly; only the first call registers anything.
    pub fn init(&self) -> Result<bool> {
        Ok(install_builtins(&self.registry, &self.settings, &self.media)?)
    }

    /// Registers an external rule.
    pub fn register(&self, spec: RuleSpec) -> Result<Vec<String>> {
        Ok(self.registry.register(spec)?)
    }

    /// Removes rules named `name`.
    pub fn unregister(
        &self,
        name: &str,
        callback: &CallbackMatch,
        content_types: &ContentTypes,
    ) -> usize {
        self.registry.unregister(name, callback, content_types)
    }

    /// Gates a save. See [`ValidationRunner::force_draft`].
    pub fn force_draft(
        &self,
        data: SaveData,
        submission: Submission,
        ctx: &SaveContext,
    ) -> Result<SaveData> {
        self.runner.force_draft(data, submission, ctx)
    }

    /// Takes the notices for one edit-screen render.
    pub fn take_notices(&self, item_id: u64, user_id: u64) -> Result<EditScreenNotices> {
        Ok(self.notices.take_notices(LedgerKey::new(item_id, user_id))?)
    }

    /// Returns the rule registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<RuleRegistry> {
        &self.registry
    }

    /// Returns the validation runner.
    #[must_use]
    pub fn runner(&self) -> &ValidationRunner {
        &self.runner
    }

    /// Returns the notice handler.
    #[must_use]
    pub fn notices(&self) -> &NoticeHandler {
        &self.notices
    }
}

impl std::fmt::Debug for Fieldgate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fieldgate")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Fieldgate`].
pub struct FieldgateBuilder {
    catalog: Arc<dyn ContentTypeCatalog>,
    metadata: Arc<dyn MetadataStore>,
    media: Arc<dyn MediaLibrary>,
    settings: Arc<dyn SettingsSource>,
    ledger_store: Arc<dyn LedgerStore>,
    sink: Arc<dyn EventSink>,
}

impl FieldgateBuilder {
    /// Creates a builder with empty settings, an in-memory ledger and no event sink.
    #[must_use]
    pub fn new(
        catalog: Arc<dyn ContentTypeCatalog>,
        metadata: Arc<dyn MetadataStore>,
        media: Arc<dyn MediaLibrary>,
    ) -> Self {
        Self {
            catalog,
            metadata,
            media,
            settings: Arc::new(HashMap::<String, serde_json::Value>::new()),
            ledger_store: Arc::new(InMemoryLedgerStore::new()),
            sink: Arc::new(NoOpEventSink),
        }
    }

    /// Sets the settings source.
    #[must_use]
    pub fn with_settings(mut self, settings: Arc<dyn SettingsSource>) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the ledger storage backend.
    #[must_use]
    pub fn with_ledger_store(mut self, store: Arc<dyn LedgerStore>) -> Self {
        self.ledger_store = store;
        self
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Wires the gate and installs the built-in rules.
    pub fn build(self) -> Result<Fieldgate> {
        let registry = Arc::new(RuleRegistry::new(self.catalog));
        let ledger = ErrorLedger::new(self.ledger_store);

        let runner = ValidationRunner::new(
            registry.clone(),
            FieldLocator::new(self.metadata),
            ledger.clone(),
        )
        .with_event_sink(self.sink.clone());
        let notices = NoticeHandler::new(registry.clone(), ledger).with_event_sink(self.sink);

        let gate = Fieldgate {
            registry,
            runner,
            notices,
            settings: self.settings,
            media: self.media,
        };
        gate.init()?;
        Ok(gate)
    }
}

impl std::fmt::Debug for FieldgateBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldgateBuilder").finish_non_exhaustive()
    }
}
