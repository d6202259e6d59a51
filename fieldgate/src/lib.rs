//! # Fieldgate
//!
//! Required-field validation and publish gating for content items.
//!
//! Fieldgate keeps a registry of named rules per content type and runs them
//! whenever the host saves an item:
//!
//! - **Registration**: rules target a submission key or a metadata key, with
//!   an optional callback that defaults to "not empty"
//! - **Gating**: failing publish attempts are reverted to draft
//! - **Error ledger**: failures survive the redirect after save and are shown
//!   exactly once
//!
//! ## Quick Start
//!
//! ```rust
//! use fieldgate::prelude::*;
//! use std::sync::Arc;
//!
//! let gate = Fieldgate::builder(
//!     Arc::new(StaticContentTypes::new(["post", "page"])),
//!     Arc::new(InMemoryMetadata::new()),
//!     Arc::new(InMemoryMedia::new()),
//! )
//! .build()?;
//!
//! gate.register(RuleSpec::new("post_excerpt").with_content_types("post"))?;
//!
//! let submission = Submission::from_value(serde_json::json!({
//!     "ID": 42,
//!     "post_type": "post",
//!     "post_status": "publish",
//!     "post_excerpt": "",
//!     "publish": "Publish",
//! }));
//! let data = SaveData::from_value(submission.fields().clone().into());
//! let ctx = SaveContext::for_submission(7, &submission);
//!
//! let data = gate.force_draft(data, submission, &ctx)?;
//! assert_eq!(data.status(), Some(ContentStatus::Draft));
//!
//! let notices = gate.take_notices(42, 7)?;
//! assert_eq!(notices.notices[0].code, "post_excerpt");
//! # Ok::<(), fieldgate::errors::FieldgateError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod bootstrap;
pub mod core;
pub mod errors;
pub mod events;
pub mod host;
pub mod ledger;
pub mod locator;
pub mod notices;
pub mod observability;
pub mod registry;
pub mod rules;
pub mod runner;
pub mod settings;
pub mod testing;

pub use bootstrap::{install_builtins, Fieldgate, FieldgateBuilder};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::bootstrap::{Fieldgate, FieldgateBuilder};
    pub use crate::core::{
        ContentStatus, FieldValue, SaveAction, SaveData, Severity, Submission,
    };
    pub use crate::errors::{FieldgateError, LedgerError, RegistrationError};
    pub use crate::events::{EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::host::{
        ContentTypeCatalog, Dimensions, InMemoryMedia, InMemoryMetadata, MediaLibrary,
        MetadataStore, StaticContentTypes,
    };
    pub use crate::ledger::{ErrorLedger, FailureSet, LedgerKey, ValidationFailure};
    pub use crate::locator::FieldLocator;
    pub use crate::notices::{EditScreenNotices, Notice, NoticeHandler};
    pub use crate::registry::{CallbackMatch, ContentTypes, RuleRegistry, RuleSpec};
    pub use crate::rules::{rule_fn, RuleRef, ValidationRule};
    pub use crate::runner::{SaveContext, ValidationRunner};
    pub use crate::settings::{GateSettings, SettingsSource};
}
