//! Edit-screen side of the gate: surfacing recorded failures once.

use crate::core::Severity;
use crate::errors::LedgerError;
use crate::events::{self, EventSink, NoOpEventSink};
use crate::ledger::{ErrorLedger, FailureSet, LedgerKey};
use crate::registry::RuleRegistry;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

/// One message block for the edit screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Sanitized rule name. The host uses it as the block's class.
    pub code: String,
    /// Rule message. May contain markup.
    pub message: String,
    /// UI element to highlight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<String>,
    /// Failing sub-check messages, listed under the message.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
    /// Error or warning.
    pub severity: Severity,
}

/// Everything the edit screen needs to show after a save.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditScreenNotices {
    /// Notices in rule registration order.
    pub notices: Vec<Notice>,
    /// True when the host should drop its "item published" message.
    pub suppress_published_notice: bool,
}

impl EditScreenNotices {
    fn from_failures(failures: FailureSet) -> Self {
        let suppress_published_notice = failures.has_blocking();
        let notices = failures
            .into_iter()
            .map(|entry| Notice {
                code: entry.key,
                message: entry.failure.message,
                highlight: entry.failure.highlight,
                details: entry.failure.details,
                severity: entry.failure.severity,
            })
            .collect();

        Self {
            notices,
            suppress_published_notice,
        }
    }

    /// Returns true if there is nothing to show.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }

    /// Returns the blocking notices.
    pub fn errors(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter().filter(|n| n.severity == Severity::Error)
    }

    /// Returns the warning notices.
    pub fn warnings(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter().filter(|n| n.severity == Severity::Warning)
    }
}

/// A field the client script should reveal and highlight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientField {
    /// Rule name.
    pub name: String,
    /// UI element reference.
    pub highlight: Option<String>,
}

/// Reads recorded failures for the edit screen.
#[derive(Clone)]
pub struct NoticeHandler {
    registry: Arc<RuleRegistry>,
    ledger: ErrorLedger,
    sink: Arc<dyn EventSink>,
}

impl NoticeHandler {
    /// Creates a handler over the registry and the ledger.
    #[must_use]
    pub fn new(registry: Arc<RuleRegistry>, ledger: ErrorLedger) -> Self {
        Self {
            registry,
            ledger,
            sink: Arc::new(NoOpEventSink),
        }
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Takes the notices for one render of the edit screen.
    ///
    /// The ledger entry is deleted, so a second render shows nothing.
    pub fn take_notices(&self, key: LedgerKey) -> Result<EditScreenNotices, LedgerError> {
        let failures = self.ledger.take(key)?;
        if failures.is_empty() {
            return Ok(EditScreenNotices::default());
        }

        debug!(key = %key, notices = failures.len(), "Showing notices");
        self.sink.try_emit(
            events::NOTICES_SHOWN,
            Some(json!({
                "item_id": key.item_id,
                "user_id": key.user_id,
                "codes": failures.keys(),
            })),
        );

        Ok(EditScreenNotices::from_failures(failures))
    }

    /// Lists the fields with rules on `content_type`, for the client script.
    #[must_use]
    pub fn client_payload(&self, content_type: &str) -> Vec<ClientField> {
        self.registry
            .rules_for(content_type)
            .into_iter()
            .map(|rule| ClientField {
                name: rule.name,
                highlight: rule.highlight,
            })
            .collect()
    }
}

impl std::fmt::Debug for NoticeHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoticeHandler").finish_non_exhaustive()
    }
}
