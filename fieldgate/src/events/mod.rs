//! Gate events for observability.
//!
//! The runner and the notice handler report their decisions through an
//! [`EventSink`] handed to them at construction. Emission from the save path
//! is synchronous and must never fail the save.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};

/// A save attempt passed every rule.
pub const VALIDATION_PASSED: &str = "fieldgate.validation.passed";
/// A save attempt produced failures.
pub const VALIDATION_FAILED: &str = "fieldgate.validation.failed";
/// A publish attempt was forced back to draft.
pub const PUBLISH_BLOCKED: &str = "fieldgate.publish.blocked";
/// A save attempt was not gated (autosave, no id, no permission).
pub const VALIDATION_SKIPPED: &str = "fieldgate.validation.skipped";
/// Recorded failures were handed to the edit screen.
pub const NOTICES_SHOWN: &str = "fieldgate.notices.shown";
