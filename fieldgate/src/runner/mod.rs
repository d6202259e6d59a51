//! The publish gate.
//!
//! [`ValidationRunner::force_draft`] is called by the host on every attempted
//! save. It evaluates the rules registered for the item's content type,
//! records failures in the [`ErrorLedger`], and reverts publish attempts with
//! blocking failures to draft.


use crate::core::{ContentStatus, SaveAction, SaveData, Submission};
use crate::errors::Result;
use crate::events::{self, EventSink, NoOpEventSink};
use crate::ledger::{ErrorLedger, FailureSet, LedgerKey, ValidationFailure};
use crate::locator::FieldLocator;
use crate::observability::attempt_span;
use crate::registry::RuleRegistry;
use crate::rules::sanitize_key;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Request-scoped facts about a save attempt that the submission does not carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveContext {
    /// The acting user.
    pub user_id: u64,
    /// True for background autosave requests.
    pub autosave: bool,
    /// True when the acting user may edit the item.
    pub can_edit: bool,
    /// What the user asked for.
    pub action: SaveAction,
}

impl SaveContext {
    /// Creates a context for an interactive save by a user with edit rights.
    #[must_use]
    pub fn new(user_id: u64) -> Self {
        Self {
            user_id,
            autosave: false,
            can_edit: true,
            action: SaveAction::Update,
        }
    }

    /// Creates a context whose action is inferred from the submission.
    #[must_use]
    pub fn for_submission(user_id: u64, submission: &Submission) -> Self {
        Self::new(user_id).with_action(SaveAction::from_submission(submission))
    }

    /// Sets the save action.
    #[must_use]
    pub fn with_action(mut self, action: SaveAction) -> Self {
        self.action = action;
        self
    }

    /// Marks the request as an autosave.
    #[must_use]
    pub fn with_autosave(mut self, autosave: bool) -> Self {
        self.autosave = autosave;
        self
    }

    /// Sets whether the user may edit the item.
    #[must_use]
    pub fn with_can_edit(mut self, can_edit: bool) -> Self {
        self.can_edit = can_edit;
        self
    }
}

/// What the gate decided for one attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Correlation id of the attempt.
    pub attempt_id: Uuid,
    /// Ledger key the failures were recorded under.
    pub key: LedgerKey,
    /// Failures, keyed by sanitized rule name.
    pub failures: FailureSet,
    /// True when the outgoing status was forced to draft.
    pub blocked: bool,
}

impl ValidationReport {
    /// Returns true if every rule passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Result of gating one save.
#[derive(Debug, Clone, PartialEq)]
pub struct GateOutcome {
    /// The data the host should persist.
    pub data: SaveData,
    /// The decision, or `None` when the attempt was not gated.
    pub report: Option<ValidationReport>,
}

/// Runs registered rules against save attempts.
#[derive(Clone)]
pub struct ValidationRunner {
    registry: Arc<RuleRegistry>,
    locator: FieldLocator,
    ledger: ErrorLedger,
    sink: Arc<dyn EventSink>,
}

impl ValidationRunner {
    /// Creates a runner that reports to no event sink.
    #[must_use]
    pub fn new(registry: Arc<RuleRegistry>, locator: FieldLocator, ledger: ErrorLedger) -> Self {
        Self {
            registry,
            locator,
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

    /// Returns the rule registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<RuleRegistry> {
        &self.registry
    }

    /// Returns the error ledger.
    #[must_use]
    pub fn ledger(&self) -> &ErrorLedger {
        &self.ledger
    }

    /// Evaluates every rule for the submission's content type.
    ///
    /// All rules run, in registration order. Failures sharing a sanitized
    /// name overwrite each other in place. Nothing is recorded.
    #[must_use]
    pub fn validate(&self, submission: &Submission) -> FailureSet {
        let mut failures = FailureSet::new();
        let Some(content_type) = submission.content_type() else {
            return failures;
        };

        for rule in self.registry.rules_for(content_type) {
            let value = self.locator.locate(&rule.name, submission);
            let outcome = rule.check(&value, submission);
            debug!(rule = %rule.name, passed = outcome.passed, "Evaluated rule");

            if !outcome.passed {
                failures.insert(
                    sanitize_key(&rule.name),
                    ValidationFailure::new(rule.name.clone(), rule.message.clone())
                        .with_highlight(rule.highlight.clone())
                        .with_details(outcome.details)
                        .with_severity(rule.severity),
                );
            }
        }

        failures
    }

    /// Gates a save and returns the data to persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger cannot be reset or written.
    pub fn force_draft(
        &self,
        data: SaveData,
        submission: Submission,
        ctx: &SaveContext,
    ) -> Result<SaveData> {
        self.gate(data, submission, ctx).map(|outcome| outcome.data)
    }

    /// Gates a save and returns the data together with the decision.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger cannot be reset or written.
    pub fn gate(
        &self,
        mut data: SaveData,
        mut submission: Submission,
        ctx: &SaveContext,
    ) -> Result<GateOutcome> {
        data.unmask();
        submission.unmask();

        let Some(item_id) = submission.id() else {
            debug!("Submission has no id, skipping gate");
            return Ok(self.skipped(data, "no_id", None));
        };
        if ctx.autosave {
            return Ok(self.skipped(data, "autosave", Some(item_id)));
        }
        if !ctx.can_edit {
            return Ok(self.skipped(data, "no_permission", Some(item_id)));
        }

        let attempt_id = Uuid::new_v4();
        let content_type = submission.content_type().unwrap_or_default().to_string();
        let span = attempt_span(attempt_id, item_id, ctx.user_id, &content_type);
        let _enter = span.enter();

        let key = LedgerKey::new(item_id, ctx.user_id);
        self.ledger.reset(key)?;

        let failures = self.validate(&submission);
        let mut blocked = false;

        if failures.is_empty() {
            debug!("All rules passed");
            self.sink.try_emit(
                events::VALIDATION_PASSED,
                Some(json!({
                    "attempt_id": attempt_id.to_string(),
                    "item_id": item_id,
                    "user_id": ctx.user_id,
                    "content_type": content_type,
                })),
            );
        } else {
            self.ledger.put(key, failures.clone())?;
            info!(failures = failures.len(), action = %ctx.action, "Failures recorded");
            self.sink.try_emit(
                events::VALIDATION_FAILED,
                Some(json!({
                    "attempt_id": attempt_id.to_string(),
                    "item_id": item_id,
                    "user_id": ctx.user_id,
                    "content_type": content_type,
                    "rules": failures.keys(),
                })),
            );

            if ctx.action.is_publish() && failures.has_blocking() {
                data.set_status(&ContentStatus::Draft);
                blocked = true;
                warn!(rules = ?failures.keys(), "Publish blocked, reverted to draft");
                self.sink.try_emit(
                    events::PUBLISH_BLOCKED,
                    Some(json!({
                        "attempt_id": attempt_id.to_string(),
                        "item_id": item_id,
                        "user_id": ctx.user_id,
                    })),
                );
            }
        }

        Ok(GateOutcome {
            data,
            report: Some(ValidationReport {
                attempt_id,
                key,
                failures,
                blocked,
            }),
        })
    }

    fn skipped(&self, data: SaveData, reason: &str, item_id: Option<u64>) -> GateOutcome {
        debug!(reason, ?item_id, "Gate skipped");
        self.sink.try_emit(
            events::VALIDATION_SKIPPED,
            Some(json!({ "reason": reason, "item_id": item_id })),
        );
        GateOutcome { data, report: None }
    }
}

impl std::fmt::Debug for ValidationRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationRunner")
            .field("registry", &self.registry)
            .field("ledger", &self.ledger)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{InMemoryMetadata, StaticContentTypes};
    use crate::registry::RuleSpec;
    use crate::rules::rule_fn;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn runner() -> ValidationRunner {
        let registry = Arc::new(RuleRegistry::new(Arc::new(StaticContentTypes::new([
            "post", "page",
        ]))));
        ValidationRunner::new(
            registry,
            FieldLocator::new(Arc::new(InMemoryMetadata::new())),
            ErrorLedger::in_memory(),
        )
    }

    #[test]
    fn test_save_context_builders() {
        let sub = Submission::from_value(json!({"publish": "Publish"}));
        let ctx = SaveContext::for_submission(3, &sub)
            .with_autosave(true)
            .with_can_edit(false);

        assert_eq!(ctx.user_id, 3);
        assert_eq!(ctx.action, SaveAction::Publish);
        assert!(ctx.autosave);
        assert!(!ctx.can_edit);
    }

    #[test]
    fn test_validate_runs_every_rule_in_order() {
        let runner = runner();
        for name in ["b_field", "a_field", "c_field"] {
            runner
                .registry()
                .register(RuleSpec::new(name).with_content_types("post"))
                .unwrap();
        }

        let sub = Submission::from_value(json!({"ID": 1, "post_type": "post", "a_field": "x"}));
        let failures = runner.validate(&sub);
        assert_eq!(failures.keys(), vec!["b_field", "c_field"]);
    }

    #[test]
    fn test_validate_without_content_type_is_empty() {
        let runner = runner();
        runner.registry().register(RuleSpec::new("post_title")).unwrap();
        assert!(runner.validate(&Submission::from_value(json!({"ID": 1}))).is_empty());
    }

    #[test]
    fn test_validate_unknown_content_type_is_empty() {
        let runner = runner();
        runner.registry().register(RuleSpec::new("post_title")).unwrap();
        let sub = Submission::from_value(json!({"ID": 1, "post_type": "product"}));
        assert!(runner.validate(&sub).is_empty());
    }

    #[test]
    fn test_failure_carries_highlight_and_details() {
        let runner = runner();
        runner
            .registry()
            .register(
                RuleSpec::new("isbn")
                    .with_content_types("post")
                    .with_highlight("#isbn")
                    .with_check("ISBN must be 13 digits", rule_fn(|v, _| {
                        v.as_str().is_some_and(|s| s.len() == 13)
                    })),
            )
            .unwrap();

        let sub = Submission::from_value(json!({"ID": 1, "post_type": "post", "isbn": "123"}));
        let failures = runner.validate(&sub);
        let failure = failures.get("isbn").unwrap();

        assert_eq!(failure.message, "Isbn is required before you can publish.");
        assert_eq!(failure.highlight.as_deref(), Some("#isbn"));
        assert_eq!(failure.details, vec!["ISBN must be 13 digits".to_string()]);
    }
}
