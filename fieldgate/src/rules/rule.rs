//! The validation rule capability and registered rules.

use crate::core::{FieldValue, Severity, Submission};
use std::fmt;
use std::sync::Arc;

/// A predicate deciding whether a field value is acceptable for publishing.
///
/// Returning `true` means the value is valid. Implementations must tolerate
/// [`FieldValue::Missing`].
pub trait ValidationRule: Send + Sync {
    /// Evaluates the located field value against the full submission.
    fn evaluate(&self, value: &FieldValue, submission: &Submission) -> bool;

    /// Stable identity used to match equivalent rules on unregister.
    ///
    /// Rules without an identity only match the exact same shared instance.
    fn identity(&self) -> Option<&str> {
        None
    }
}

/// Shared handle to a validation rule.
pub type RuleRef = Arc<dyn ValidationRule>;

/// Returns true when two rule handles denote the same callback.
#[must_use]
pub fn same_rule(a: &RuleRef, b: &RuleRef) -> bool {
    if Arc::ptr_eq(a, b) {
        return true;
    }
    matches!((a.identity(), b.identity()), (Some(x), Some(y)) if x == y)
}

/// Adapts a closure into a [`ValidationRule`].
pub struct FnRule<F> {
    identity: Option<String>,
    func: F,
}

impl<F> FnRule<F>
where
    F: Fn(&FieldValue, &Submission) -> bool + Send + Sync,
{
    /// Wraps an anonymous closure.
    #[must_use]
    pub fn new(func: F) -> Self {
        Self {
            identity: None,
            func,
        }
    }

    /// Wraps a closure under a stable identity.
    #[must_use]
    pub fn named(identity: impl Into<String>, func: F) -> Self {
        Self {
            identity: Some(identity.into()),
            func,
        }
    }
}

impl<F> ValidationRule for FnRule<F>
where
    F: Fn(&FieldValue, &Submission) -> bool + Send + Sync,
{
    fn evaluate(&self, value: &FieldValue, submission: &Submission) -> bool {
        (self.func)(value, submission)
    }

    fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }
}

/// Shorthand for an anonymous closure rule.
pub fn rule_fn<F>(func: F) -> RuleRef
where
    F: Fn(&FieldValue, &Submission) -> bool + Send + Sync + 'static,
{
    Arc::new(FnRule::new(func))
}

/// An additional check run alongside a rule's main callback.
#[derive(Clone)]
pub struct SubCheck {
    /// Message listed under the rule's message when the check fails.
    pub message: String,
    /// The check itself.
    pub rule: RuleRef,
}

impl SubCheck {
    /// Creates a new sub-check.
    #[must_use]
    pub fn new(message: impl Into<String>, rule: RuleRef) -> Self {
        Self {
            message: message.into(),
            rule,
        }
    }
}

impl fmt::Debug for SubCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubCheck")
            .field("message", &self.message)
            .field("rule", &self.rule.identity())
            .finish()
    }
}

/// One registered validation requirement.
///
/// Rules are only built by the registry, with the callback already resolved.
/// A rule registered with sub-checks and no callback has no primary callback:
/// only its sub-checks decide.
#[derive(Clone)]
pub struct Rule {
    /// Target field: a primary submission key or a metadata key.
    pub name: String,
    /// Human-readable message shown on failure. May contain markup.
    pub message: String,
    /// Reference to the UI element associated with the field.
    pub highlight: Option<String>,
    /// The resolved callback. `None` only for sub-check-only rules.
    pub callback: Option<RuleRef>,
    /// Further checks whose failures are listed as details.
    pub checks: Vec<SubCheck>,
    /// Whether a failure blocks publication.
    pub severity: Severity,
}

/// Result of running one rule against a submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleOutcome {
    /// True when the callback (if any) and every sub-check passed.
    pub passed: bool,
    /// Messages of failing sub-checks, in order.
    pub details: Vec<String>,
}

impl Rule {
    /// Runs the callback and every sub-check.
    #[must_use]
    pub fn check(&self, value: &FieldValue, submission: &Submission) -> RuleOutcome {
        let callback_ok = self
            .callback
            .as_ref()
            .map_or(true, |callback| callback.evaluate(value, submission));

        let details: Vec<String> = self
            .checks
            .iter()
            .filter(|check| !check.rule.evaluate(value, submission))
            .map(|check| check.message.clone())
            .collect();

        RuleOutcome {
            passed: callback_ok && details.is_empty(),
            details,
        }
    }

    /// Returns true if failures of this rule block publication.
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("message", &self.message)
            .field("highlight", &self.highlight)
            .field("callback", &self.callback.as_ref().map(|c| c.identity()))
            .field("checks", &self.checks)
            .field("severity", &self.severity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn always(result: bool) -> RuleRef {
        rule_fn(move |_, _| result)
    }

    fn rule_with(callback: Option<RuleRef>, checks: Vec<SubCheck>) -> Rule {
        Rule {
            name: "field".to_string(),
            message: "Field is required before you can publish.".to_string(),
            highlight: None,
            callback,
            checks,
            severity: Severity::Error,
        }
    }

    #[test]
    fn test_same_rule_by_pointer() {
        let a = always(true);
        let b = a.clone();
        let c = always(true);

        assert!(same_rule(&a, &b));
        assert!(!same_rule(&a, &c));
    }

    #[test]
    fn test_same_rule_by_identity() {
        let a: RuleRef = Arc::new(FnRule::named("has_isbn", |_: &FieldValue, _: &Submission| true));
        let b: RuleRef = Arc::new(FnRule::named("has_isbn", |_: &FieldValue, _: &Submission| false));
        let c: RuleRef = Arc::new(FnRule::named("has_doi", |_: &FieldValue, _: &Submission| true));

        assert!(same_rule(&a, &b));
        assert!(!same_rule(&a, &c));
    }

    #[test]
    fn test_check_collects_sub_check_details() {
        let rule = rule_with(
            Some(always(true)),
            vec![
                SubCheck::new("too short", always(false)),
                SubCheck::new("fine", always(true)),
                SubCheck::new("no link", always(false)),
            ],
        );

        let outcome = rule.check(&FieldValue::Missing, &Submission::new());
        assert!(!outcome.passed);
        assert_eq!(outcome.details, vec!["too short", "no link"]);
    }

    #[test]
    fn test_check_fails_on_callback_alone() {
        let rule = rule_with(Some(always(false)), vec![SubCheck::new("fine", always(true))]);
        let outcome = rule.check(&FieldValue::Missing, &Submission::new());
        assert!(!outcome.passed);
        assert!(outcome.details.is_empty());
    }

    #[test]
    fn test_sub_check_only_rule_is_decided_by_its_checks() {
        let passing = rule_with(None, vec![SubCheck::new("fine", always(true))]);
        let outcome = passing.check(&FieldValue::text(""), &Submission::new());
        assert!(outcome.passed);
        assert!(outcome.details.is_empty());

        let failing = rule_with(None, vec![SubCheck::new("too long", always(false))]);
        let outcome = failing.check(&FieldValue::text(""), &Submission::new());
        assert!(!outcome.passed);
        assert_eq!(outcome.details, vec!["too long"]);
    }

    #[test]
    fn test_warning_is_not_blocking() {
        let mut rule = rule_with(Some(always(true)), Vec::new());
        assert!(rule.is_blocking());
        rule.severity = Severity::Warning;
        assert!(!rule.is_blocking());
    }
}
