//! Rules for testing.

use parking_lot::Mutex;

use crate::core::{FieldValue, Submission};
use crate::rules::ValidationRule;

/// A rule with a fixed verdict that records every value it judged.
#[derive(Debug)]
pub struct RecordingRule {
    verdict: bool,
    seen: Mutex<Vec<FieldValue>>,
}

impl RecordingRule {
    /// Creates a rule returning `verdict`.
    #[must_use]
    pub fn new(verdict: bool) -> Self {
        Self {
            verdict,
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Creates an always-passing rule.
    #[must_use]
    pub fn passing() -> Self {
        Self::new(true)
    }

    /// Creates an always-failing rule.
    #[must_use]
    pub fn failing() -> Self {
        Self::new(false)
    }

    /// Returns the values judged so far.
    #[must_use]
    pub fn seen(&self) -> Vec<FieldValue> {
        self.seen.lock().clone()
    }

    /// Returns the number of evaluations.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.seen.lock().len()
    }
}

impl ValidationRule for RecordingRule {
    fn evaluate(&self, value: &FieldValue, _submission: &Submission) -> bool {
        self.seen.lock().push(value.clone());
        self.verdict
    }
}
