//! Registration inputs.

use crate::core::Severity;
use crate::rules::{RuleRef, SubCheck};
use std::fmt;

/// The content types a registration targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentTypes {
    /// Every publicly visible content type known when the call is made.
    Any,
    /// A single content type.
    One(String),
    /// An explicit list of content types.
    Many(Vec<String>),
}

impl ContentTypes {
    /// Sentinel accepted by the string conversions for [`ContentTypes::Any`].
    pub const ANY: &'static str = "any";
}

impl Default for ContentTypes {
    fn default() -> Self {
        Self::Any
    }
}

impl From<&str> for ContentTypes {
    fn from(s: &str) -> Self {
        if s == Self::ANY {
            Self::Any
        } else {
            Self::One(s.to_string())
        }
    }
}

impl From<String> for ContentTypes {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<Vec<String>> for ContentTypes {
    fn from(types: Vec<String>) -> Self {
        Self::Many(types)
    }
}

impl From<Vec<&str>> for ContentTypes {
    fn from(types: Vec<&str>) -> Self {
        Self::Many(types.into_iter().map(String::from).collect())
    }
}

impl<const N: usize> From<[&str; N]> for ContentTypes {
    fn from(types: [&str; N]) -> Self {
        Self::Many(types.into_iter().map(String::from).collect())
    }
}

/// Which callbacks an unregister call removes.
#[derive(Clone)]
pub enum CallbackMatch {
    /// Every rule with the given name, whatever its callback.
    All,
    /// Rules whose callback matches this one once resolved; `None` means the
    /// default not-empty rule.
    Rule(Option<RuleRef>),
}

impl CallbackMatch {
    /// Matches rules registered with the default callback.
    #[must_use]
    pub const fn default_rule() -> Self {
        Self::Rule(None)
    }

    /// Matches rules registered with `rule`.
    #[must_use]
    pub fn rule(rule: RuleRef) -> Self {
        Self::Rule(Some(rule))
    }
}

impl Default for CallbackMatch {
    fn default() -> Self {
        Self::default_rule()
    }
}

impl fmt::Debug for CallbackMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "All"),
            Self::Rule(None) => write!(f, "Rule(default)"),
            Self::Rule(Some(rule)) => write!(f, "Rule({:?})", rule.identity()),
        }
    }
}

/// Everything needed to register a rule.
///
/// ```
/// use fieldgate::registry::RuleSpec;
///
/// let spec = RuleSpec::new("post_excerpt")
///     .with_content_types("post")
///     .with_highlight("#postexcerpt");
/// assert_eq!(spec.name, "post_excerpt");
/// ```
#[derive(Clone)]
pub struct RuleSpec {
    /// Target field name.
    pub name: String,
    /// Display label used when the message is synthesized.
    pub label: Option<String>,
    /// Failure message; synthesized from the label or name when empty.
    pub message: Option<String>,
    /// Callback; the default not-empty rule when absent.
    pub callback: Option<RuleRef>,
    /// Targeted content types.
    pub content_types: ContentTypes,
    /// UI element to highlight on failure.
    pub highlight: Option<String>,
    /// Additional checks listed as details on failure.
    pub checks: Vec<SubCheck>,
    /// Whether failures block publication.
    pub severity: Severity,
}

impl RuleSpec {
    /// Creates a spec for `name` with every other property defaulted.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            message: None,
            callback: None,
            content_types: ContentTypes::Any,
            highlight: None,
            checks: Vec::new(),
            severity: Severity::Error,
        }
    }

    /// Sets the display label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the failure message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the callback.
    #[must_use]
    pub fn with_callback(mut self, callback: RuleRef) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Sets the targeted content types.
    #[must_use]
    pub fn with_content_types(mut self, content_types: impl Into<ContentTypes>) -> Self {
        self.content_types = content_types.into();
        self
    }

    /// Sets the UI element to highlight.
    #[must_use]
    pub fn with_highlight(mut self, highlight: impl Into<String>) -> Self {
        self.highlight = Some(highlight.into());
        self
    }

    /// Adds a sub-check.
    #[must_use]
    pub fn with_check(mut self, message: impl Into<String>, rule: RuleRef) -> Self {
        self.checks.push(SubCheck::new(message, rule));
        self
    }

    /// Marks failures of this rule as non-blocking warnings.
    #[must_use]
    pub fn as_warning(mut self) -> Self {
        self.severity = Severity::Warning;
        self
    }
}

impl fmt::Debug for RuleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSpec")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("message", &self.message)
            .field("callback", &self.callback.as_ref().map(|c| c.identity()))
            .field("content_types", &self.content_types)
            .field("highlight", &self.highlight)
            .field("checks", &self.checks)
            .field("severity", &self.severity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_types_from_strings() {
        assert_eq!(ContentTypes::from("any"), ContentTypes::Any);
        assert_eq!(ContentTypes::from("post"), ContentTypes::One("post".to_string()));
        assert_eq!(
            ContentTypes::from(["post", "page"]),
            ContentTypes::Many(vec!["post".to_string(), "page".to_string()])
        );
    }

    #[test]
    fn test_spec_builder() {
        let spec = RuleSpec::new("subtitle")
            .with_label("Sub title")
            .with_message("Needs a subtitle")
            .with_content_types(vec!["book"])
            .as_warning();

        assert_eq!(spec.label.as_deref(), Some("Sub title"));
        assert_eq!(spec.message.as_deref(), Some("Needs a subtitle"));
        assert_eq!(spec.content_types, ContentTypes::Many(vec!["book".to_string()]));
        assert_eq!(spec.severity, Severity::Warning);
        assert!(spec.callback.is_none());
    }
}
