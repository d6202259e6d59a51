//! Callback resolution and name formatting.

use super::builtin::not_empty;
use super::rule::{same_rule, RuleRef};
use regex::Regex;
use std::sync::OnceLock;

#[allow(clippy::expect_used)]
fn separator_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[_\-\[\]\s]+").expect("separator pattern is valid"))
}

#[allow(clippy::expect_used)]
fn unsafe_key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^a-z0-9]").expect("key pattern is valid"))
}

/// Turns a field name into a display label.
///
/// Runs of `_`, `-`, `[` and `]` become single spaces, the result is trimmed
/// and the first letter of every word is upper-cased.
///
/// ```
/// use fieldgate::rules::prettify;
/// assert_eq!(prettify("tax_input[post_tag]"), "Tax Input Post Tag");
/// ```
#[must_use]
pub fn prettify(name: &str) -> String {
    separator_pattern()
        .replace_all(name, " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Collapses a rule name into a safe identifier for ledger keys.
///
/// Lower-cases the name and replaces every non-alphanumeric character with
/// an underscore.
#[must_use]
pub fn sanitize_key(name: &str) -> String {
    unsafe_key_pattern()
        .replace_all(&name.to_lowercase(), "_")
        .into_owned()
}

/// Decides which callback a rule actually uses.
#[derive(Clone)]
pub struct CallbackResolver {
    default: RuleRef,
}

impl CallbackResolver {
    /// Creates a resolver falling back to the built-in not-empty rule.
    #[must_use]
    pub fn new() -> Self {
        Self {
            default: not_empty(),
        }
    }

    /// Creates a resolver with a custom fallback rule.
    #[must_use]
    pub fn with_default(default: RuleRef) -> Self {
        Self { default }
    }

    /// Returns the given callback, or the fallback when none was supplied.
    #[must_use]
    pub fn resolve(&self, callback: Option<RuleRef>) -> RuleRef {
        callback.unwrap_or_else(|| self.default.clone())
    }

    /// Resolves the primary callback of a rule.
    ///
    /// A rule with sub-checks and no callback gets no primary callback, so an
    /// optional field can carry format checks without becoming required.
    #[must_use]
    pub fn resolve_primary(&self, callback: Option<RuleRef>, has_checks: bool) -> Option<RuleRef> {
        match callback {
            Some(callback) => Some(callback),
            None if has_checks => None,
            None => Some(self.default.clone()),
        }
    }

    /// Returns the fallback rule.
    #[must_use]
    pub fn default_rule(&self) -> &RuleRef {
        &self.default
    }

    /// Returns true when `registered` matches what `callback` resolves to.
    #[must_use]
    pub fn matches(&self, registered: &RuleRef, callback: Option<&RuleRef>) -> bool {
        let resolved = callback.unwrap_or(&self.default);
        same_rule(registered, resolved)
    }

    /// Like [`matches`](Self::matches) for a possibly absent primary callback.
    ///
    /// A sub-check-only rule matches only an omitted callback.
    #[must_use]
    pub fn matches_primary(&self, registered: Option<&RuleRef>, callback: Option<&RuleRef>) -> bool {
        match registered {
            Some(registered) => self.matches(registered, callback),
            None => callback.is_none(),
        }
    }
}

impl Default for CallbackResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CallbackResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackResolver")
            .field("default", &self.default.identity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::builtin::{HasTag, NotEmpty};
    use crate::rules::rule::rule_fn;
    use std::sync::Arc;

    #[test]
    fn test_prettify() {
        assert_eq!(prettify("post_excerpt"), "Post Excerpt");
        assert_eq!(prettify("_thumbnail_id"), "Thumbnail Id");
        assert_eq!(prettify("my--custom__field"), "My Custom Field");
        assert_eq!(prettify("tax_input[post_tag]"), "Tax Input Post Tag");
        assert_eq!(prettify("ISBN_number"), "ISBN Number");
        assert_eq!(prettify("___"), "");
    }

    #[test]
    fn test_sanitize_key() {
        assert_eq!(sanitize_key("post_excerpt"), "post_excerpt");
        assert_eq!(sanitize_key("Post Excerpt"), "post_excerpt");
        assert_eq!(sanitize_key("tax_input[post_tag]"), "tax_input_post_tag_");
        assert_eq!(sanitize_key("sub-title"), "sub_title");
    }

    #[test]
    fn test_resolve_falls_back_to_not_empty() {
        let resolver = CallbackResolver::new();
        let resolved = resolver.resolve(None);
        assert_eq!(resolved.identity(), Some(NotEmpty::IDENTITY));

        let custom = rule_fn(|_, _| true);
        let kept = resolver.resolve(Some(custom.clone()));
        assert!(Arc::ptr_eq(&kept, &custom));
    }

    #[test]
    fn test_matches() {
        let resolver = CallbackResolver::new();
        let default_instance: RuleRef = Arc::new(NotEmpty);
        let tag: RuleRef = Arc::new(HasTag);

        assert!(resolver.matches(&default_instance, None));
        assert!(!resolver.matches(&tag, None));
        assert!(resolver.matches(&tag, Some(&(Arc::new(HasTag) as RuleRef))));
    }

    #[test]
    fn test_resolve_primary_skips_default_for_sub_check_rules() {
        let resolver = CallbackResolver::new();
        assert!(resolver.resolve_primary(None, true).is_none());
        assert_eq!(
            resolver.resolve_primary(None, false).unwrap().identity(),
            Some(NotEmpty::IDENTITY)
        );

        let tag: RuleRef = Arc::new(HasTag);
        assert!(Arc::ptr_eq(&resolver.resolve_primary(Some(tag.clone()), true).unwrap(), &tag));

        assert!(resolver.matches_primary(None, None));
        assert!(!resolver.matches_primary(None, Some(&tag)));
        assert!(resolver.matches_primary(Some(&tag), Some(&tag)));
    }
}
