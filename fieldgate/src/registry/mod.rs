//! The rule store: content type to ordered list of registered rules.

mod spec;

pub use spec::{CallbackMatch, ContentTypes, RuleSpec};

use crate::errors::RegistrationError;
use crate::host::ContentTypeCatalog;
use crate::rules::{prettify, CallbackResolver, Rule};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Registry of validation rules, keyed by content type.
///
/// Rules keep their insertion order, which is also the order failures are
/// reported in. Registration does not de-duplicate: registering the same
/// name and callback twice yields two rules.
pub struct RuleRegistry {
    rules: RwLock<HashMap<String, Vec<Rule>>>,
    catalog: Arc<dyn ContentTypeCatalog>,
    resolver: CallbackResolver,
    builtins_installed: AtomicBool,
}

impl RuleRegistry {
    /// Creates an empty registry expanding "any" through `catalog`.
    #[must_use]
    pub fn new(catalog: Arc<dyn ContentTypeCatalog>) -> Self {
        Self::with_resolver(catalog, CallbackResolver::new())
    }

    /// Creates an empty registry with a custom callback resolver.
    #[must_use]
    pub fn with_resolver(catalog: Arc<dyn ContentTypeCatalog>, resolver: CallbackResolver) -> Self {
        Self {
            rules: RwLock::new(HashMap::new()),
            catalog,
            resolver,
            builtins_installed: AtomicBool::new(false),
        }
    }

    /// Returns the callback resolver.
    #[must_use]
    pub fn resolver(&self) -> &CallbackResolver {
        &self.resolver
    }

    /// Expands a content type selector into concrete type names.
    ///
    /// "any" means every public type the catalog knows right now.
    #[must_use]
    pub fn expand(&self, content_types: &ContentTypes) -> Vec<String> {
        match content_types {
            ContentTypes::Any => self.catalog.public_types(),
            ContentTypes::One(t) => vec![t.clone()],
            ContentTypes::Many(types) => types.clone(),
        }
    }

    /// Registers a rule for every targeted content type.
    ///
    /// Returns the content types the rule was appended to.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError`] for an empty name or an empty explicit
    /// content type list.
    pub fn register(&self, spec: RuleSpec) -> Result<Vec<String>, RegistrationError> {
        if spec.name.trim().is_empty() {
            return Err(RegistrationError::EmptyName);
        }
        if matches!(&spec.content_types, ContentTypes::Many(types) if types.is_empty()) {
            return Err(RegistrationError::NoContentTypes(spec.name));
        }

        let types = self.expand(&spec.content_types);
        let message = match spec.message {
            Some(message) if !message.is_empty() => message,
            _ => {
                let label = spec.label.unwrap_or_else(|| prettify(&spec.name));
                format!("{label} is required before you can publish.")
            }
        };

        let rule = Rule {
            name: spec.name,
            message,
            highlight: spec.highlight,
            callback: self
                .resolver
                .resolve_primary(spec.callback, !spec.checks.is_empty()),
            checks: spec.checks,
            severity: spec.severity,
        };

        {
            let mut rules = self.rules.write();
            for content_type in &types {
                rules.entry(content_type.clone()).or_default().push(rule.clone());
            }
        }

        debug!(
            rule = %rule.name,
            callback = ?rule.callback.as_ref().map(|c| c.identity()),
            content_types = ?types,
            "Registered rule"
        );

        Ok(types)
    }

    /// Removes rules named `name` from the targeted content types.
    ///
    /// Returns the number of rules removed. Content types left without rules
    /// are dropped from the registry.
    pub fn unregister(
        &self,
        name: &str,
        callback: &CallbackMatch,
        content_types: &ContentTypes,
    ) -> usize {
        let types = self.expand(content_types);
        let mut removed = 0;

        let mut rules = self.rules.write();
        for content_type in &types {
            let Some(list) = rules.get_mut(content_type) else {
                continue;
            };

            let before = list.len();
            list.retain(|rule| {
                if rule.name != name {
                    return true;
                }
                match callback {
                    CallbackMatch::All => false,
                    CallbackMatch::Rule(cb) => !self
                        .resolver
                        .matches_primary(rule.callback.as_ref(), cb.as_ref()),
                }
            });
            removed += before - list.len();

            if list.is_empty() {
                rules.remove(content_type);
            }
        }
        drop(rules);

        debug!(rule = %name, ?callback, content_types = ?types, removed, "Unregistered rule");
        removed
    }

    /// Returns the rules for a content type, in registration order.
    #[must_use]
    pub fn rules_for(&self, content_type: &str) -> Vec<Rule> {
        self.rules
            .read()
            .get(content_type)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns true if the content type has at least one rule.
    #[must_use]
    pub fn has_rules(&self, content_type: &str) -> bool {
        self.rules.read().contains_key(content_type)
    }

    /// Lists the content types with rules, sorted.
    #[must_use]
    pub fn content_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.rules.read().keys().cloned().collect();
        types.sort();
        types
    }

    /// Returns the total number of rules across all content types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.read().values().map(Vec::len).sum()
    }

    /// Returns true if no rules are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.read().is_empty()
    }

    /// Removes every rule and re-arms built-in installation (primarily for tests).
    pub fn clear(&self) {
        self.rules.write().clear();
        self.builtins_installed.store(false, Ordering::SeqCst);
    }

    /// Claims the one-time built-in installation.
    ///
    /// Returns true exactly once per registry.
    pub(crate) fn claim_builtins(&self) -> bool {
        self.builtins_installed
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Returns true once built-in rules have been installed.
    #[must_use]
    pub fn builtins_installed(&self) -> bool {
        self.builtins_installed.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("content_types", &self.content_types())
            .field("rule_count", &self.len())
            .field("builtins_installed", &self.builtins_installed())
            .finish()
    }
}
