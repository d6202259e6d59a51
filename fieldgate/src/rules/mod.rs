//! Validation rules: the rule capability, callback resolution and the
//! built-in rules.

mod builtin;
mod resolver;
mod rule;

pub use builtin::{not_empty, HasCategory, HasTag, ImageSize, IsTrue, NotEmpty, UNCATEGORIZED_ID};
pub use resolver::{prettify, sanitize_key, CallbackResolver};
pub use rule::{rule_fn, same_rule, FnRule, Rule, RuleOutcome, RuleRef, SubCheck, ValidationRule};
