//! Located field values.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The value a rule sees for its target field.
///
/// Primary submission keys resolve to [`FieldValue::Scalar`] even when the
/// submitted value is itself an array. Multi-valued metadata resolves to
/// [`FieldValue::List`]. Fields found nowhere are [`FieldValue::Missing`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// A single value.
    Scalar(Value),
    /// Several metadata values stored under the same key.
    List(Vec<Value>),
    /// The field was not present anywhere.
    Missing,
}

impl FieldValue {
    /// Wraps a string as a scalar value.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Scalar(Value::String(value.into()))
    }

    /// Returns true if the field was not found.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Returns the scalar value, if any.
    #[must_use]
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Self::Scalar(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the scalar value as a string slice, if it is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(Value::as_str)
    }

    /// Interprets the scalar value as an unsigned id.
    ///
    /// Accepts JSON numbers and numeric strings, which is how hosts usually
    /// submit attachment and term ids.
    #[must_use]
    pub fn as_id(&self) -> Option<u64> {
        self.as_scalar().and_then(value_as_id)
    }

    /// Boolean coercion of the value.
    ///
    /// `null`, `false`, `0`, `0.0`, `""`, `"0"`, empty arrays, empty objects,
    /// empty lists and missing fields are all false; everything else is true.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Scalar(v) => value_is_truthy(v),
            Self::List(values) => !values.is_empty(),
            Self::Missing => false,
        }
    }

    /// Returns a copy with string contents trimmed.
    #[must_use]
    pub fn trimmed(&self) -> Self {
        match self {
            Self::Scalar(Value::String(s)) => Self::Scalar(Value::String(s.trim().to_string())),
            other => other.clone(),
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        Self::Scalar(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

/// Boolean coercion for a raw JSON value.
#[must_use]
pub fn value_is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Reads an id out of a number or numeric string.
#[must_use]
pub fn value_as_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthiness() {
        assert!(!FieldValue::Missing.is_truthy());
        assert!(!FieldValue::Scalar(json!(null)).is_truthy());
        assert!(!FieldValue::Scalar(json!(false)).is_truthy());
        assert!(!FieldValue::Scalar(json!(0)).is_truthy());
        assert!(!FieldValue::Scalar(json!(0.0)).is_truthy());
        assert!(!FieldValue::text("").is_truthy());
        assert!(!FieldValue::text("0").is_truthy());
        assert!(!FieldValue::Scalar(json!([])).is_truthy());
        assert!(!FieldValue::List(vec![]).is_truthy());

        assert!(FieldValue::text(" ").is_truthy());
        assert!(FieldValue::text("no").is_truthy());
        assert!(FieldValue::Scalar(json!(true)).is_truthy());
        assert!(FieldValue::Scalar(json!(-1)).is_truthy());
        assert!(FieldValue::List(vec![json!("")]).is_truthy());
    }

    #[test]
    fn test_trimmed_only_touches_strings() {
        assert_eq!(FieldValue::text("  hi ").trimmed(), FieldValue::text("hi"));
        assert_eq!(
            FieldValue::List(vec![json!(" a ")]).trimmed(),
            FieldValue::List(vec![json!(" a ")])
        );
    }

    #[test]
    fn test_as_id() {
        assert_eq!(FieldValue::Scalar(json!(42)).as_id(), Some(42));
        assert_eq!(FieldValue::text("17").as_id(), Some(17));
        assert_eq!(FieldValue::text("abc").as_id(), None);
        assert_eq!(FieldValue::Missing.as_id(), None);
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_value(FieldValue::List(vec![json!("a")])).unwrap();
        assert_eq!(json, json!({"kind": "list", "value": ["a"]}));

        let missing = serde_json::to_value(FieldValue::Missing).unwrap();
        assert_eq!(missing, json!({"kind": "missing"}));
    }
}
