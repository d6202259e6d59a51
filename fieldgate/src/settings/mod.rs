//! Administrator settings for the built-in rules.
//!
//! The gate reads settings through [`SettingsSource`], a plain get-by-key
//! lookup. Keys follow the host option names:
//!
//! - `require_<builtin>`: enables a built-in rule for its default types
//! - `require_<builtin>_<type>`: per content type override
//! - `require_image_size_<type>`: minimum featured image size, as
//!   `[width, height]` or `{"width": w, "height": h}`

use crate::core::value_is_truthy;
use crate::errors::ConfigError;
use crate::host::Dimensions;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Get-by-key access to persisted settings.
#[cfg_attr(test, mockall::automock)]
pub trait SettingsSource: Send + Sync {
    /// Returns the stored value for `key`, if any.
    fn get(&self, key: &str) -> Option<Value>;
}

impl SettingsSource for HashMap<String, Value> {
    fn get(&self, key: &str) -> Option<Value> {
        HashMap::get(self, key).cloned()
    }
}

/// Settings key enabling a built-in rule globally.
#[must_use]
pub fn require_key(builtin: &str) -> String {
    format!("require_{builtin}")
}

/// Settings key enabling a built-in rule for one content type.
#[must_use]
pub fn require_type_key(builtin: &str, content_type: &str) -> String {
    format!("require_{builtin}_{content_type}")
}

/// Settings key holding the minimum image size for a content type.
#[must_use]
pub fn image_size_key(content_type: &str) -> String {
    format!("require_image_size_{content_type}")
}

/// Returns true if `builtin` is enabled for `content_type`.
///
/// A per-type setting wins over the global one.
pub fn builtin_enabled(source: &dyn SettingsSource, builtin: &str, content_type: &str) -> bool {
    source
        .get(&require_type_key(builtin, content_type))
        .or_else(|| source.get(&require_key(builtin)))
        .is_some_and(|v| value_is_truthy(&v))
}

/// Returns the configured minimum image size for a content type.
///
/// Missing or malformed settings yield `(0, 0)`.
pub fn image_size_minimum(source: &dyn SettingsSource, content_type: &str) -> Dimensions {
    source
        .get(&image_size_key(content_type))
        .and_then(|v| parse_dimensions(&v))
        .unwrap_or_default()
}

fn parse_dimensions(value: &Value) -> Option<Dimensions> {
    let side = |v: &Value| -> Option<u32> {
        match v {
            Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            Value::String(s) if s.trim().is_empty() => Some(0),
            Value::String(s) => s.trim().parse().ok(),
            Value::Null => Some(0),
            _ => None,
        }
    };

    match value {
        Value::Array(items) if items.len() == 2 => {
            Some(Dimensions::new(side(&items[0])?, side(&items[1])?))
        }
        Value::Object(map) => Some(Dimensions::new(
            map.get("width").map_or(Some(0), side)?,
            map.get("height").map_or(Some(0), side)?,
        )),
        _ => None,
    }
}

/// Settings for one content type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSettings {
    /// Built-in rules switched on or off for this type.
    #[serde(default)]
    pub required: HashMap<String, bool>,
    /// Minimum featured image size.
    #[serde(default)]
    pub image_size: Option<Dimensions>,
}

/// Serializable settings document.
///
/// ```json
/// {
///   "required": { "post_title": true },
///   "content_types": {
///     "post": { "required": { "post_excerpt": true }, "image_size": { "width": 800, "height": 600 } }
///   },
///   "options": { "require_category": 1 }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GateSettings {
    /// Built-in rules switched on or off for their default types.
    #[serde(default)]
    pub required: HashMap<String, bool>,
    /// Per content type settings.
    #[serde(default)]
    pub content_types: HashMap<String, TypeSettings>,
    /// Raw options, looked up verbatim before anything else.
    #[serde(default)]
    pub options: HashMap<String, Value>,
}

impl GateSettings {
    /// Creates empty settings: every built-in disabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses settings from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads settings from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Enables a built-in rule for its default types.
    #[must_use]
    pub fn with_required(mut self, builtin: impl Into<String>) -> Self {
        self.required.insert(builtin.into(), true);
        self
    }

    /// Enables or disables a built-in rule for one content type.
    #[must_use]
    pub fn with_type_required(
        mut self,
        content_type: impl Into<String>,
        builtin: impl Into<String>,
        enabled: bool,
    ) -> Self {
        self.content_types
            .entry(content_type.into())
            .or_default()
            .required
            .insert(builtin.into(), enabled);
        self
    }

    /// Sets the minimum featured image size for a content type.
    #[must_use]
    pub fn with_image_size(mut self, content_type: impl Into<String>, size: Dimensions) -> Self {
        self.content_types
            .entry(content_type.into())
            .or_default()
            .image_size = Some(size);
        self
    }

    /// Sets a raw option.
    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }
}

impl SettingsSource for GateSettings {
    fn get(&self, key: &str) -> Option<Value> {
        if let Some(v) = self.options.get(key) {
            return Some(v.clone());
        }

        for (content_type, settings) in &self.content_types {
            if let Some(size) = settings.image_size {
                if key == image_size_key(content_type) {
                    return Some(serde_json::json!([size.width, size.height]));
                }
            }
            for (builtin, enabled) in &settings.required {
                if key == require_type_key(builtin, content_type) {
                    return Some(Value::Bool(*enabled));
                }
            }
        }

        self.required
            .iter()
            .find(|(builtin, _)| key == require_key(builtin))
            .map(|(_, enabled)| Value::Bool(*enabled))
    }
}
