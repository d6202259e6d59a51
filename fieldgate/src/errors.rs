//! Error types for the fieldgate crate.
//!
//! Validation failures are not errors: they are plain data collected into a
//! [`FailureSet`](crate::ledger::FailureSet). The types here cover the few
//! things that can genuinely go wrong around the gate: the ledger backend,
//! configuration loading and malformed registrations.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for fieldgate operations.
#[derive(Debug, Error)]
pub enum FieldgateError {
    /// The error ledger backend failed.
    #[error("{0}")]
    Ledger(#[from] LedgerError),

    /// Settings could not be loaded.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// A rule registration was rejected.
    #[error("{0}")]
    Registration(#[from] RegistrationError),
}

/// Errors raised by an error ledger storage backend.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Reading or writing a ledger entry failed.
    #[error("Ledger I/O error for '{key}': {source}")]
    Io {
        /// Storage key of the entry.
        key: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A ledger entry could not be (de)serialized.
    #[error("Ledger serialization error for '{key}': {source}")]
    Serialization {
        /// Storage key of the entry.
        key: String,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },
}

impl LedgerError {
    /// Creates an I/O error for a storage key.
    #[must_use]
    pub fn io(key: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            key: key.into(),
            source,
        }
    }

    /// Creates a serialization error for a storage key.
    #[must_use]
    pub fn serialization(key: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            key: key.into(),
            source,
        }
    }
}

/// Errors raised while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file could not be read.
    #[error("Failed to read settings from {}: {source}", .path.display())]
    Read {
        /// Path of the settings file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The settings document is not valid.
    #[error("Invalid settings document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors raised when a rule registration is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// The target field name was empty or whitespace-only.
    #[error("Rule name cannot be empty or whitespace-only")]
    EmptyName,

    /// An explicit content type list was given but contained no types.
    #[error("Rule '{0}' must target at least one content type")]
    NoContentTypes(String),
}

/// Result alias used across the crate.
pub type Result<T, E = FieldgateError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_error_display() {
        assert_eq!(
            RegistrationError::EmptyName.to_string(),
            "Rule name cannot be empty or whitespace-only"
        );
        assert_eq!(
            RegistrationError::NoContentTypes("post_title".to_string()).to_string(),
            "Rule 'post_title' must target at least one content type"
        );
    }

    #[test]
    fn test_ledger_error_wraps_into_top_level() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: FieldgateError = LedgerError::io("save_post_error_1_2", io).into();

        assert!(matches!(err, FieldgateError::Ledger(LedgerError::Io { .. })));
        assert!(err.to_string().contains("save_post_error_1_2"));
    }

    #[test]
    fn test_config_error_from_serde() {
        let parse = serde_json::from_str::<serde_json::Value>("{ nope").unwrap_err();
        let err: FieldgateError = ConfigError::from(parse).into();
        assert!(err.to_string().starts_with("Invalid settings document"));
    }
}
