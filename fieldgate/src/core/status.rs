//! Content status, save action and severity enums.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The publication status of a content item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContentStatus {
    /// Work in progress, not visible.
    Draft,
    /// Awaiting review.
    Pending,
    /// Publicly visible.
    Publish,
    /// Scheduled for publication.
    Future,
    /// Published but restricted.
    Private,
    /// Created by the host before the first real save.
    AutoDraft,
    /// Moved to the trash.
    Trash,
    /// Any other host-specific status.
    Other(String),
}

impl ContentStatus {
    /// Returns the wire name of the status.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Publish => "publish",
            Self::Future => "future",
            Self::Private => "private",
            Self::AutoDraft => "auto-draft",
            Self::Trash => "trash",
            Self::Other(s) => s,
        }
    }

    /// Returns true for statuses that make the item visible (now or later).
    #[must_use]
    pub fn is_published(&self) -> bool {
        matches!(self, Self::Publish | Self::Future | Self::Private)
    }
}

impl Default for ContentStatus {
    fn default() -> Self {
        Self::Draft
    }
}

impl fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ContentStatus {
    fn from(s: &str) -> Self {
        match s {
            "draft" => Self::Draft,
            "pending" => Self::Pending,
            "publish" => Self::Publish,
            "future" => Self::Future,
            "private" => Self::Private,
            "auto-draft" => Self::AutoDraft,
            "trash" => Self::Trash,
            other => Self::Other(other.to_string()),
        }
    }
}

impl FromStr for ContentStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl Serialize for ContentStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ContentStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s.as_str()))
    }
}

/// What the user asked for when submitting the edit form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveAction {
    /// The publish (or schedule) button: an attempt to go live.
    Publish,
    /// The save-draft button.
    SaveDraft,
    /// Any other save, including updates of already-published items.
    Update,
}

impl SaveAction {
    /// Infers the action from the raw submission's submit-button keys.
    #[must_use]
    pub fn from_submission(submission: &super::Submission) -> Self {
        if submission.contains_key("publish") {
            Self::Publish
        } else if submission.contains_key("save") {
            Self::SaveDraft
        } else {
            Self::Update
        }
    }

    /// Returns true for publish attempts.
    #[must_use]
    pub fn is_publish(self) -> bool {
        self == Self::Publish
    }
}

impl Default for SaveAction {
    fn default() -> Self {
        Self::Update
    }
}

impl fmt::Display for SaveAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Publish => write!(f, "publish"),
            Self::SaveDraft => write!(f, "save_draft"),
            Self::Update => write!(f, "update"),
        }
    }
}

/// How serious a failed rule is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Blocks publication.
    Error,
    /// Shown to the user but never blocks publication.
    Warning,
}

impl Default for Severity {
    fn default() -> Self {
        Self::Error
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}
