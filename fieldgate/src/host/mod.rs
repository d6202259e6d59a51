//! Boundary traits for the host content platform.
//!
//! The gate never talks to the host directly; it goes through these small
//! capabilities so the runner can be exercised in isolation. In-memory
//! implementations are provided for embedding and tests.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Width and height of an image, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Creates a new dimension pair.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns true when both sides are zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.width == 0 && self.height == 0
    }

    /// Returns true when both sides are strictly larger than `minimum`.
    #[must_use]
    pub const fn exceeds(&self, minimum: &Self) -> bool {
        self.width > minimum.width && self.height > minimum.height
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Lists the content types that "any" expands to.
#[cfg_attr(test, mockall::automock)]
pub trait ContentTypeCatalog: Send + Sync {
    /// Returns every publicly visible content type, in a stable order.
    fn public_types(&self) -> Vec<String>;
}

/// The auxiliary key to list-of-values store attached to content items.
#[cfg_attr(test, mockall::automock)]
pub trait MetadataStore: Send + Sync {
    /// Returns all values stored under `key` for the item, if the key exists.
    fn values(&self, item_id: u64, key: &str) -> Option<Vec<Value>>;
}

/// Access to uploaded media.
#[cfg_attr(test, mockall::automock)]
pub trait MediaLibrary: Send + Sync {
    /// Returns the pixel size of an image attachment, if it exists.
    fn image_dimensions(&self, attachment_id: u64) -> Option<Dimensions>;
}

/// A fixed list of public content types.
#[derive(Debug, Clone, Default)]
pub struct StaticContentTypes {
    types: Vec<String>,
}

impl StaticContentTypes {
    /// Creates a catalog from a list of type names.
    #[must_use]
    pub fn new<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            types: types.into_iter().map(Into::into).collect(),
        }
    }
}

impl ContentTypeCatalog for StaticContentTypes {
    fn public_types(&self) -> Vec<String> {
        self.types.clone()
    }
}

/// Thread-safe in-memory metadata store.
#[derive(Debug, Default)]
pub struct InMemoryMetadata {
    items: RwLock<HashMap<u64, HashMap<String, Vec<Value>>>>,
}

impl InMemoryMetadata {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value under `key` for the item.
    pub fn add(&self, item_id: u64, key: impl Into<String>, value: impl Into<Value>) {
        self.items
            .write()
            .entry(item_id)
            .or_default()
            .entry(key.into())
            .or_default()
            .push(value.into());
    }

    /// Replaces every value under `key` for the item.
    pub fn set(&self, item_id: u64, key: impl Into<String>, values: Vec<Value>) {
        self.items
            .write()
            .entry(item_id)
            .or_default()
            .insert(key.into(), values);
    }

    /// Removes the key for the item.
    pub fn remove(&self, item_id: u64, key: &str) {
        if let Some(meta) = self.items.write().get_mut(&item_id) {
            meta.remove(key);
        }
    }
}

impl MetadataStore for InMemoryMetadata {
    fn values(&self, item_id: u64, key: &str) -> Option<Vec<Value>> {
        self.items
            .read()
            .get(&item_id)
            .and_then(|meta| meta.get(key))
            .cloned()
    }
}

/// Thread-safe in-memory media library.
#[derive(Debug, Default)]
pub struct InMemoryMedia {
    images: RwLock<HashMap<u64, Dimensions>>,
}

impl InMemoryMedia {
    /// Creates an empty library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an image attachment.
    pub fn insert(&self, attachment_id: u64, dimensions: Dimensions) {
        self.images.write().insert(attachment_id, dimensions);
    }
}

impl MediaLibrary for InMemoryMedia {
    fn image_dimensions(&self, attachment_id: u64) -> Option<Dimensions> {
        self.images.read().get(&attachment_id).copied()
    }
}
