//! Parsed package.json descriptors and the shared package cache.

use super::side_effects::SideEffects;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

/// package.json fields that may hold an alias map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasField {
    Source,
    Alias,
    Browser,
}

impl AliasField {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Alias => "alias",
            Self::Browser => "browser",
        }
    }
}

/// A parsed package.json with the fields the resolver needs pulled out.
///
/// Immutable once inserted into a [`PackageCache`].
#[derive(Debug, Clone, PartialEq)]
pub struct PackageDescriptor {
    /// Directory containing the package.json.
    pub dir: PathBuf,
    /// Absolute path of the package.json.
    pub file: PathBuf,
    pub name: Option<String>,
    pub source: Option<Value>,
    pub alias: Option<Value>,
    pub browser: Option<Value>,
    pub side_effects: Option<SideEffects>,
    raw: Value,
}

impl PackageDescriptor {
    /// Parse package.json text located at `file`.
    pub fn parse(file: &Path, content: &str) -> Result<Self, serde_json::Error> {
        let raw: Value = serde_json::from_str(content)?;
        Ok(Self::from_value(file, raw))
    }

    /// Build a descriptor from an already-parsed value.
    #[must_use]
    pub fn from_value(file: &Path, raw: Value) -> Self {
        let dir = file.parent().map(Path::to_path_buf).unwrap_or_default();
        Self {
            dir,
            file: file.to_path_buf(),
            name: raw.get("name").and_then(Value::as_str).map(str::to_string),
            source: non_null(raw.get("source")),
            alias: non_null(raw.get("alias")),
            browser: non_null(raw.get("browser")),
            side_effects: raw.get("sideEffects").and_then(SideEffects::from_json),
            raw,
        }
    }

    /// Drop the `source` field. Used for packages that are not symlinked
    /// into the project, whose `source` points at unpublished files.
    pub fn strip_source(&mut self) {
        self.source = None;
    }

    /// Value of an arbitrary top-level field, honoring a stripped `source`.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        match name {
            "source" => self.source.as_ref(),
            "alias" => self.alias.as_ref(),
            "browser" => self.browser.as_ref(),
            _ => self.raw.get(name).filter(|v| !v.is_null()),
        }
    }

    /// Object-valued alias map in `field`, if any.
    #[must_use]
    pub fn alias_map(&self, field: AliasField) -> Option<&Map<String, Value>> {
        let value = match field {
            AliasField::Source => self.source.as_ref(),
            AliasField::Alias => self.alias.as_ref(),
            AliasField::Browser => self.browser.as_ref(),
        };
        value.and_then(Value::as_object)
    }
}

fn non_null(value: Option<&Value>) -> Option<Value> {
    value.filter(|v| !v.is_null()).cloned()
}

/// Process-wide store of parsed package.json files keyed by absolute path.
///
/// Grow-only: entries are never mutated or evicted individually. Concurrent
/// inserts for the same key keep whichever landed first, so every reader
/// observes a single descriptor per file. [`PackageCache::clear`] resets the
/// cache between independent builds.
#[derive(Debug, Default)]
pub struct PackageCache {
    entries: RwLock<HashMap<PathBuf, Arc<PackageDescriptor>>>,
}

impl PackageCache {
    /// Create a new empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a descriptor by package.json path.
    #[must_use]
    pub fn get(&self, file: &Path) -> Option<Arc<PackageDescriptor>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(file)
            .cloned()
    }

    /// Insert a descriptor unless one is already cached for the same file.
    ///
    /// Returns the descriptor that is cached after the call.
    pub fn insert(&self, descriptor: PackageDescriptor) -> Arc<PackageDescriptor> {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        entries
            .entry(descriptor.file.clone())
            .or_insert_with(|| Arc::new(descriptor))
            .clone()
    }

    /// Number of cached descriptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all entries.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
