//! `sideEffects` classification for tree-shaking.

use super::glob::matches_side_effects;
use super::package::PackageDescriptor;
use pathwise_util::path;
use serde_json::Value;
use std::path::Path;

/// Parsed `sideEffects` field of a package.json.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideEffects {
    /// `true` or `false` for every file in the package.
    Flag(bool),
    /// A single glob of files that have side effects.
    Glob(String),
    /// Any entry matching means the file has side effects.
    Any(Vec<SideEffects>),
}

impl SideEffects {
    /// Interpret a raw JSON value. Unsupported shapes are treated as absent.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Self::Flag(*b)),
            Value::String(s) => Some(Self::Glob(s.clone())),
            Value::Array(items) => Some(Self::Any(
                items.iter().filter_map(Self::from_json).collect(),
            )),
            _ => None,
        }
    }

    /// Whether a file at `relative` (to the package root) has side effects.
    #[must_use]
    pub fn matches(&self, relative: &str) -> bool {
        match self {
            Self::Flag(b) => *b,
            Self::Glob(pattern) => matches_side_effects(pattern, relative),
            Self::Any(entries) => entries.iter().any(|e| e.matches(relative)),
        }
    }
}

/// Whether `file_path` inside `pkg` may have side effects.
///
/// Files in packages without a `sideEffects` field are assumed to have them.
#[must_use]
pub fn has_side_effects(file_path: &Path, pkg: &PackageDescriptor) -> bool {
    let Some(side_effects) = &pkg.side_effects else {
        return true;
    };
    let relative =
        path::normalize_separators(&path::relative(&pkg.dir, file_path).to_string_lossy());
    side_effects.matches(&relative)
}
