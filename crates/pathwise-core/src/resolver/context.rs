//! Invalidation records accumulated during one resolution.

use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// A file whose creation would change a resolution outcome.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum FileCreateInvalidation {
    /// An exact path.
    Path {
        #[serde(rename = "filePath")]
        file_path: PathBuf,
    },
    /// A file or directory named `file_name` in any ancestor of `above_file_path`.
    AboveFilePath {
        #[serde(rename = "fileName")]
        file_name: String,
        #[serde(rename = "aboveFilePath")]
        above_file_path: PathBuf,
    },
}

impl FileCreateInvalidation {
    #[must_use]
    pub fn path(file_path: impl Into<PathBuf>) -> Self {
        Self::Path {
            file_path: file_path.into(),
        }
    }

    #[must_use]
    pub fn above(file_name: impl Into<String>, above_file_path: impl Into<PathBuf>) -> Self {
        Self::AboveFilePath {
            file_name: file_name.into(),
            above_file_path: above_file_path.into(),
        }
    }
}

/// Watch records for one resolution, handed back verbatim to the caller.
///
/// Records are only appended. Duplicate create records are possible and left
/// for consumers to collapse; change records keep first-insertion order and
/// are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Invalidations {
    pub invalidate_on_file_create: Vec<FileCreateInvalidation>,
    pub invalidate_on_file_change: Vec<PathBuf>,
}

/// Request-scoped mutable state. Never shared between resolutions.
#[derive(Debug, Default)]
pub struct ResolutionContext {
    invalidations: Invalidations,
    watched: HashSet<PathBuf>,
}

impl ResolutionContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Watch for `path` being created.
    pub fn invalidate_on_create(&mut self, path: impl Into<PathBuf>) {
        self.invalidations
            .invalidate_on_file_create
            .push(FileCreateInvalidation::path(path));
    }

    /// Watch for a `file_name` appearing above `above_file_path`.
    pub fn invalidate_on_create_above(&mut self, file_name: impl Into<String>, above_file_path: &Path) {
        self.invalidations
            .invalidate_on_file_create
            .push(FileCreateInvalidation::above(file_name, above_file_path));
    }

    /// Watch `path` for changes.
    pub fn invalidate_on_change(&mut self, path: &Path) {
        if self.watched.insert(path.to_path_buf()) {
            self.invalidations
                .invalidate_on_file_change
                .push(path.to_path_buf());
        }
    }

    #[must_use]
    pub fn invalidations(&self) -> &Invalidations {
        &self.invalidations
    }

    /// Consume the context, yielding its records.
    #[must_use]
    pub fn into_invalidations(self) -> Invalidations {
        self.invalidations
    }
}
