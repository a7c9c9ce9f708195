//! Filesystem service consumed by the resolver.
//!
//! The resolver never touches `std::fs` directly; every lookup goes through
//! [`FileSystem`] so callers can inject an overlay or an in-memory tree.

use std::io;
use std::path::{Path, PathBuf};

/// Result of a `stat` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub is_dir: bool,
    pub is_file: bool,
}

/// Filesystem operations needed for module resolution.
///
/// Implementations must be thread-safe: many resolutions run concurrently
/// against one service.
pub trait FileSystem: Send + Sync + std::fmt::Debug {
    /// Whether anything exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Read a file as UTF-8 text.
    fn read_file(&self, path: &Path) -> io::Result<String>;

    /// Stat a path, following symlinks.
    fn stat(&self, path: &Path) -> io::Result<FileStat>;

    /// Canonicalize a path, resolving symlinks.
    fn realpath(&self, path: &Path) -> io::Result<PathBuf>;

    /// First candidate that is an existing file.
    fn find_first_file(&self, candidates: &[PathBuf]) -> Option<PathBuf> {
        candidates
            .iter()
            .find(|p| self.stat(p).is_ok_and(|s| s.is_file))
            .cloned()
    }

    /// Nearest file named one of `names` in `start_dir` or its ancestors.
    ///
    /// The search stops at a `node_modules` directory so that lookups from
    /// inside a package never escape into the package that vendors it.
    fn find_ancestor_file(&self, names: &[&str], start_dir: &Path) -> Option<PathBuf> {
        for dir in start_dir.ancestors() {
            if dir.file_name().is_some_and(|n| n == "node_modules") {
                return None;
            }
            for name in names {
                let candidate = dir.join(name);
                if self.stat(&candidate).is_ok_and(|s| s.is_file) {
                    return Some(candidate);
                }
            }
        }
        None
    }

    /// Nearest `node_modules/<name>` directory at or above `start_dir`.
    fn find_node_module(&self, name: &str, start_dir: &Path) -> Option<PathBuf> {
        for dir in start_dir.ancestors() {
            if dir.file_name().is_some_and(|n| n == "node_modules") {
                continue;
            }
            let candidate = dir.join("node_modules").join(name);
            if self.stat(&candidate).is_ok_and(|s| s.is_dir) {
                return Some(candidate);
            }
        }
        None
    }
}

/// [`FileSystem`] backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_file(&self, path: &Path) -> io::Result<String> {
        pathwise_util::fs::read_to_string_lossy(path)
    }

    fn stat(&self, path: &Path) -> io::Result<FileStat> {
        let meta = std::fs::metadata(path)?;
        Ok(FileStat {
            is_dir: meta.is_dir(),
            is_file: meta.is_file(),
        })
    }

    fn realpath(&self, path: &Path) -> io::Result<PathBuf> {
        dunce::canonicalize(path)
    }
}
