//! Hook for package managers that serve modules from a virtual filesystem
//! (Yarn Plug'n'Play and similar).

use std::fmt::Debug;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PnpError {
    #[error("package `{request}` is not declared as a dependency of {issuer}")]
    UndeclaredDependency { request: String, issuer: PathBuf },

    #[error("{0}")]
    Other(String),
}

/// Resolves bare module names through a package manager's dependency map.
///
/// Consulted only when no `node_modules` directory provides the module and
/// the request has a referrer.
pub trait PnpApi: Send + Sync + Debug {
    /// Directory of the package providing `request` to `issuer`.
    ///
    /// `Ok(None)` means the package manager does not know the module; the
    /// resolver then reports it as not found. An `Err` excludes the module.
    fn resolve_to_unqualified(&self, request: &str, issuer: &Path)
        -> Result<Option<PathBuf>, PnpError>;

    /// Manifest whose changes invalidate every PnP-backed resolution.
    fn manifest_path(&self) -> PathBuf;
}
