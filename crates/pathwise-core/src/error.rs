use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pathwise operations.
///
/// Resolution diagnostics (missing modules, bad package entries) are not
/// errors; they are returned as [`crate::resolver::Resolution::Failed`].
/// This type carries only failures that should abort the caller.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read package.json at {path}: {source}")]
    PackageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed package.json at {path}: {source}")]
    MalformedPackageJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    Other(String),
}

impl Error {
    #[must_use]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}
