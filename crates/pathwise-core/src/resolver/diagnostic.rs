//! Structured resolution failures.
//!
//! A [`Diagnostic`] is a normal outcome of [`super::Resolver::resolve`], not an
//! error: it describes why one specifier could not be resolved and leaves
//! sibling resolutions unaffected.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Stable diagnostic codes, shared with JSON output.
pub mod codes {
    pub const MODULE_NOT_FOUND: &str = "MODULE_NOT_FOUND";
    pub const FILE_NOT_FOUND: &str = "FILE_NOT_FOUND";
    pub const PACKAGE_ENTRY_INVALID: &str = "PACKAGE_ENTRY_INVALID";
    pub const INVALID_GLOBAL_ALIAS: &str = "INVALID_GLOBAL_ALIAS";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A bare module is absent from every `node_modules` above the referrer.
    ModuleNotFound,
    /// A path specifier matched no candidate file or directory.
    FileNotFound,
    /// A package.json entry field points at nothing loadable.
    PackageEntryInvalid,
    /// A `{ "global": ... }` alias is missing its name.
    InvalidGlobalAlias,
}

impl DiagnosticKind {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::ModuleNotFound => codes::MODULE_NOT_FOUND,
            Self::FileNotFound => codes::FILE_NOT_FOUND,
            Self::PackageEntryInvalid => codes::PACKAGE_ENTRY_INVALID,
            Self::InvalidGlobalAlias => codes::INVALID_GLOBAL_ALIAS,
        }
    }
}

/// A highlighted byte range inside a [`CodeFrame`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeHighlight {
    pub start: usize,
    pub end: usize,
    pub message: Option<String>,
}

/// Source excerpt attached to a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeFrame {
    pub file_path: PathBuf,
    pub language: String,
    pub code: String,
    pub highlights: Vec<CodeHighlight>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub code: &'static str,
    pub message: String,
    pub hints: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_frame: Option<CodeFrame>,
}

impl Diagnostic {
    #[must_use]
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: kind.code(),
            message: message.into(),
            hints: Vec::new(),
            code_frame: None,
        }
    }

    #[must_use]
    pub fn with_hints(mut self, hints: Vec<String>) -> Self {
        self.hints = hints;
        self
    }

    #[must_use]
    pub fn with_code_frame(mut self, frame: CodeFrame) -> Self {
        self.code_frame = Some(frame);
        self
    }

    pub(crate) fn module_not_found(module: &str, alternatives: &[String]) -> Self {
        Self::new(
            DiagnosticKind::ModuleNotFound,
            format!("Cannot find module '{module}'"),
        )
        .with_hints(did_you_mean(alternatives))
    }

    pub(crate) fn invalid_global_alias(filename: &str) -> Self {
        Self::new(
            DiagnosticKind::InvalidGlobalAlias,
            format!("The global alias for {filename} is invalid."),
        )
        .with_hints(vec![
            "Only nonzero-length strings are valid global aliases.".to_string(),
        ])
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

pub(crate) fn did_you_mean(alternatives: &[String]) -> Vec<String> {
    alternatives
        .iter()
        .map(|a| format!("Did you mean '{a}'?"))
        .collect()
}
