//! Specifier classification.
//!
//! - Absolute: `/src/app` (relative to the project root, not the filesystem root)
//! - Tilde: `~/src/app` (relative to the nearest package root)
//! - Relative: `./utils`, `../lib/foo`
//! - Bare: `lodash`, `@scope/pkg`, `react/jsx-runtime`

use super::fs::FileSystem;
use pathwise_util::path;
use std::path::{Path, PathBuf};

/// Kind of an import specifier, decided by its first character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecifierKind {
    Absolute,
    Tilde,
    Relative,
    Bare,
}

impl SpecifierKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Absolute => "absolute",
            Self::Tilde => "tilde",
            Self::Relative => "relative",
            Self::Bare => "bare",
        }
    }
}

/// Classify a specifier.
#[must_use]
pub fn classify(spec: &str) -> SpecifierKind {
    match spec.as_bytes().first() {
        Some(b'/') => SpecifierKind::Absolute,
        Some(b'~') => SpecifierKind::Tilde,
        Some(b'.') => SpecifierKind::Relative,
        _ => SpecifierKind::Bare,
    }
}

/// Turn a specifier into an absolute path, or return it unchanged if it
/// names a module.
///
/// `dir` is the directory of the referring file. URL-context bare
/// specifiers (`url(image.png)` in CSS) are relative paths.
pub fn resolve_filename(
    fs: &dyn FileSystem,
    project_root: &Path,
    spec: &str,
    dir: &Path,
    is_url: bool,
) -> String {
    match classify(spec) {
        SpecifierKind::Absolute => path::resolve(project_root, &spec[1..])
            .to_string_lossy()
            .into_owned(),
        SpecifierKind::Tilde => {
            let root = tilde_root(fs, project_root, dir);
            path::join(&root, &spec[1..]).to_string_lossy().into_owned()
        }
        SpecifierKind::Relative => path::resolve(dir, spec).to_string_lossy().into_owned(),
        SpecifierKind::Bare if is_url => path::resolve(dir, spec).to_string_lossy().into_owned(),
        SpecifierKind::Bare => spec.to_string(),
    }
}

/// Directory a `~` specifier is relative to: the nearest module root inside
/// `node_modules`, the nearest directory with a package.json, or the project
/// root, whichever comes first.
fn tilde_root(fs: &dyn FileSystem, project_root: &Path, start: &Path) -> PathBuf {
    let inside_node_modules = start.to_string_lossy().contains("node_modules");
    let mut dir = start.to_path_buf();

    while dir != project_root
        && !dir
            .parent()
            .and_then(Path::file_name)
            .is_some_and(|n| n == "node_modules")
        && (inside_node_modules || !fs.exists(&dir.join("package.json")))
    {
        match dir.parent() {
            // Reaching the filesystem root means we started outside the project.
            Some(parent) if parent.parent().is_some() => dir = parent.to_path_buf(),
            _ => return project_root.to_path_buf(),
        }
    }

    dir
}

/// Split a bare specifier into module name and optional sub-path.
///
/// `lodash/fp/map` -> (`lodash`, `fp/map`), `@scope/pkg/sub` -> (`@scope/pkg`, `sub`).
/// Separators are normalized to `/`; an empty sub-path is `None`.
#[must_use]
pub fn module_parts(name: &str) -> (String, Option<String>) {
    let name = path::normalize_separators(name);
    let name = name.trim_start_matches("./");

    let first = name.find('/');
    let split_on = if name.starts_with('@') {
        first.and_then(|i| name[i + 1..].find('/').map(|j| i + 1 + j))
    } else {
        first
    };

    match split_on {
        None => (name.to_string(), None),
        Some(i) => {
            let sub = &name[i + 1..];
            let sub = if sub.is_empty() {
                None
            } else {
                Some(sub.to_string())
            };
            (name[..i].to_string(), sub)
        }
    }
}
