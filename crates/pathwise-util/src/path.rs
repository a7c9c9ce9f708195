//! Node-style path arithmetic.
//!
//! `std::path` joins never collapse `.`/`..` segments and treat an absolute
//! right-hand side as a replacement. Module resolution needs the lexical
//! semantics of Node's `path` module instead, so these helpers provide them.

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

/// Lexically normalize a path, collapsing `.` and `..` segments.
///
/// `..` never climbs above the root of an absolute path. Leading `..`
/// segments of a relative path are kept.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }

    if out.is_empty() {
        return PathBuf::from(".");
    }

    out.iter().map(|c| c.as_os_str()).collect()
}

/// Resolve `spec` against `base` like Node's `path.resolve(base, spec)`.
///
/// An absolute `spec` wins over `base`.
#[must_use]
pub fn resolve(base: &Path, spec: &str) -> PathBuf {
    normalize(&base.join(spec))
}

/// Join `spec` onto `base` like Node's `path.join(base, spec)`.
///
/// Unlike [`resolve`], leading separators in `spec` do not make it absolute.
#[must_use]
pub fn join(base: &Path, spec: &str) -> PathBuf {
    let trimmed = spec.trim_start_matches(['/', '\\']);
    normalize(&base.join(trimmed))
}

/// Compute the lexical relative path from directory `from` to `to`.
#[must_use]
pub fn relative(from: &Path, to: &Path) -> PathBuf {
    let from = normalize(from);
    let to = normalize(to);

    let from_parts: Vec<Component<'_>> = from.components().collect();
    let to_parts: Vec<Component<'_>> = to.components().collect();

    let common = from_parts
        .iter()
        .zip(&to_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut out = PathBuf::new();
    for part in &from_parts[common..] {
        if matches!(part, Component::Normal(_)) {
            out.push("..");
        }
    }
    for part in &to_parts[common..] {
        out.push(part.as_os_str());
    }
    out
}

/// Relative path from `from` to `to` as a forward-slash string with a
/// leading `./` unless it already starts with a dot.
#[must_use]
pub fn relative_path(from: &Path, to: &Path) -> String {
    let rel = normalize_separators(&relative(from, to).to_string_lossy());
    if rel.starts_with('.') {
        rel
    } else {
        format!("./{rel}")
    }
}

/// Replace Windows separators with forward slashes.
#[must_use]
pub fn normalize_separators(s: &str) -> String {
    s.replace('\\', "/")
}

/// Extension of the last path segment, including the dot.
///
/// Mirrors Node's `path.extname`: dotfiles like `.babelrc` have no
/// extension, a trailing dot yields `"."`.
#[must_use]
pub fn extname(path: &str) -> &str {
    let base_start = path.rfind(['/', '\\']).map_or(0, |i| i + 1);
    let base = &path[base_start..];
    let trimmed = base.trim_start_matches('.');
    let leading = base.len() - trimmed.len();

    match trimmed.rfind('.') {
        Some(i) => &base[leading + i..],
        None => "",
    }
}

/// Append a raw suffix to a path without inserting a separator.
#[must_use]
pub fn append(path: &Path, suffix: &str) -> PathBuf {
    let mut s: OsString = path.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

/// Join two forward-slash paths like Node's `path.posix.join`.
#[must_use]
pub fn posix_join(base: &str, rest: &str) -> String {
    let absolute = base.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for segment in base.split('/').chain(rest.split('/')) {
        match segment {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if absolute => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_dots() {
        assert_eq!(
            normalize(Path::new("/proj/src/../lib/./a.js")),
            PathBuf::from("/proj/lib/a.js")
        );
        assert_eq!(normalize(Path::new("/..")), PathBuf::from("/"));
        assert_eq!(normalize(Path::new("../a/./b")), PathBuf::from("../a/b"));
        assert_eq!(normalize(Path::new("a/..")), PathBuf::from("."));
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let base = Path::new("/proj/src");
        assert_eq!(resolve(base, "./foo"), PathBuf::from("/proj/src/foo"));
        assert_eq!(resolve(base, "../foo"), PathBuf::from("/proj/foo"));
        assert_eq!(resolve(base, "/abs/foo"), PathBuf::from("/abs/foo"));
    }

    #[test]
    fn test_join_ignores_leading_separator() {
        assert_eq!(
            join(Path::new("/proj"), "/src/index"),
            PathBuf::from("/proj/src/index")
        );
    }

    #[test]
    fn test_relative_path_prefixes_dot_slash() {
        assert_eq!(
            relative_path(Path::new("/proj/src"), Path::new("/proj/src/a/b.js")),
            "./a/b.js"
        );
        assert_eq!(
            relative_path(Path::new("/proj/src"), Path::new("/proj/lib/b.js")),
            "../lib/b.js"
        );
    }

    #[test]
    fn test_extname() {
        assert_eq!(extname("/a/b/index.js"), ".js");
        assert_eq!(extname("/a/b.d/index"), "");
        assert_eq!(extname("archive.tar.gz"), ".gz");
        assert_eq!(extname(".babelrc"), "");
        assert_eq!(extname("foo."), ".");
        assert_eq!(extname(""), "");
    }

    #[test]
    fn test_append() {
        assert_eq!(
            append(Path::new("/proj/foo"), ".ts"),
            PathBuf::from("/proj/foo.ts")
        );
    }

    #[test]
    fn test_posix_join() {
        assert_eq!(posix_join("./nested", "sub"), "nested/sub");
        assert_eq!(posix_join("preact/compat", "hooks"), "preact/compat/hooks");
        assert_eq!(posix_join("../a", "../../b"), "../../b");
        assert_eq!(posix_join("/a/b", "../c"), "/a/c");
        assert_eq!(posix_join(".", "."), ".");
    }
}
