//! Alias lookup in package.json `source`, `alias`, and `browser` maps.

use super::diagnostic::Diagnostic;
use super::env::Environment;
use super::fs::FileSystem;
use super::glob::{is_glob, substitute};
use super::package::{AliasField, PackageDescriptor};
use super::specifier::{module_parts, resolve_filename};
use pathwise_util::path;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::trace;

/// An alias map entry, decided once at lookup time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasValue {
    /// `false`: the module is replaced by the empty shim.
    Disabled,
    /// A replacement specifier. `{ "fileName": p }` is also a replacement.
    Replacement(String),
    /// `{ "global": name }`: a module re-exporting a global variable.
    /// An empty name is invalid.
    Global(String),
}

impl AliasValue {
    /// Interpret a raw map value. `true`, `null`, and unknown shapes are
    /// not aliases.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(false) => Some(Self::Disabled),
            Value::String(s) => Some(Self::Replacement(s.clone())),
            Value::Object(obj) => {
                if let Some(global) = obj.get("global") {
                    let name = global.as_str().unwrap_or_default();
                    return Some(Self::Global(name.to_string()));
                }
                obj.get("fileName")
                    .and_then(Value::as_str)
                    .map(|f| Self::Replacement(f.to_string()))
            }
            _ => None,
        }
    }
}

/// Where an alias points after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasTarget {
    /// An absolute path, or a bare module name to look up in `node_modules`.
    File(String),
    /// Name of a global variable.
    Global(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAlias {
    pub target: AliasTarget,
    /// package.json that declared the alias.
    pub source_path: PathBuf,
}

impl ResolvedAlias {
    /// The aliased file, unless this is a global alias.
    #[must_use]
    pub fn file(&self) -> Option<&str> {
        match &self.target {
            AliasTarget::File(f) => Some(f),
            AliasTarget::Global(_) => None,
        }
    }
}

/// Look `filename` up in an alias map: the exact key first, then glob keys
/// with string values. Never mutates the map.
#[must_use]
pub fn lookup_alias(aliases: &Map<String, Value>, filename: &str) -> Option<Value> {
    if let Some(value) = aliases.get(filename).filter(|v| !v.is_null()) {
        return Some(value.clone());
    }

    aliases.iter().find_map(|(key, value)| {
        let replacement = value.as_str()?;
        if !is_glob(key) {
            return None;
        }
        substitute(key, filename, replacement).map(Value::String)
    })
}

/// Resolves aliases declared by a package or the project root package.
#[derive(Debug, Clone, Copy)]
pub struct AliasResolver<'a> {
    pub fs: &'a dyn FileSystem,
    pub project_root: &'a Path,
    pub empty_shim: &'a Path,
}

impl AliasResolver<'_> {
    /// Aliases from the local package, falling back to the root package.
    pub fn resolve_aliases(
        &self,
        filename: &str,
        env: &Environment,
        local: Option<&PackageDescriptor>,
        root: Option<&PackageDescriptor>,
    ) -> Result<Option<ResolvedAlias>, Diagnostic> {
        if let Some(alias) = self.resolve_package_aliases(filename, env, local)? {
            return Ok(Some(alias));
        }
        self.resolve_package_aliases(filename, env, root)
    }

    /// First alias declared in `source`, `alias`, or (in browsers) `browser`.
    ///
    /// A matching key ends the search even if its target later fails to load.
    pub fn resolve_package_aliases(
        &self,
        filename: &str,
        env: &Environment,
        pkg: Option<&PackageDescriptor>,
    ) -> Result<Option<ResolvedAlias>, Diagnostic> {
        let Some(pkg) = pkg else {
            return Ok(None);
        };

        let fields: &[AliasField] = if env.is_browser() {
            &[AliasField::Source, AliasField::Alias, AliasField::Browser]
        } else {
            &[AliasField::Source, AliasField::Alias]
        };

        for field in fields {
            let Some(aliases) = pkg.alias_map(*field) else {
                continue;
            };
            if let Some(alias) = self.get_alias(filename, pkg, aliases)? {
                trace!(
                    filename,
                    field = field.as_str(),
                    package = %pkg.file.display(),
                    "alias matched"
                );
                return Ok(Some(alias));
            }
        }
        Ok(None)
    }

    fn get_alias(
        &self,
        filename: &str,
        pkg: &PackageDescriptor,
        aliases: &Map<String, Value>,
    ) -> Result<Option<ResolvedAlias>, Diagnostic> {
        if filename.is_empty() {
            return Ok(None);
        }

        let (key, raw) = if Path::new(filename).is_absolute() {
            let relative = path::relative_path(&pkg.dir, Path::new(filename));
            let raw = lookup_alias(aliases, &relative);
            (relative, raw)
        } else {
            let normalized = path::normalize_separators(filename);
            let raw = lookup_alias(aliases, &normalized).or_else(|| {
                let (module, sub_path) = module_parts(filename);
                let raw = lookup_alias(aliases, &module)?;
                match (raw, sub_path) {
                    (Value::String(target), Some(sub)) => {
                        let joined = path::posix_join(&target, &sub);
                        Some(Value::String(if target.starts_with("./") {
                            format!("./{joined}")
                        } else {
                            joined
                        }))
                    }
                    (raw, _) => Some(raw),
                }
            });
            (normalized, raw)
        };

        let Some(value) = raw.as_ref().and_then(AliasValue::from_json) else {
            return Ok(None);
        };

        let target = match value {
            AliasValue::Disabled => {
                AliasTarget::File(self.empty_shim.to_string_lossy().into_owned())
            }
            AliasValue::Global(name) if name.is_empty() => {
                return Err(Diagnostic::invalid_global_alias(&key));
            }
            AliasValue::Global(name) => AliasTarget::Global(name),
            AliasValue::Replacement(replacement) => AliasTarget::File(resolve_filename(
                self.fs,
                self.project_root,
                &replacement,
                &pkg.dir,
                false,
            )),
        };

        Ok(Some(ResolvedAlias {
            target,
            source_path: pkg.file.clone(),
        }))
    }
}
