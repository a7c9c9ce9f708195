//! Loading candidate files and directories.

use super::alternatives::find_alternative_files;
use super::diagnostic::{did_you_mean, CodeFrame, CodeHighlight, Diagnostic, DiagnosticKind};
use super::entries::{package_entries, PackageEntry};
use super::json_span::value_span;
use super::locator::NodeModule;
use super::package::PackageDescriptor;
use super::{ResolvedFile, Session, Step, MAX_ALIAS_HOPS, MAX_DIRECTORY_DEPTH};
use crate::error::Error;
use pathwise_util::path;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::trace;

impl Session<'_> {
    /// Load a path specifier as a file, then as a directory.
    pub(crate) fn load_relative(&mut self, filename: &Path, parent_dir: &Path) -> Step<ResolvedFile> {
        let pkg = self.find_package(filename)?;

        if let Some(found) = self.load_as_file(filename, pkg.clone())? {
            return Ok(found);
        }
        if let Some(found) = self.load_directory(filename, pkg, 0)? {
            return Ok(found);
        }

        let specifier = path::relative_path(parent_dir, filename);
        let alternatives = find_alternative_files(self.fs(), &specifier, parent_dir);
        let location = path::relative_path(self.project_root(), parent_dir);
        Err(Diagnostic::new(
            DiagnosticKind::FileNotFound,
            format!("Cannot load file '{specifier}' in '{location}'."),
        )
        .with_hints(did_you_mean(&alternatives))
        .into())
    }

    /// Load a module found in `node_modules`.
    ///
    /// A sub-path (`lodash/map`) is tried as a file before the package entry
    /// points are considered.
    pub(crate) fn load_node_modules(&mut self, module: &NodeModule) -> Step<ResolvedFile> {
        if module.sub_path.is_some() {
            let pkg = self.read_package(&module.module_dir)?;
            if let Some(found) = self.load_as_file(&module.file_path, pkg)? {
                return Ok(found);
            }
        }

        if let Some(found) = self.load_directory(&module.file_path, None, 0)? {
            return Ok(found);
        }

        let specifier = module
            .sub_path
            .as_deref()
            .map_or_else(|| ".".to_string(), |sub| format!("./{sub}"));
        let alternatives = find_alternative_files(self.fs(), &specifier, &module.module_dir);
        Err(Diagnostic::new(
            DiagnosticKind::FileNotFound,
            format!(
                "Cannot load file '{specifier}' from module '{}'.",
                module.module_name
            ),
        )
        .with_hints(did_you_mean(&alternatives))
        .into())
    }

    /// First existing candidate of `file` expanded with every extension.
    ///
    /// Each candidate that outranks the one found is watched for creation.
    pub(crate) fn load_as_file(
        &mut self,
        file: &Path,
        pkg: Option<Arc<PackageDescriptor>>,
    ) -> Step<Option<ResolvedFile>> {
        let files = self.expand_file(file, pkg.as_deref())?;

        // The empty shim is virtual and always exists.
        let shim = files.iter().position(|f| *f == self.resolver.empty_shim);
        let searched = &files[..shim.unwrap_or(files.len())];
        let found = self
            .fs()
            .find_first_file(searched)
            .or_else(|| shim.map(|i| files[i].clone()));

        for candidate in &files {
            if Some(candidate) == found.as_ref() {
                break;
            }
            self.ctx.invalidate_on_create(candidate);
        }

        trace!(file = %file.display(), candidates = files.len(), found = ?found, "load as file");
        Ok(found.map(|path| ResolvedFile { path, pkg }))
    }

    /// Candidate files for `file`, in priority order.
    ///
    /// Every extension is appended in turn. When a candidate is aliased, the
    /// alias chain is followed to its last file (at most [`MAX_ALIAS_HOPS`]
    /// hops, stopping at the first repeat) and that file's extension
    /// candidates come first. Extensionless candidates are dropped.
    pub(crate) fn expand_file(
        &self,
        file: &Path,
        pkg: Option<&PackageDescriptor>,
    ) -> Result<Vec<PathBuf>, Diagnostic> {
        let mut out = Vec::new();

        for ext in &self.extensions {
            let candidate = path::append(file, ext);
            if let Some(target) = self.follow_file_alias(&candidate, pkg)? {
                out.extend(
                    self.extensions
                        .iter()
                        .map(|e| path::append(&target, e))
                        .filter(|f| has_extension(f)),
                );
            }
            if has_extension(&candidate) {
                out.push(candidate);
            }
        }

        Ok(out)
    }

    /// Last file of the alias chain starting at `candidate`, if it is aliased.
    fn follow_file_alias(
        &self,
        candidate: &Path,
        pkg: Option<&PackageDescriptor>,
    ) -> Result<Option<PathBuf>, Diagnostic> {
        let mut seen = HashSet::from([candidate.to_path_buf()]);
        let mut last = None;
        let mut next = self.file_alias(candidate, pkg)?;

        while let Some(target) = next {
            if seen.len() > MAX_ALIAS_HOPS || !seen.insert(target.clone()) {
                trace!(file = %candidate.display(), "alias chain stopped");
                break;
            }
            next = self.file_alias(&target, pkg)?;
            last = Some(target);
        }

        Ok(last)
    }

    /// Absolute file an aliased candidate points at.
    fn file_alias(
        &self,
        candidate: &Path,
        pkg: Option<&PackageDescriptor>,
    ) -> Result<Option<PathBuf>, Diagnostic> {
        let alias = self.aliases().resolve_aliases(
            &candidate.to_string_lossy(),
            self.env,
            pkg,
            self.root_pkg.as_deref(),
        )?;
        let Some(alias) = alias else {
            return Ok(None);
        };
        let target = alias
            .file()
            .map(PathBuf::from)
            .filter(|p| p.is_absolute());
        if let Some(target) = &target {
            trace!(
                file = %candidate.display(),
                target = %target.display(),
                declared_in = %alias.source_path.display(),
                "file alias"
            );
        }
        Ok(target)
    }

    /// Load a directory through its package.json entry, or its index file.
    ///
    /// Only the first entry field counts. If it cannot be loaded, an index
    /// file in the same directory is tried before reporting the entry.
    pub(crate) fn load_directory(
        &mut self,
        dir: &Path,
        parent_pkg: Option<Arc<PackageDescriptor>>,
        depth: usize,
    ) -> Step<Option<ResolvedFile>> {
        if depth > MAX_DIRECTORY_DEPTH {
            trace!(dir = %dir.display(), "directory entries nested too deeply");
            return Ok(None);
        }

        let pkg = self.read_package(dir)?;

        if let Some(pkg) = &pkg {
            let entries = package_entries(pkg, &self.resolver.config.main_fields, self.env);
            if let Some(entry) = entries.into_iter().next() {
                let loaded = match self.load_as_file(&entry.filename, Some(Arc::clone(pkg)))? {
                    Some(found) => Some(found),
                    None => self.load_directory(&entry.filename, Some(Arc::clone(pkg)), depth + 1)?,
                };
                if loaded.is_some() {
                    return Ok(loaded);
                }

                let index = self.load_as_file(&dir.join("index"), Some(Arc::clone(pkg)))?;
                if index.is_some() {
                    return Ok(index);
                }

                return Err(self.invalid_entry(dir, pkg, &entry)?.into());
            }
        }

        if !self.fs().stat(dir).is_ok_and(|s| s.is_dir) {
            return Ok(None);
        }

        let index = dir.join("index");
        let pkg = match pkg.or(parent_pkg) {
            Some(pkg) => Some(pkg),
            None => self.find_package(&index)?,
        };
        self.load_as_file(&index, pkg)
    }

    fn invalid_entry(
        &self,
        dir: &Path,
        pkg: &PackageDescriptor,
        entry: &PackageEntry,
    ) -> Result<Diagnostic, Error> {
        let specifier = path::relative_path(dir, &entry.filename);
        let alternatives = find_alternative_files(self.fs(), &specifier, &pkg.dir);
        let code = self
            .fs()
            .read_file(&pkg.file)
            .map_err(|source| Error::PackageRead {
                path: pkg.file.clone(),
                source,
            })?;

        let label = match alternatives.first() {
            Some(alt) => format!("'{specifier}' does not exist, did you mean '{alt}'?"),
            None => format!("'{specifier}' does not exist"),
        };
        let pointer: Vec<&str> = entry.pointer.iter().map(String::as_str).collect();
        let highlights = value_span(&code, &pointer)
            .map(|(start, end)| CodeHighlight {
                start,
                end,
                message: Some(label),
            })
            .into_iter()
            .collect();

        let name = pkg
            .name
            .clone()
            .unwrap_or_else(|| pkg.dir.display().to_string());
        Ok(Diagnostic::new(
            DiagnosticKind::PackageEntryInvalid,
            format!(
                "Could not load '{specifier}' from module '{name}' found in package.json#{}",
                entry.field
            ),
        )
        .with_code_frame(CodeFrame {
            file_path: pkg.file.clone(),
            language: "json".to_string(),
            code,
            highlights,
        }))
    }
}

fn has_extension(file: &Path) -> bool {
    !path::extname(&file.to_string_lossy()).is_empty()
}
