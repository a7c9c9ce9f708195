//! Finding package.json files and `node_modules` directories.

use super::package::PackageDescriptor;
use super::pnp::PnpApi;
use super::specifier::module_parts;
use super::{Session, Step};
use crate::error::Error;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{trace, warn};

/// A module located inside `node_modules` (or provided by a PnP hook).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NodeModule {
    pub module_name: String,
    pub sub_path: Option<String>,
    pub module_dir: PathBuf,
    /// `module_dir` joined with `sub_path`.
    pub file_path: PathBuf,
}

impl NodeModule {
    fn new(module_name: String, sub_path: Option<String>, module_dir: PathBuf) -> Self {
        let file_path = match &sub_path {
            Some(sub) => pathwise_util::path::join(&module_dir, sub),
            None => module_dir.clone(),
        };
        Self {
            module_name,
            sub_path,
            module_dir,
            file_path,
        }
    }
}

pub(crate) enum PnpLookup {
    Found(NodeModule),
    NotFound,
    Excluded,
}

impl Session<'_> {
    /// Nearest package.json at or above the directory of `source_file`.
    pub(crate) fn find_package(
        &mut self,
        source_file: &Path,
    ) -> Step<Option<Arc<PackageDescriptor>>> {
        self.ctx.invalidate_on_create_above("package.json", source_file);

        let dir = source_file.parent().unwrap_or(source_file);
        match self.fs().find_ancestor_file(&["package.json"], dir) {
            Some(file) => self.read_package(file.parent().unwrap_or(dir)),
            None => Ok(None),
        }
    }

    /// Read `dir/package.json` through the package cache.
    ///
    /// A missing file is "no package here" and is watched for creation.
    pub(crate) fn read_package(&mut self, dir: &Path) -> Step<Option<Arc<PackageDescriptor>>> {
        let file = dir.join("package.json");
        if let Some(cached) = self.resolver.cache.get(&file) {
            self.ctx.invalidate_on_change(&cached.file);
            return Ok(Some(cached));
        }

        let content = match self.fs().read_file(&file) {
            Ok(content) => content,
            Err(err) => {
                self.ctx.invalidate_on_create(&file);
                let missing = err.kind() == ErrorKind::NotFound
                    || !self.fs().stat(dir).is_ok_and(|s| s.is_dir);
                if missing {
                    return Ok(None);
                }
                return Err(Error::PackageRead {
                    path: file,
                    source: err,
                }
                .into());
            }
        };

        // Watch before parsing so fixing a syntax error triggers a rebuild.
        self.ctx.invalidate_on_change(&file);
        let mut pkg =
            PackageDescriptor::parse(&file, &content).map_err(|source| Error::MalformedPackageJson {
                path: file.clone(),
                source,
            })?;

        // A `source` field only applies to packages symlinked into the project.
        if pkg.source.is_some() {
            let real = self.fs().realpath(&file).map_err(|source| Error::PackageRead {
                path: file.clone(),
                source,
            })?;
            if real == file {
                pkg.strip_source();
            }
        }

        trace!(file = %file.display(), name = ?pkg.name, "parsed package.json");
        Ok(Some(self.resolver.cache.insert(pkg)))
    }

    /// Nearest `node_modules/<module>` directory above `source_file`.
    pub(crate) fn find_node_module_path(
        &mut self,
        filename: &str,
        source_file: &Path,
    ) -> Option<NodeModule> {
        let (module_name, sub_path) = module_parts(filename);
        self.ctx
            .invalidate_on_create_above(format!("node_modules/{module_name}"), source_file);

        let dir = source_file.parent().unwrap_or(source_file);
        let module_dir = self.fs().find_node_module(&module_name, dir)?;
        Some(NodeModule::new(module_name, sub_path, module_dir))
    }

    /// Ask the package manager for a module no `node_modules` provides.
    pub(crate) fn find_pnp_module(
        &mut self,
        pnp: &dyn PnpApi,
        filename: &str,
        referrer: &Path,
    ) -> PnpLookup {
        let (module_name, sub_path) = module_parts(filename);
        // `assert/` must keep its slash so the npm package wins over the builtin.
        let keeps_slash = filename
            .get(module_name.len()..)
            .is_some_and(|rest| rest.starts_with('/'));
        let request = if keeps_slash {
            format!("{module_name}/")
        } else {
            module_name.clone()
        };

        match pnp.resolve_to_unqualified(&request, referrer) {
            Ok(Some(module_dir)) => {
                self.ctx.invalidate_on_change(&pnp.manifest_path());
                PnpLookup::Found(NodeModule::new(module_name, sub_path, module_dir))
            }
            Ok(None) => PnpLookup::NotFound,
            Err(err) => {
                warn!(request = %request, error = %err, "pnp resolution failed");
                PnpLookup::Excluded
            }
        }
    }
}
