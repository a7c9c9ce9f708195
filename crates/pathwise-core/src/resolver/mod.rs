//! Node-style module resolution.
//!
//! Resolves an import specifier relative to the file that references it,
//! following the `node_modules` algorithm extended with:
//! - absolute specifiers (`/src/app`) relative to the project root
//! - tilde specifiers (`~/theme`) relative to the nearest package root
//! - package.json `source`, `alias`, and `browser` alias maps, including glob keys
//! - `browser`/`module` entry fields and browser polyfills for Node builtins
//!
//! Every resolution also reports which file creations and changes could alter
//! its outcome, so callers can re-resolve incrementally.

pub mod alias;
pub mod alternatives;
pub mod builtins;
pub mod context;
pub mod diagnostic;
pub mod entries;
pub mod env;
pub mod fs;
pub mod glob;
pub mod json_span;
mod loader;
mod locator;
pub mod package;
pub mod pnp;
pub mod side_effects;
pub mod specifier;

pub use alias::{AliasTarget, AliasValue, ResolvedAlias};
pub use builtins::{find_builtin, should_include_node_module, Builtin};
pub use context::{FileCreateInvalidation, Invalidations, ResolutionContext};
pub use diagnostic::{codes, CodeFrame, CodeHighlight, Diagnostic, DiagnosticKind};
pub use entries::{package_entries, PackageEntry};
pub use env::{Environment, EnvironmentContext, IncludeNodeModules};
pub use fs::{FileStat, FileSystem, OsFileSystem};
pub use package::{PackageCache, PackageDescriptor};
pub use pnp::{PnpApi, PnpError};
pub use side_effects::{has_side_effects, SideEffects};
pub use specifier::{classify, module_parts, SpecifierKind};

use crate::config::ResolverConfig;
use crate::error::Error;
use alias::AliasResolver;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Maximum alias hops followed while expanding one candidate file.
pub const MAX_ALIAS_HOPS: usize = 8;

/// Maximum nesting of package entries that point at directories.
pub const MAX_DIRECTORY_DEPTH: usize = 16;

/// One resolution request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveRequest {
    pub specifier: String,
    /// File containing the import. `None` for entry points.
    pub referrer: Option<PathBuf>,
    /// Whether the specifier came from a URL context such as CSS `url()`.
    pub is_url: bool,
    pub env: Environment,
}

impl ResolveRequest {
    #[must_use]
    pub fn new(specifier: impl Into<String>, referrer: Option<PathBuf>) -> Self {
        Self {
            specifier: specifier.into(),
            referrer,
            is_url: false,
            env: Environment::default(),
        }
    }

    #[must_use]
    pub fn with_env(mut self, env: Environment) -> Self {
        self.env = env;
        self
    }

    #[must_use]
    pub fn with_url(mut self, is_url: bool) -> Self {
        self.is_url = is_url;
        self
    }
}

/// A successfully resolved module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedModule {
    pub file_path: PathBuf,
    /// Source to use instead of reading `file_path`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// `Some(false)` when the owning package declares the file free of side effects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side_effects: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resolution {
    Resolved(ResolvedModule),
    /// Intentionally not bundled: a Node builtin on a Node target, or a
    /// module excluded by `includeNodeModules`.
    Excluded,
    Failed(Diagnostic),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveOutput {
    #[serde(flatten)]
    pub resolution: Resolution,
    pub invalidations: Invalidations,
}

impl ResolveOutput {
    /// The resolved module, if any.
    #[must_use]
    pub fn module(&self) -> Option<&ResolvedModule> {
        match &self.resolution {
            Resolution::Resolved(m) => Some(m),
            _ => None,
        }
    }

    #[must_use]
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match &self.resolution {
            Resolution::Failed(d) => Some(d),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_excluded(&self) -> bool {
        matches!(self.resolution, Resolution::Excluded)
    }
}

/// Why a resolution step stopped early.
#[derive(Debug)]
pub(crate) enum Failure {
    /// Reported to the caller as [`Resolution::Failed`].
    Diagnostic(Box<Diagnostic>),
    /// Aborts the resolution.
    Fatal(Error),
}

impl From<Diagnostic> for Failure {
    fn from(d: Diagnostic) -> Self {
        Self::Diagnostic(Box::new(d))
    }
}

impl From<Error> for Failure {
    fn from(e: Error) -> Self {
        Self::Fatal(e)
    }
}

pub(crate) type Step<T> = Result<T, Failure>;

/// A file found on disk together with the package it belongs to.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedFile {
    pub path: PathBuf,
    pub pkg: Option<Arc<PackageDescriptor>>,
}

/// Outcome of the specifier-to-location step.
#[derive(Debug)]
enum Module {
    Excluded,
    /// A synthetic module with generated source.
    Inline { file_path: PathBuf, code: String },
    /// An absolute path to load as a file or directory.
    File(PathBuf),
    /// A directory inside `node_modules`.
    Node(locator::NodeModule),
}

/// Module resolver.
///
/// Shareable across threads: each call to [`Resolver::resolve`] keeps its
/// own state and only the package cache is shared.
#[derive(Debug)]
pub struct Resolver {
    config: ResolverConfig,
    extensions: Vec<String>,
    empty_shim: PathBuf,
    fs: Arc<dyn FileSystem>,
    cache: PackageCache,
    pnp: Option<Arc<dyn PnpApi>>,
}

impl Resolver {
    #[must_use]
    pub fn new(config: ResolverConfig, fs: Arc<dyn FileSystem>) -> Self {
        let extensions = config.normalized_extensions();
        let empty_shim = config.empty_shim_path();
        Self {
            config,
            extensions,
            empty_shim,
            fs,
            cache: PackageCache::new(),
            pnp: None,
        }
    }

    /// Resolver over the real filesystem.
    #[must_use]
    pub fn with_os_fs(config: ResolverConfig) -> Self {
        Self::new(config, Arc::new(OsFileSystem))
    }

    /// Use a package-manager resolution hook when `node_modules` lookups fail.
    #[must_use]
    pub fn with_pnp(mut self, api: Arc<dyn PnpApi>) -> Self {
        self.pnp = Some(api);
        self
    }

    #[must_use]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    #[must_use]
    pub fn cache(&self) -> &PackageCache {
        &self.cache
    }

    /// Forget all parsed package.json files.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Resolve one specifier.
    ///
    /// Missing modules and bad package entries are reported as
    /// [`Resolution::Failed`]. `Err` is reserved for unreadable or malformed
    /// package.json files and other I/O failures.
    pub fn resolve(&self, request: &ResolveRequest) -> Result<ResolveOutput, Error> {
        debug!(
            specifier = %request.specifier,
            referrer = ?request.referrer,
            context = request.env.context.as_str(),
            "resolve"
        );

        let mut session = Session::new(self, &request.env, request.referrer.as_deref());
        let resolution = match session.run(request) {
            Ok(resolution) => resolution,
            Err(Failure::Diagnostic(diagnostic)) => Resolution::Failed(*diagnostic),
            Err(Failure::Fatal(err)) => return Err(err),
        };

        match &resolution {
            Resolution::Resolved(m) => debug!(file = %m.file_path.display(), "resolved"),
            Resolution::Excluded => debug!("excluded"),
            Resolution::Failed(d) => debug!(code = d.code, message = %d.message, "failed"),
        }

        Ok(ResolveOutput {
            resolution,
            invalidations: session.ctx.into_invalidations(),
        })
    }

    /// Whether `file` may have side effects according to its package.
    ///
    /// Files outside any package are assumed to have side effects.
    pub fn side_effects_of(&self, file: &Path) -> Result<bool, Error> {
        let env = Environment::default();
        let mut session = Session::new(self, &env, None);
        match session.find_package(file) {
            Ok(Some(pkg)) => Ok(has_side_effects(file, &pkg)),
            Ok(None) => Ok(true),
            Err(Failure::Fatal(err)) => Err(err),
            Err(Failure::Diagnostic(d)) => Err(Error::other(d.to_string())),
        }
    }
}

/// State of one in-flight resolution.
pub(crate) struct Session<'r> {
    resolver: &'r Resolver,
    env: &'r Environment,
    extensions: Vec<String>,
    root_pkg: Option<Arc<PackageDescriptor>>,
    pub(crate) ctx: ResolutionContext,
}

impl<'r> Session<'r> {
    fn new(resolver: &'r Resolver, env: &'r Environment, referrer: Option<&Path>) -> Self {
        // "" first, then the referrer's own extension, then the configured list.
        let mut extensions = vec![String::new()];
        if let Some(ext) = referrer
            .map(|r| pathwise_util::path::extname(&r.to_string_lossy()).to_string())
            .filter(|ext| !ext.is_empty())
        {
            extensions.push(ext);
        }
        for ext in &resolver.extensions {
            if !extensions.contains(ext) {
                extensions.push(ext.clone());
            }
        }

        Self {
            resolver,
            env,
            extensions,
            root_pkg: None,
            ctx: ResolutionContext::new(),
        }
    }

    fn fs(&self) -> &'r dyn FileSystem {
        self.resolver.fs.as_ref()
    }

    fn project_root(&self) -> &'r Path {
        &self.resolver.config.project_root
    }

    fn aliases(&self) -> AliasResolver<'r> {
        AliasResolver {
            fs: self.fs(),
            project_root: self.project_root(),
            empty_shim: &self.resolver.empty_shim,
        }
    }

    fn run(&mut self, request: &ResolveRequest) -> Step<Resolution> {
        let resolved = match self.resolve_module(request)? {
            Module::Excluded => return Ok(Resolution::Excluded),
            Module::Inline { file_path, code } => {
                let file_path = self.fs().realpath(&file_path).unwrap_or(file_path);
                return Ok(Resolution::Resolved(ResolvedModule {
                    file_path,
                    code: Some(code),
                    side_effects: None,
                }));
            }
            Module::Node(module) => self.load_node_modules(&module)?,
            Module::File(file) => {
                let parent_dir = request
                    .referrer
                    .as_deref()
                    .and_then(Path::parent)
                    .unwrap_or(self.project_root());
                self.load_relative(&file, parent_dir)?
            }
        };

        if resolved.path == self.resolver.empty_shim {
            return Ok(Resolution::Resolved(ResolvedModule {
                file_path: resolved.path,
                code: Some(String::new()),
                side_effects: None,
            }));
        }

        let side_effects = resolved
            .pkg
            .as_deref()
            .filter(|pkg| !has_side_effects(&resolved.path, pkg))
            .map(|_| false);
        let file_path = self.fs().realpath(&resolved.path).map_err(Error::Io)?;

        Ok(Resolution::Resolved(ResolvedModule {
            file_path,
            code: None,
            side_effects,
        }))
    }

    fn resolve_module(&mut self, request: &ResolveRequest) -> Step<Module> {
        let source_file = request
            .referrer
            .clone()
            .unwrap_or_else(|| self.project_root().join("index"));

        let mut filename = match &request.referrer {
            Some(referrer) => specifier::resolve_filename(
                self.fs(),
                self.project_root(),
                &request.specifier,
                referrer.parent().unwrap_or(self.project_root()),
                request.is_url,
            ),
            None => request.specifier.clone(),
        };

        if let Some(alias) = self.load_alias(&filename, &source_file)? {
            debug!(
                specifier = %filename,
                declared_in = %alias.source_path.display(),
                "applying alias"
            );
            match alias.target {
                AliasTarget::Global(name) => {
                    return Ok(Module::Inline {
                        file_path: self.project_root().join(format!("{name}.js")),
                        code: format!("module.exports={name};"),
                    });
                }
                AliasTarget::File(target) => filename = target,
            }
        }

        if Path::new(&filename).is_absolute() {
            return Ok(Module::File(PathBuf::from(filename)));
        }

        if !should_include_node_module(self.env, &filename) {
            return Ok(Module::Excluded);
        }

        if let Some(builtin) = find_builtin(&filename) {
            if self.env.is_node() {
                return Ok(Module::Excluded);
            }
            match builtin {
                Builtin::EmptyShim => return Ok(Module::File(self.resolver.empty_shim.clone())),
                Builtin::Polyfill(polyfill) => filename = polyfill.to_string(),
            }
        }

        if let Some(module) = self.find_node_module_path(&filename, &source_file) {
            return Ok(Module::Node(module));
        }

        let resolver = self.resolver;
        if let (Some(referrer), Some(pnp)) = (&request.referrer, &resolver.pnp) {
            match self.find_pnp_module(pnp.as_ref(), &filename, referrer) {
                locator::PnpLookup::Found(module) => return Ok(Module::Node(module)),
                locator::PnpLookup::Excluded => return Ok(Module::Excluded),
                locator::PnpLookup::NotFound => {}
            }
        }

        let (module_name, _) = module_parts(&filename);
        let search_dir = source_file.parent().unwrap_or(self.project_root());
        let alternatives = alternatives::find_alternative_node_modules(&module_name, search_dir);
        Err(Diagnostic::module_not_found(&module_name, &alternatives).into())
    }

    /// Aliases for `filename` from the referrer's package, then the root package.
    fn load_alias(&mut self, filename: &str, source_file: &Path) -> Step<Option<ResolvedAlias>> {
        let root_index = self.project_root().join("index");
        self.root_pkg = self.find_package(&root_index)?;
        let local = self.find_package(source_file)?;
        Ok(self.aliases().resolve_aliases(
            filename,
            self.env,
            local.as_deref(),
            self.root_pkg.as_deref(),
        )?)
    }
}
