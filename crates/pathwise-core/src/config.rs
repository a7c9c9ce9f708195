use crate::error::Error;
use crate::resolver::Environment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the optional configuration file looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "pathwise.json";

/// File name of the virtual empty-module shim.
pub const EMPTY_SHIM_NAME: &str = "__pathwise_empty.js";

/// Default extensions for probing, in priority order.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".js", ".jsx", ".mjs", ".cjs", ".json"];

/// Default package.json entry fields, in priority order.
pub const DEFAULT_MAIN_FIELDS: &[&str] = &["browser", "module", "main"];

/// Resolver configuration, fixed at construction time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResolverConfig {
    /// Project root. Absolute specifiers (`/foo`) resolve against it.
    pub project_root: PathBuf,

    /// Extensions to try, in order. A missing leading dot is added.
    pub extensions: Vec<String>,

    /// package.json fields consulted for a package entry point, in order.
    pub main_fields: Vec<String>,

    /// Path reported for modules replaced by the empty shim.
    /// Defaults to `<project_root>/__pathwise_empty.js`.
    pub empty_shim: Option<PathBuf>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            extensions: DEFAULT_EXTENSIONS.iter().map(ToString::to_string).collect(),
            main_fields: DEFAULT_MAIN_FIELDS.iter().map(ToString::to_string).collect(),
            empty_shim: None,
        }
    }
}

impl ResolverConfig {
    /// Create a config rooted at `project_root` with default extensions and fields.
    #[must_use]
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            ..Default::default()
        }
    }

    /// Set the extensions to try.
    #[must_use]
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Set the package entry fields.
    #[must_use]
    pub fn with_main_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.main_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Set the empty shim path.
    #[must_use]
    pub fn with_empty_shim(mut self, path: impl Into<PathBuf>) -> Self {
        self.empty_shim = Some(path.into());
        self
    }

    /// Extensions with a guaranteed leading dot, duplicates removed.
    #[must_use]
    pub fn normalized_extensions(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::with_capacity(self.extensions.len());
        for ext in &self.extensions {
            let ext = if ext.starts_with('.') {
                ext.clone()
            } else {
                format!(".{ext}")
            };
            if !out.contains(&ext) {
                out.push(ext);
            }
        }
        out
    }

    /// Path of the empty-module shim.
    #[must_use]
    pub fn empty_shim_path(&self) -> PathBuf {
        self.empty_shim
            .clone()
            .unwrap_or_else(|| self.project_root.join(EMPTY_SHIM_NAME))
    }
}

/// Contents of a `pathwise.json` configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    #[serde(flatten)]
    pub resolver: ResolverConfig,

    /// Default target environment for requests.
    pub environment: Environment,
}

impl Config {
    /// Load a config file.
    ///
    /// A relative `projectRoot` is resolved against the file's directory; a
    /// missing one defaults to that directory.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self =
            serde_json::from_str(&content).map_err(|source| Error::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;

        let base = path.parent().unwrap_or(Path::new("."));
        let root = &config.resolver.project_root;
        config.resolver.project_root = if root.as_os_str().is_empty() || root == Path::new(".") {
            base.to_path_buf()
        } else {
            pathwise_util::path::normalize(&base.join(root))
        };

        Ok(config)
    }

    /// Load `pathwise.json` from `root` if present, else defaults rooted there.
    pub fn discover(root: &Path) -> Result<Self, Error> {
        let file = root.join(CONFIG_FILE_NAME);
        if pathwise_util::fs::is_file(&file) {
            return Self::load(&file);
        }
        Ok(Self {
            resolver: ResolverConfig::new(root),
            environment: Environment::default(),
        })
    }
}
