//! Target environment of a resolution request.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where the resolved code is going to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnvironmentContext {
    #[default]
    Browser,
    WebWorker,
    ServiceWorker,
    Node,
    ElectronMain,
    ElectronRenderer,
}

impl EnvironmentContext {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Browser => "browser",
            Self::WebWorker => "web-worker",
            Self::ServiceWorker => "service-worker",
            Self::Node => "node",
            Self::ElectronMain => "electron-main",
            Self::ElectronRenderer => "electron-renderer",
        }
    }
}

impl std::str::FromStr for EnvironmentContext {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "browser" => Ok(Self::Browser),
            "web-worker" => Ok(Self::WebWorker),
            "service-worker" => Ok(Self::ServiceWorker),
            "node" => Ok(Self::Node),
            "electron-main" => Ok(Self::ElectronMain),
            "electron-renderer" => Ok(Self::ElectronRenderer),
            other => Err(format!("unknown environment context: {other}")),
        }
    }
}

/// Which bare modules are bundled rather than left external.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IncludeNodeModules {
    /// `true` includes every module, `false` excludes every module.
    All(bool),
    /// Only the listed module names are included.
    Names(Vec<String>),
    /// Per-module decision; unlisted modules are included.
    Map(BTreeMap<String, bool>),
}

impl Default for IncludeNodeModules {
    fn default() -> Self {
        Self::All(true)
    }
}

/// Read-only capability view of the request's target environment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Environment {
    pub context: EnvironmentContext,
    pub include_node_modules: IncludeNodeModules,
}

impl Environment {
    #[must_use]
    pub fn new(context: EnvironmentContext) -> Self {
        Self {
            context,
            include_node_modules: IncludeNodeModules::default(),
        }
    }

    /// Browser environment including all node modules.
    #[must_use]
    pub fn browser() -> Self {
        Self::new(EnvironmentContext::Browser)
    }

    /// Node environment including all node modules.
    #[must_use]
    pub fn node() -> Self {
        Self::new(EnvironmentContext::Node)
    }

    #[must_use]
    pub fn with_include_node_modules(mut self, include: IncludeNodeModules) -> Self {
        self.include_node_modules = include;
        self
    }

    #[must_use]
    pub fn is_browser(&self) -> bool {
        matches!(
            self.context,
            EnvironmentContext::Browser
                | EnvironmentContext::WebWorker
                | EnvironmentContext::ServiceWorker
                | EnvironmentContext::ElectronRenderer
        )
    }

    #[must_use]
    pub fn is_node(&self) -> bool {
        matches!(
            self.context,
            EnvironmentContext::Node
                | EnvironmentContext::ElectronMain
                | EnvironmentContext::ElectronRenderer
        )
    }
}
