#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::return_self_not_must_use)]

pub mod config;
pub mod error;
pub mod paths;
pub mod resolver;
pub mod version;

pub use config::{Config, ResolverConfig};
pub use error::Error;
pub use resolver::{
    Diagnostic, DiagnosticKind, Environment, EnvironmentContext, FileSystem, IncludeNodeModules,
    Invalidations, OsFileSystem, Resolution, ResolveOutput, ResolveRequest, ResolvedModule,
    Resolver,
};
pub use version::VERSION;
