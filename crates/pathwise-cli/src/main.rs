#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::doc_markdown)]

mod commands;
mod logging;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use pathwise_core::{paths, Config, EnvironmentContext, Resolver};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "pathwise")]
#[command(author, version, about = "Resolve Node module specifiers the way a bundler does", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    /// Configuration file (defaults to pathwise.json in the project root)
    #[arg(long, global = true, value_name = "FILE", env = "PATHWISE_CONFIG")]
    config: Option<PathBuf>,

    /// Project root (defaults to the config file's root, then discovery from cwd)
    #[arg(long, global = true, value_name = "PATH")]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// Resolve one or more specifiers
    Resolve {
        /// Specifiers to resolve, e.g. `react`, `./utils`, `~/theme`
        #[arg(required = true)]
        specifiers: Vec<String>,

        /// File the specifiers are imported from [default: <cwd>/index]
        #[arg(long, value_name = "FILE")]
        from: Option<PathBuf>,

        /// Target environment
        #[arg(long, value_enum)]
        target: Option<Target>,

        /// Treat specifiers as URL references (CSS `url()`, HTML `src`)
        #[arg(long)]
        url: bool,

        /// Extensions to try, comma separated (replaces the configured list)
        #[arg(long, value_delimiter = ',')]
        extensions: Vec<String>,

        /// Package entry fields to try, comma separated
        #[arg(long, value_delimiter = ',')]
        main_fields: Vec<String>,
    },

    /// Report whether files may have side effects according to their package
    SideEffects {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum Target {
    Browser,
    WebWorker,
    ServiceWorker,
    Node,
    ElectronMain,
    ElectronRenderer,
}

impl From<Target> for EnvironmentContext {
    fn from(target: Target) -> Self {
        match target {
            Target::Browser => Self::Browser,
            Target::WebWorker => Self::WebWorker,
            Target::ServiceWorker => Self::ServiceWorker,
            Target::Node => Self::Node,
            Target::ElectronMain => Self::ElectronMain,
            Target::ElectronRenderer => Self::ElectronRenderer,
        }
    }
}

fn absolute(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// Config file from `--config`, else `pathwise.json` in the discovered root.
fn load_config(cli: &Cli, cwd: &Path) -> Result<Config> {
    let mut config = match &cli.config {
        Some(file) => Config::load(&absolute(cwd, file)).into_diagnostic()?,
        None => {
            let root = cli
                .root
                .as_deref()
                .map(|r| absolute(cwd, r))
                .or_else(|| paths::project_root(cwd))
                .unwrap_or_else(|| cwd.to_path_buf());
            Config::discover(&root).into_diagnostic()?
        }
    };

    if let Some(root) = &cli.root {
        config.resolver.project_root = absolute(cwd, root);
    }
    // Canonical roots keep invalidation paths comparable with realpaths.
    if let Ok(root) = dunce::canonicalize(&config.resolver.project_root) {
        config.resolver.project_root = root;
    }
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cwd = cli
        .cwd
        .clone()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));
    let cwd = dunce::canonicalize(&cwd).unwrap_or(cwd);

    logging::init(cli.verbose, cli.json);

    let Some(command) = &cli.command else {
        return commands::version::run(cli.json);
    };

    match command {
        Commands::Version => commands::version::run(cli.json),
        Commands::Resolve {
            specifiers,
            from,
            target,
            url,
            extensions,
            main_fields,
        } => {
            let mut config = load_config(&cli, &cwd)?;
            if !extensions.is_empty() {
                config.resolver = config.resolver.with_extensions(extensions);
            }
            if !main_fields.is_empty() {
                config.resolver = config.resolver.with_main_fields(main_fields);
            }
            if let Some(target) = target {
                config.environment.context = (*target).into();
            }
            debug!(root = %config.resolver.project_root.display(), "loaded config");

            let action = commands::resolve::ResolveAction {
                specifiers: specifiers.clone(),
                referrer: from
                    .as_deref()
                    .map_or_else(|| cwd.join("index"), |f| absolute(&cwd, f)),
                env: config.environment.clone(),
                is_url: *url,
            };
            let resolver = Resolver::with_os_fs(config.resolver);
            commands::resolve::run(&resolver, action, cli.json)
        }
        Commands::SideEffects { files } => {
            let config = load_config(&cli, &cwd)?;
            let resolver = Resolver::with_os_fs(config.resolver);
            let files = files.iter().map(|f| absolute(&cwd, f)).collect();
            commands::side_effects::run(&resolver, files, cli.json)
        }
    }
}
