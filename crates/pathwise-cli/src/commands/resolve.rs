//! `pathwise resolve`: resolve specifiers in parallel over one shared resolver.

use super::report::FailureReport;
use miette::{IntoDiagnostic, Result};
use pathwise_core::{Environment, Error, Resolution, ResolveOutput, ResolveRequest, Resolver};
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

/// Schema version for `resolve --json` output.
pub const RESOLVE_SCHEMA_VERSION: u32 = 1;

#[derive(Debug)]
pub struct ResolveAction {
    pub specifiers: Vec<String>,
    pub referrer: PathBuf,
    pub env: Environment,
    pub is_url: bool,
}

#[derive(Serialize)]
struct ResolveResultJson<'a> {
    schema_version: u32,
    ok: bool,
    results: Vec<SpecifierResult<'a>>,
}

#[derive(Serialize)]
struct SpecifierResult<'a> {
    specifier: &'a str,
    #[serde(flatten)]
    outcome: Outcome<'a>,
}

/// One specifier's result: a resolver answer, or the error that aborted it.
#[derive(Serialize)]
#[serde(untagged)]
enum Outcome<'a> {
    Output(&'a ResolveOutput),
    Fatal { status: &'static str, message: String },
}

impl<'a> Outcome<'a> {
    fn new(result: &'a Result<ResolveOutput, Error>) -> Self {
        match result {
            Ok(output) => Self::Output(output),
            Err(err) => Self::Fatal {
                status: "fatal",
                message: err.to_string(),
            },
        }
    }
}

pub fn run(resolver: &Resolver, action: ResolveAction, json: bool) -> Result<()> {
    let results: Vec<Result<ResolveOutput, Error>> = action
        .specifiers
        .par_iter()
        .map(|specifier| {
            let request = ResolveRequest::new(specifier.clone(), Some(action.referrer.clone()))
                .with_env(action.env.clone())
                .with_url(action.is_url);
            resolver.resolve(&request)
        })
        .collect();

    debug!(
        count = results.len(),
        packages = resolver.cache().len(),
        "resolved batch"
    );

    let ok = results
        .iter()
        .all(|r| matches!(r, Ok(out) if !matches!(out.resolution, Resolution::Failed(_))));

    if json {
        let result = ResolveResultJson {
            schema_version: RESOLVE_SCHEMA_VERSION,
            ok,
            results: action
                .specifiers
                .iter()
                .zip(&results)
                .map(|(specifier, result)| SpecifierResult {
                    specifier,
                    outcome: Outcome::new(result),
                })
                .collect(),
        };
        println!("{}", serde_json::to_string(&result).into_diagnostic()?);
    } else {
        for (specifier, result) in action.specifiers.iter().zip(&results) {
            match result {
                Ok(output) => print_human(specifier, output),
                Err(err) => {
                    let report = miette::Report::msg(format!("{specifier}: {err}"));
                    eprintln!("{report:?}");
                }
            }
        }
    }

    if ok {
        Ok(())
    } else {
        std::process::exit(1);
    }
}

fn print_human(specifier: &str, output: &ResolveOutput) {
    match &output.resolution {
        Resolution::Resolved(module) => {
            let mut line = format!("{specifier} -> {}", module.file_path.display());
            if module.code.is_some() {
                line.push_str(" (inline)");
            }
            if module.side_effects == Some(false) {
                line.push_str(" (side-effect free)");
            }
            println!("{line}");
        }
        Resolution::Excluded => println!("{specifier} -> (excluded)"),
        Resolution::Failed(diagnostic) => {
            let report = miette::Report::new(FailureReport::new(diagnostic.clone()));
            eprintln!("{report:?}");
        }
    }
}
