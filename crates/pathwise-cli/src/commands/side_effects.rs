//! `pathwise side-effects`: classify files by their package's `sideEffects` field.

use miette::{IntoDiagnostic, Result};
use pathwise_core::{Error, Resolver};
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;

pub const SIDE_EFFECTS_SCHEMA_VERSION: u32 = 1;

#[derive(Serialize)]
struct SideEffectsJson {
    schema_version: u32,
    results: Vec<FileSideEffects>,
}

#[derive(Serialize)]
struct FileSideEffects {
    file: PathBuf,
    side_effects: bool,
}

pub fn run(resolver: &Resolver, files: Vec<PathBuf>, json: bool) -> Result<()> {
    let results = files
        .into_par_iter()
        .map(|file| -> Result<FileSideEffects, Error> {
            let side_effects = resolver.side_effects_of(&file)?;
            Ok(FileSideEffects { file, side_effects })
        })
        .collect::<Result<Vec<_>, Error>>()
        .into_diagnostic()?;

    if json {
        let result = SideEffectsJson {
            schema_version: SIDE_EFFECTS_SCHEMA_VERSION,
            results,
        };
        println!("{}", serde_json::to_string(&result).into_diagnostic()?);
    } else {
        for r in &results {
            let label = if r.side_effects {
                "has side effects"
            } else {
                "side-effect free"
            };
            println!("{}: {label}", r.file.display());
        }
    }

    Ok(())
}
