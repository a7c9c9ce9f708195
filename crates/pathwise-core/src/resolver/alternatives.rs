//! "Did you mean" suggestions for missing modules and files.
//!
//! Directory listings go straight to disk; suggestions are best effort and
//! never affect the resolution outcome.

use super::fs::FileSystem;
use pathwise_util::path;
use std::path::Path;
use tracing::trace;
use walkdir::WalkDir;

const MAX_SUGGESTIONS: usize = 2;

/// Slack added to the target length when collecting candidate files.
const FILE_LENGTH_SLACK: usize = 10;

/// Module names in `node_modules` directories above `dir` that look like
/// `module_name`.
#[must_use]
pub fn find_alternative_node_modules(module_name: &str, dir: &Path) -> Vec<String> {
    let scoped = module_name.starts_with('@');
    let mut candidates: Vec<String> = Vec::new();

    for ancestor in dir.ancestors() {
        if ancestor.file_name().is_some_and(|n| n == "node_modules") {
            continue;
        }
        let modules_dir = ancestor.join("node_modules");
        let Ok(names) = pathwise_util::fs::read_dir_names(&modules_dir) else {
            continue;
        };

        for name in names {
            match (scoped, name.starts_with('@')) {
                (true, true) => {
                    let scope_dir = modules_dir.join(&name);
                    if let Ok(members) = pathwise_util::fs::read_dir_names(&scope_dir) {
                        candidates.extend(members.into_iter().map(|m| format!("{name}/{m}")));
                    }
                }
                (false, false) if pathwise_util::fs::is_dir(&modules_dir.join(&name)) => {
                    candidates.push(name);
                }
                _ => {}
            }
        }
    }

    candidates.sort_by_key(String::len);
    trace!(module = %module_name, candidates = candidates.len(), "alternative modules");
    fuzzy_search(&candidates, module_name)
}

/// Files near `dir` whose `./`-relative path looks like `file_specifier`.
///
/// Only files inside the package containing `dir` are suggested.
#[must_use]
pub fn find_alternative_files(
    fs: &dyn FileSystem,
    file_specifier: &str,
    dir: &Path,
) -> Vec<String> {
    let root = fs
        .find_ancestor_file(&["package.json"], dir)
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| dir.to_path_buf());
    let max_len = file_specifier.len() + FILE_LENGTH_SLACK;

    let mut candidates: Vec<String> = WalkDir::new(&root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| path::relative_path(dir, e.path()).len() < max_len)
        .filter_map(Result::ok)
        .map(|e| path::relative_path(dir, e.path()))
        .collect();

    if path::extname(file_specifier).is_empty() {
        for candidate in &mut candidates {
            let ext_len = path::extname(candidate).len();
            candidate.truncate(candidate.len() - ext_len);
        }
    }

    fuzzy_search(&candidates, file_specifier)
}

/// Candidates within edit distance of less than half the target's length,
/// closest first.
fn fuzzy_search(candidates: &[String], target: &str) -> Vec<String> {
    let target_len = target.chars().count();
    let mut scored: Vec<(usize, &String)> = candidates
        .iter()
        .map(|c| (levenshtein(c, target), c))
        .filter(|(d, _)| d * 2 < target_len)
        .collect();
    scored.sort_by_key(|(d, _)| *d);

    let mut out: Vec<String> = Vec::with_capacity(MAX_SUGGESTIONS);
    for (_, candidate) in scored {
        if !out.contains(candidate) {
            out.push(candidate.clone());
        }
        if out.len() == MAX_SUGGESTIONS {
            break;
        }
    }
    out
}

fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut prev = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            let next = (row[j] + 1).min(row[j + 1] + 1).min(prev + cost);
            prev = row[j + 1];
            row[j + 1] = next;
        }
    }

    row[b.len()]
}
