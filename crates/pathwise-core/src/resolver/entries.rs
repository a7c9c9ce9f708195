//! Package entry point selection.

use super::env::Environment;
use super::package::PackageDescriptor;
use pathwise_util::path;
use serde_json::Value;
use std::path::PathBuf;

/// A candidate entry file declared by a package.json field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageEntry {
    /// Field name for messages, e.g. `main` or `browser/widgets`.
    pub field: String,
    /// Key path of the value inside package.json.
    pub pointer: Vec<String>,
    /// Absolute path of the entry, without extension expansion.
    pub filename: PathBuf,
}

/// Entry candidates of `pkg` in `main_fields` order.
///
/// The `browser` field is skipped outside browser environments. A browser
/// map keyed by the package's own name supplies that entry. Non-string and
/// empty values are dropped; `.` and `./` mean `index`.
#[must_use]
pub fn package_entries(
    pkg: &PackageDescriptor,
    main_fields: &[String],
    env: &Environment,
) -> Vec<PackageEntry> {
    main_fields
        .iter()
        .filter_map(|field| {
            let (field, pointer, value) = select(pkg, field, env)?;
            let value = value.as_str().filter(|v| !v.is_empty())?;
            let value = if value == "." || value == "./" {
                "index"
            } else {
                value
            };
            Some(PackageEntry {
                field,
                pointer,
                filename: path::resolve(&pkg.dir, value),
            })
        })
        .collect()
}

fn select<'a>(
    pkg: &'a PackageDescriptor,
    field: &str,
    env: &Environment,
) -> Option<(String, Vec<String>, &'a Value)> {
    if field == "browser" {
        if let Some(browser) = &pkg.browser {
            if !env.is_browser() {
                return None;
            }
            if browser.is_string() {
                return Some((field.to_string(), vec![field.to_string()], browser));
            }
            if let Some(name) = &pkg.name {
                if let Some(own) = browser.get(name).filter(|v| is_truthy(v)) {
                    return Some((
                        format!("browser/{name}"),
                        vec![field.to_string(), name.clone()],
                        own,
                    ));
                }
            }
        }
    }

    pkg.field(field)
        .map(|value| (field.to_string(), vec![field.to_string()], value))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}
