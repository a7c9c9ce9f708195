use crate::config::CONFIG_FILE_NAME;
use pathwise_util::fs::is_file;
use std::path::{Path, PathBuf};

/// Find the project root by walking up from `cwd`.
///
/// The first directory holding a `pathwise.json` wins. Failing that, the
/// nearest directory with a `package.json` or `.git` is used.
#[must_use]
pub fn project_root(cwd: &Path) -> Option<PathBuf> {
    if let Some(dir) = cwd.ancestors().find(|d| is_file(&d.join(CONFIG_FILE_NAME))) {
        return Some(dir.to_path_buf());
    }

    cwd.ancestors()
        .find(|d| is_file(&d.join("package.json")) || d.join(".git").exists())
        .map(Path::to_path_buf)
}
