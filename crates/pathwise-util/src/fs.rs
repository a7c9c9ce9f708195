use std::fs;
use std::io;
use std::path::Path;

/// Read a file to string, replacing invalid UTF-8 sequences with the replacement character.
///
/// # Errors
/// Returns an error if the file cannot be read.
pub fn read_to_string_lossy(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// List the entry names of a directory, sorted.
///
/// Names that are not valid UTF-8 are skipped.
///
/// # Errors
/// Returns an error if the directory cannot be read.
pub fn read_dir_names(path: &Path) -> io::Result<Vec<String>> {
    let mut names: Vec<String> = fs::read_dir(path)?
        .filter_map(Result::ok)
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect();
    names.sort();
    Ok(names)
}

/// Returns true if `path` is an existing directory (following symlinks).
#[must_use]
pub fn is_dir(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|m| m.is_dir())
}

/// Returns true if `path` is an existing regular file (following symlinks).
#[must_use]
pub fn is_file(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|m| m.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn test_read_to_string_lossy_valid_utf8() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"name": "pkg"}"#).unwrap();
        file.flush().unwrap();

        let content = read_to_string_lossy(file.path()).unwrap();
        assert_eq!(content, r#"{"name": "pkg"}"#);
    }

    #[test]
    fn test_read_to_string_lossy_invalid_utf8() {
        let mut file = NamedTempFile::new().unwrap();
        // Write invalid UTF-8: valid start, then invalid continuation
        file.write_all(&[0x48, 0x65, 0x6c, 0x6c, 0x6f, 0x80, 0x81])
            .unwrap();
        file.flush().unwrap();

        let content = read_to_string_lossy(file.path()).unwrap();
        assert!(content.starts_with("Hello"));
        assert!(content.contains('\u{FFFD}'));
    }

    #[test]
    fn test_read_dir_names_sorted() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.js"), "").unwrap();
        fs::write(dir.path().join("a.js"), "").unwrap();
        fs::create_dir(dir.path().join("c")).unwrap();

        let names = read_dir_names(dir.path()).unwrap();
        assert_eq!(names, vec!["a.js", "b.js", "c"]);
    }

    #[test]
    fn test_is_dir_and_is_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("index.js");
        fs::write(&file, "").unwrap();

        assert!(is_dir(dir.path()));
        assert!(!is_file(dir.path()));
        assert!(is_file(&file));
        assert!(!is_dir(&file));
        assert!(!is_file(&dir.path().join("missing.js")));
    }
}
