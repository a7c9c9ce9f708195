//! Integration tests for `pathwise resolve` output.

use serial_test::serial;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn cargo_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO"));
    cmd.args(["run", "-p", "pathwise-cli", "--bin", "pathwise", "--"]);
    cmd
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A small project with one installed package.
fn fixture() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "package.json", r#"{"name": "app"}"#);
    write(root, "src/index.js", "");
    write(root, "src/utils.ts", "");
    write(
        root,
        "node_modules/lodash/package.json",
        r#"{"name": "lodash", "main": "lodash.js", "sideEffects": false}"#,
    );
    write(root, "node_modules/lodash/lodash.js", "");
    write(root, "node_modules/lodash/map.js", "");
    dir
}

fn resolve_json(dir: &Path, args: &[&str]) -> (Output, serde_json::Value) {
    let output = cargo_bin()
        .arg("--cwd")
        .arg(dir)
        .args(["--json", "resolve", "--from", "src/index.js"])
        .args(args)
        .output()
        .expect("Failed to run resolve command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value =
        serde_json::from_str(&stdout).expect("stdout should be valid JSON");
    (output, json)
}

fn assert_no_json_on_stderr(output: &Output) {
    let stderr = String::from_utf8_lossy(&output.stderr);
    for line in stderr.lines() {
        if !line.trim().is_empty()
            && !line.contains("Compiling")
            && !line.contains("Finished")
            && !line.contains("Running")
        {
            assert!(
                !line.trim().starts_with('{'),
                "stderr should not contain JSON: {line}"
            );
        }
    }
}

#[test]
#[serial]
fn test_resolve_json_success() {
    let dir = fixture();
    let (output, json) = resolve_json(dir.path(), &["lodash", "lodash/map", "./utils"]);

    assert!(output.status.success(), "resolve should succeed");
    assert_eq!(json["schema_version"].as_u64(), Some(1));
    assert_eq!(json["ok"].as_bool(), Some(true));

    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);

    assert_eq!(results[0]["specifier"], "lodash");
    assert_eq!(results[0]["status"], "resolved");
    assert!(results[0]["filePath"]
        .as_str()
        .unwrap()
        .ends_with("lodash.js"));
    assert_eq!(results[0]["sideEffects"].as_bool(), Some(false));

    assert!(results[1]["filePath"].as_str().unwrap().ends_with("map.js"));
    assert!(results[2]["filePath"].as_str().unwrap().ends_with("utils.ts"));

    // Every result reports what would invalidate it.
    for result in results {
        let invalidations = &result["invalidations"];
        assert!(invalidations["invalidateOnFileCreate"].is_array());
        assert!(invalidations["invalidateOnFileChange"].is_array());
    }

    assert_no_json_on_stderr(&output);
}

#[test]
#[serial]
fn test_resolve_json_failure_reports_diagnostic() {
    let dir = fixture();
    let (output, json) = resolve_json(dir.path(), &["lodash", "lodahs"]);

    assert!(!output.status.success(), "a failed specifier should fail the command");
    assert_eq!(json["ok"].as_bool(), Some(false));

    let results = json["results"].as_array().unwrap();
    assert_eq!(results[0]["status"], "resolved");

    let failed = &results[1];
    assert_eq!(failed["status"], "failed");
    assert_eq!(failed["kind"], "module_not_found");
    assert_eq!(failed["code"], "MODULE_NOT_FOUND");
    assert_eq!(failed["message"], "Cannot find module 'lodahs'");
    assert_eq!(failed["hints"][0], "Did you mean 'lodash'?");

    let creates = failed["invalidations"]["invalidateOnFileCreate"]
        .as_array()
        .unwrap();
    assert!(creates
        .iter()
        .any(|c| c["fileName"] == "node_modules/lodahs"));
}

#[test]
#[serial]
fn test_resolve_json_malformed_package_keeps_siblings() {
    let dir = fixture();
    write(dir.path(), "node_modules/bad/package.json", "{");
    write(dir.path(), "node_modules/bad/index.js", "");

    let (output, json) = resolve_json(dir.path(), &["lodash", "bad", "./utils"]);

    assert!(!output.status.success());
    assert_eq!(json["ok"].as_bool(), Some(false));

    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0]["status"], "resolved");
    assert!(results[0]["filePath"]
        .as_str()
        .unwrap()
        .ends_with("lodash.js"));

    assert_eq!(results[1]["specifier"], "bad");
    assert_eq!(results[1]["status"], "fatal");
    assert!(results[1]["message"]
        .as_str()
        .unwrap()
        .contains("Malformed package.json"));

    assert_eq!(results[2]["status"], "resolved");
}

#[test]
#[serial]
fn test_resolve_node_target_excludes_builtins() {
    let dir = fixture();
    let (output, json) = resolve_json(dir.path(), &["--target", "node", "fs", "path"]);

    assert!(output.status.success());
    for result in json["results"].as_array().unwrap() {
        assert_eq!(result["status"], "excluded");
    }
}

#[test]
#[serial]
fn test_resolve_human_output() {
    let dir = fixture();
    let output = cargo_bin()
        .arg("--cwd")
        .arg(dir.path())
        .args(["resolve", "--from", "src/index.js", "lodash", "missing-pkg"])
        .output()
        .expect("Failed to run resolve command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stdout.contains("lodash -> "), "stdout: {stdout}");
    assert!(stdout.contains("(side-effect free)"), "stdout: {stdout}");
    assert!(
        stderr.contains("Cannot find module 'missing-pkg'"),
        "stderr: {stderr}"
    );
}

#[test]
#[serial]
fn test_resolve_uses_config_file() {
    let dir = fixture();
    write(
        dir.path(),
        "pathwise.json",
        r#"{"extensions": [".mjs"], "environment": {"context": "node"}}"#,
    );
    write(dir.path(), "src/esm.mjs", "");

    let (output, json) = resolve_json(dir.path(), &["./esm", "fs"]);

    assert!(output.status.success());
    let results = json["results"].as_array().unwrap();
    assert!(results[0]["filePath"].as_str().unwrap().ends_with("esm.mjs"));
    assert_eq!(results[1]["status"], "excluded");
}
