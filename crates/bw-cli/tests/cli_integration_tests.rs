//! End-to-end tests for the `bw` binary

use std::fs;
use std::path::Path;
use std::process::Command;

fn bw_bin() -> String {
    env!("CARGO_BIN_EXE_bw").to_string()
}

/// Run `bw -p <project> <args>` and return (stdout, stderr, success).
fn run_bw(project: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(bw_bin())
        .arg("-p")
        .arg(project)
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to execute bw with args {:?}: {}", args, e));
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.success(),
    )
}

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(
        &dir.path().join("branchway.yml"),
        "database:\n  type: duckdb\n  path: app.duckdb\nlocations:\n  - migrations\n",
    );
    write(
        &dir.path().join("migrations/main/V1__create_people.sql"),
        "CREATE TABLE people (id INTEGER, name VARCHAR);",
    );
    dir
}

#[test]
fn test_migrate_then_switch_release() {
    let dir = project();
    let root = dir.path();

    let (stdout, stderr, ok) = run_bw(root, &["migrate"]);
    assert!(ok, "migrate failed: {stderr}");
    assert!(stdout.contains("Applied 1 migration(s) in 1 pass(es); release is now 'main'"));

    let (stdout, _, ok) = run_bw(root, &["release", "show"]);
    assert!(ok);
    assert_eq!(stdout.trim(), "main");

    let (stdout, stderr, ok) = run_bw(root, &["release", "set", "hotfix"]);
    assert!(ok, "release set failed: {stderr}");
    assert_eq!(stdout.trim(), "main -> hotfix");

    write(
        &root.join("migrations/hotfix/V2__add_email.sql"),
        "ALTER TABLE people ADD COLUMN email VARCHAR;",
    );
    let (stdout, stderr, ok) = run_bw(root, &["migrate"]);
    assert!(ok, "second migrate failed: {stderr}");
    assert!(stdout.contains("release is now 'hotfix'"), "{stdout}");

    let (stdout, _, ok) = run_bw(root, &["info", "--json"]);
    assert!(ok);
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["release"], "hotfix");
    assert_eq!(report["current_version"], "2");
    assert_eq!(report["locations"][0], "migrations/hotfix");
    assert_eq!(report["pending"].as_array().unwrap().len(), 0);
}

#[test]
fn test_release_set_rejects_path_separator() {
    let dir = project();
    let (_, stderr, ok) = run_bw(dir.path(), &["release", "set", "feature/x"]);
    assert!(!ok);
    assert!(stderr.contains("B002"), "{stderr}");
}

#[test]
fn test_missing_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, ok) = run_bw(dir.path(), &["migrate"]);
    assert!(!ok);
    assert!(stderr.contains("Failed to load configuration"), "{stderr}");
}
