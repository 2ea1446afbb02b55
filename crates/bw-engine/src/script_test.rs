use super::*;
use std::fs;

fn write(dir: &Path, name: &str, sql: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join(name), sql).unwrap();
}

#[test]
fn test_parse_script_name() {
    let (version, description) = parse_script_name("V1_2__add_people_table.sql")
        .unwrap()
        .unwrap();
    assert_eq!(version.to_string(), "1.2");
    assert_eq!(description, "add people table");
}

#[test]
fn test_parse_script_name_ignores_other_files() {
    assert!(parse_script_name("README.md").unwrap().is_none());
    assert!(parse_script_name("R__views.sql").unwrap().is_none());
    assert!(parse_script_name("V1__notes.txt").unwrap().is_none());
}

#[test]
fn test_parse_script_name_rejects_malformed() {
    for name in ["V1.sql", "V1__.sql", "Vx__bad.sql"] {
        assert!(
            matches!(
                parse_script_name(name),
                Err(EngineError::InvalidScriptName { .. })
            ),
            "expected {name} to be rejected"
        );
    }
}

#[test]
fn test_resolve_sorts_across_locations() {
    let root = tempfile::tempdir().unwrap();
    write(&root.path().join("a"), "V10__ten.sql", "SELECT 10;");
    write(&root.path().join("a"), "V2__two.sql", "SELECT 2;");
    write(&root.path().join("b"), "V3__three.sql", "SELECT 3;");
    write(&root.path().join("b"), "notes.md", "ignored");

    let scripts = resolve_scripts(root.path(), &["a".to_string(), "b".to_string()]).unwrap();
    let versions: Vec<String> = scripts.iter().map(|s| s.version.to_string()).collect();
    assert_eq!(versions, vec!["2", "3", "10"]);
    assert_eq!(scripts[1].location, "b");
    assert_eq!(scripts[1].script, "V3__three.sql");
    assert_eq!(scripts[1].checksum, compute_checksum("SELECT 3;"));
}

#[test]
fn test_resolve_skips_missing_location() {
    let root = tempfile::tempdir().unwrap();
    write(&root.path().join("present"), "V1__one.sql", "SELECT 1;");

    let scripts = resolve_scripts(
        root.path(),
        &["absent".to_string(), "present".to_string()],
    )
    .unwrap();
    assert_eq!(scripts.len(), 1);
}

#[test]
fn test_resolve_rejects_duplicate_versions() {
    let root = tempfile::tempdir().unwrap();
    write(&root.path().join("a"), "V1__one.sql", "SELECT 1;");
    write(&root.path().join("b"), "V1.0__again.sql", "SELECT 1;");

    let err = resolve_scripts(root.path(), &["a".to_string(), "b".to_string()]).unwrap_err();
    assert!(matches!(err, EngineError::DuplicateVersion { .. }));
}

#[test]
fn test_subdirectories_are_not_scanned() {
    let root = tempfile::tempdir().unwrap();
    write(&root.path().join("db"), "V1__one.sql", "SELECT 1;");
    write(&root.path().join("db").join("feature"), "V2__two.sql", "SELECT 2;");

    let scripts = resolve_scripts(root.path(), &["db".to_string()]).unwrap();
    assert_eq!(scripts.len(), 1);
}
