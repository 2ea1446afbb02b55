use super::*;

#[test]
fn test_parse_minimal_config() {
    let config: Config = serde_yaml::from_str("{}").unwrap();
    assert_eq!(config.database.db_type, DbType::DuckDb);
    assert_eq!(config.database.path, ":memory:");
    assert_eq!(config.locations, vec!["db/migrations".to_string()]);
    assert_eq!(config.history_table, "schema_version");
    assert!(config.validate_on_migrate);
    assert!(config.baseline_on_migrate);
    assert_eq!(config.baseline_version, "0");
    assert_eq!(config.branching.table, "releasetable");
    assert_eq!(config.branching.default_release, "main");
    assert_eq!(config.branching.max_passes, 10);
    assert!(config.branching.schema.is_none());
    config.validate().unwrap();
}

#[test]
fn test_parse_full_config() {
    let yaml = r#"
database:
  type: sqlite
  path: "./target/app.db"
  busy_timeout_ms: 250
locations:
  - db/migrations/app
  - db/migrations/reporting
history_table: flyway_history
baseline_on_migrate: false
baseline_version: "0"
validate_on_migrate: false
branching:
  table: release_control
  schema: ops
  default_release: trunk
  max_passes: 3
  ddl_template: templates/release.sql
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.database.db_type, DbType::Sqlite);
    assert_eq!(config.database.busy_timeout_ms, 250);
    assert_eq!(config.locations.len(), 2);
    assert_eq!(config.history_table, "flyway_history");
    assert!(!config.baseline_on_migrate);
    assert_eq!(config.baseline_version, "0");
    assert!(!config.validate_on_migrate);
    assert_eq!(config.branching.table, "release_control");
    assert_eq!(config.branching.schema.as_deref(), Some("ops"));
    assert_eq!(config.branching.default_release, "trunk");
    assert_eq!(config.branching.max_passes, 3);
    assert_eq!(
        config.branching.ddl_template,
        Some(PathBuf::from("templates/release.sql"))
    );
    config.validate().unwrap();
}

#[test]
fn test_unknown_field_rejected() {
    let result: Result<Config, _> = serde_yaml::from_str("locatons: [db]");
    assert!(result.is_err());
}

#[test]
fn test_db_type_display() {
    assert_eq!(DbType::DuckDb.to_string(), "duckdb");
    assert_eq!(DbType::Sqlite.to_string(), "sqlite");
}

#[test]
fn test_validate_rejects_empty_locations() {
    let config: Config = serde_yaml::from_str("locations: []").unwrap();
    let err = config.validate().unwrap_err();
    assert!(matches!(err, CoreError::ConfigInvalid { .. }));
}

#[test]
fn test_validate_rejects_blank_location() {
    let config: Config = serde_yaml::from_str("locations: [db/a, '  ']").unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("Location #2"));
}

#[test]
fn test_validate_rejects_release_with_separator() {
    let config: Config =
        serde_yaml::from_str("branching:\n  default_release: feature/x").unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_zero_passes() {
    let config: Config = serde_yaml::from_str("branching:\n  max_passes: 0").unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_shared_table_name() {
    let config: Config =
        serde_yaml::from_str("history_table: releasetable").unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_sqlite_memory() {
    let config: Config = serde_yaml::from_str("database:\n  type: sqlite").unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load(&dir.path().join("branchway.yml")).unwrap_err();
    assert!(matches!(err, CoreError::ConfigNotFound { .. }));
}

#[test]
fn test_load_from_dir_prefers_yml() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("branchway.yml"), "history_table: from_yml").unwrap();
    std::fs::write(dir.path().join("branchway.yaml"), "history_table: from_yaml").unwrap();

    let config = Config::load_from_dir(dir.path()).unwrap();
    assert_eq!(config.history_table, "from_yml");
}

#[test]
fn test_load_reports_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("branchway.yaml"), "locations: {").unwrap();

    let err = Config::load_from_dir(dir.path()).unwrap_err();
    assert!(matches!(err, CoreError::ConfigParseError { .. }));
}

#[test]
fn test_database_path_absolute() {
    let root = Path::new("/srv/app");
    let memory = Config::default();
    assert_eq!(memory.database_path_absolute(root), ":memory:");

    let mut file = Config::default();
    file.database.path = "data/app.duckdb".to_string();
    assert_eq!(
        file.database_path_absolute(root),
        root.join("data/app.duckdb").display().to_string()
    );
}
