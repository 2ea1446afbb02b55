use super::*;

const VALUES: &[(&str, &str)] = &[
    (SCHEMA_NAME, "ops"),
    (TABLE_NAME, "releasetable"),
    (DEFAULT_RELEASE, "main"),
];

#[test]
fn test_render_embedded_templates() {
    for dialect in [DbType::DuckDb, DbType::Sqlite] {
        let ddl = render(embedded_template(dialect), VALUES).unwrap();
        assert!(ddl.contains(r#"CREATE TABLE "ops"."releasetable""#), "{ddl}");
        assert!(ddl.contains("VALUES ('main')"), "{ddl}");
        assert!(!ddl.contains("${"), "{ddl}");
    }
}

#[test]
fn test_only_duckdb_creates_schema() {
    assert!(embedded_template(DbType::DuckDb).contains("CREATE SCHEMA IF NOT EXISTS"));
    assert!(!embedded_template(DbType::Sqlite).contains("CREATE SCHEMA"));
}

#[test]
fn test_render_replaces_repeated_placeholders() {
    let rendered = render("${table_name}/${table_name}", VALUES).unwrap();
    assert_eq!(rendered, "releasetable/releasetable");
}

#[test]
fn test_render_rejects_unknown_placeholder() {
    let err = render("CREATE TABLE ${owner}.t (x INT)", VALUES).unwrap_err();
    assert!(matches!(err, BranchError::Configuration(ref msg) if msg.contains("${owner}")));
}

#[test]
fn test_render_rejects_unterminated_placeholder() {
    let err = render("CREATE TABLE ${schema_name.t", VALUES).unwrap_err();
    assert!(matches!(err, BranchError::Configuration(_)));
}

#[test]
fn test_load_missing_template() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_template(&dir.path().join("missing.sql")).unwrap_err();
    assert!(matches!(err, BranchError::Configuration(ref msg) if msg.contains("missing.sql")));
}
