use super::*;
use bw_engine::{AppliedMigration, MigrationKind, ResolvedScript, Version};
use std::path::PathBuf;

#[test]
fn test_report_serializes_applied_and_pending() {
    let info = MigrationInfo {
        applied: vec![AppliedMigration {
            installed_rank: 1,
            version: Version::parse("0").unwrap(),
            description: "<< Baseline >>".to_string(),
            script: "<< Baseline >>".to_string(),
            checksum: String::new(),
            installed_on: "2024-01-01T00:00:00+00:00".to_string(),
            kind: MigrationKind::Baseline,
        }],
        pending: vec![ResolvedScript {
            version: Version::parse("1_1").unwrap(),
            description: "create people".to_string(),
            script: "V1_1__create_people.sql".to_string(),
            location: "db/main".to_string(),
            path: PathBuf::from("db/main/V1_1__create_people.sql"),
            sql: "CREATE TABLE people (id INTEGER);".to_string(),
            checksum: "abc".to_string(),
        }],
        current: Version::parse("0").ok(),
    };

    let report = build_report("main", &["db/main".to_string()], &info);
    let json: serde_json::Value = serde_json::to_value(&report).unwrap();

    assert_eq!(json["release"], "main");
    assert_eq!(json["current_version"], "0");
    assert_eq!(json["applied"][0]["kind"], "BASELINE");
    assert_eq!(json["pending"][0]["version"], "1.1");
    assert_eq!(json["pending"][0]["location"], "db/main");
}

#[test]
fn test_report_without_history() {
    let report = build_report("main", &[], &MigrationInfo::default());
    let json = serde_json::to_value(&report).unwrap();
    assert!(json["current_version"].is_null());
    assert_eq!(json["applied"].as_array().unwrap().len(), 0);
}
