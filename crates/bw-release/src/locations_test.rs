use super::*;

fn locations(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|l| l.to_string()).collect()
}

#[test]
fn test_switch_between_releases() {
    let result = compute_locations("r1", "r2", &locations(&["db/migrations/app/r1"])).unwrap();
    assert_eq!(result, vec!["db/migrations/app/r2"]);
}

#[test]
fn test_first_run_appends_release() {
    let result = compute_locations("", "main", &locations(&["db/migrations"])).unwrap();
    assert_eq!(result, vec!["db/migrations/main"]);
}

#[test]
fn test_non_matching_suffix_is_kept() {
    let result = compute_locations("r1", "r2", &locations(&["db/other"])).unwrap();
    assert_eq!(result, vec!["db/other/r2"]);
}

#[test]
fn test_suffix_must_be_a_whole_segment() {
    let result = compute_locations("r1", "r2", &locations(&["db/archive_r1"])).unwrap();
    assert_eq!(result, vec!["db/archive_r1/r2"]);
}

#[test]
fn test_order_and_structure_preserved() {
    let current = locations(&["app/main", "shared/sql/main", "vendor"]);
    let result = compute_locations("main", "feature-x", &current).unwrap();
    assert_eq!(
        result,
        vec!["app/feature-x", "shared/sql/feature-x", "vendor/feature-x"]
    );
}

#[test]
fn test_rejects_empty_location() {
    let err = compute_locations("main", "next", &locations(&["db/main", ""])).unwrap_err();
    assert!(matches!(err, BranchError::Configuration(ref msg) if msg.contains("#2")));
}

#[test]
fn test_rejects_bad_release() {
    let current = locations(&["db/main"]);
    assert!(compute_locations("main", "", &current).is_err());
    assert!(compute_locations("main", "feature/x", &current).is_err());
    assert!(validate_release("feature-x").is_ok());
}

#[test]
fn test_bare_previous_release_is_rejected() {
    let err = compute_locations("r1", "r2", &locations(&["db/r1", "r1"])).unwrap_err();
    assert!(
        matches!(err, BranchError::Configuration(ref msg) if msg.contains("'r1'")),
        "unexpected error: {err}"
    );
}

#[test]
fn test_bare_location_allowed_on_first_run() {
    let result = compute_locations("", "r1", &locations(&["r1"])).unwrap();
    assert_eq!(result, vec!["r1/r1"]);
}
