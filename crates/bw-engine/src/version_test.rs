use super::*;

fn v(raw: &str) -> Version {
    Version::parse(raw).unwrap()
}

#[test]
fn test_parse_dotted_and_underscored() {
    assert_eq!(v("1.2.3").segments(), &[1, 2, 3]);
    assert_eq!(v("1_2_3").segments(), &[1, 2, 3]);
    assert_eq!(v("2_0").to_string(), "2.0");
}

#[test]
fn test_parse_rejects_garbage() {
    for raw in ["", "a", "1..2", "1.x", "-1", "1."] {
        assert!(
            matches!(Version::parse(raw), Err(EngineError::InvalidVersion { .. })),
            "expected {raw:?} to be rejected"
        );
    }
}

#[test]
fn test_numeric_ordering() {
    assert!(v("2") < v("10"));
    assert!(v("1.9") < v("1.10"));
    assert!(v("1") < v("1.0.1"));
    assert!(v("0") < v("1"));
}

#[test]
fn test_trailing_zeros_are_equal() {
    assert_eq!(v("1"), v("1.0"));
    assert_eq!(v("1.0.0"), v("1"));

    let mut set = std::collections::HashSet::new();
    set.insert(v("3"));
    assert!(set.contains(&v("3.0")));
}

#[test]
fn test_from_str() {
    let parsed: Version = "4.1".parse().unwrap();
    assert_eq!(parsed, v("4.1"));
}
