//! Structural comparison rules: reflexivity, subset-on-objects, exact arrays.

use pactum::domain::compare::{compare, compare_headers, compare_status, HeaderSet, ROOT_PATH};
use pactum::domain::matching::{Matcher, MatcherRegistry};
use serde_json::{json, Value};

fn samples() -> Vec<Value> {
    vec![
        json!(null),
        json!(true),
        json!(0),
        json!(-17),
        json!(3.25),
        json!(""),
        json!("text"),
        json!([]),
        json!([1, "two", null, [3]]),
        json!({}),
        json!({"id": 1, "tags": ["a", "b"], "owner": {"name": "Ada", "roles": [{"r": "admin"}]}}),
    ]
}

#[test]
fn every_value_matches_itself() {
    for value in samples() {
        let result = compare(Some(&value), Some(&value), ROOT_PATH);
        assert!(result.matched, "{} should match itself: {:?}", value, result.diffs);
        assert!(result.diffs.is_empty());
    }
}

#[test]
fn extra_keys_in_actual_objects_are_ignored() {
    let expected = json!({"id": 1, "owner": {"name": "Ada"}});
    let actual = json!({
        "id": 1,
        "createdAt": "2024-01-01",
        "owner": {"name": "Ada", "email": "ada@example.com"}
    });
    assert!(compare(Some(&expected), Some(&actual), ROOT_PATH).matched);

    // The converse is not true: a missing key is a diff.
    let result = compare(Some(&actual), Some(&expected), ROOT_PATH);
    assert!(!result.matched);
    assert!(result.diffs.iter().any(|d| d == "$.createdAt: missing field"));
}

#[test]
fn array_length_must_match() {
    let result = compare(Some(&json!([1, 2])), Some(&json!([1, 2, 3])), ROOT_PATH);
    assert!(!result.matched);
    assert_eq!(result.diffs.len(), 1);
    assert!(result.diffs[0].contains("length"), "{}", result.diffs[0]);
}

#[test]
fn arrays_compare_positionally() {
    let result = compare(Some(&json!([1, 2])), Some(&json!([2, 1])), ROOT_PATH);
    assert_eq!(result.diffs, vec!["$[0]: expected 1, got 2", "$[1]: expected 2, got 1"]);
}

#[test]
fn diffs_carry_nested_paths() {
    let expected = json!({"user": {"tags": ["a", {"k": true}]}});
    let actual = json!({"user": {"tags": ["a", {"k": false}]}});
    let result = compare(Some(&expected), Some(&actual), ROOT_PATH);
    assert_eq!(result.diffs, vec!["$.user.tags[1].k: expected true, got false"]);
    assert_eq!(result.joined(), "$.user.tags[1].k: expected true, got false");
}

#[test]
fn kind_mismatches_are_reported() {
    let result = compare(Some(&json!({"a": 1})), Some(&json!([1])), ROOT_PATH);
    assert_eq!(result.diffs, vec!["$: expected object, got array"]);

    let result = compare(Some(&json!([1])), None, ROOT_PATH);
    assert_eq!(result.diffs, vec!["$: expected array, got nothing"]);
}

#[test]
fn integers_and_floats_are_one_kind() {
    assert!(compare(Some(&json!(1)), Some(&json!(1.0)), ROOT_PATH).matched);
    assert!(!compare(Some(&json!(1)), Some(&json!(1.5)), ROOT_PATH).matched);
}

#[test]
fn nested_null_matches_any_present_value() {
    let expected = json!({"a": null, "b": [null], "deletedAt": null});
    let actual = json!({"a": 0, "b": [5], "deletedAt": "2024-01-01T00:00:00Z"});
    let result = compare(Some(&expected), Some(&actual), ROOT_PATH);
    assert!(result.matched, "{:?}", result.diffs);
    assert!(compare(Some(&json!({"a": null})), Some(&json!({"a": null})), ROOT_PATH).matched);

    let missing = compare(Some(&json!({"a": null})), Some(&json!({})), ROOT_PATH);
    assert_eq!(missing.diffs, vec!["$.a: missing field"]);
}

#[test]
fn absent_expectation_matches_anything() {
    assert!(compare(None, Some(&json!({"anything": [1, 2]})), ROOT_PATH).matched);
    assert!(compare(None, None, ROOT_PATH).matched);
}

#[test]
fn status_and_headers() {
    assert_eq!(compare_status(200, 200), None);
    assert!(compare_status(200, 500).is_some_and(|d| d.contains("200") && d.contains("500")));

    let expected = json!({"Content-Type": "application/json", "X-Trace": "abc"});
    let actual = HeaderSet::from_pairs([("content-type", "application/json"), ("x-other", "1")]);
    let diffs = compare_headers(expected.as_object(), &actual);
    assert_eq!(diffs.len(), 1, "{:?}", diffs);
    assert!(diffs[0].contains("X-Trace"), "{}", diffs[0]);

    assert!(compare_headers(None, &actual).is_empty());
}

#[test]
fn default_matchers_fall_back_to_equality() {
    let registry = MatcherRegistry::new();
    let expected = json!({"id": 7});
    let actual = json!({"id": 7, "extra": true});
    assert!(registry.compare_body(Some(&expected), Some(&actual), None).matched);
    assert!(!registry
        .compare_body(Some(&expected), Some(&json!({"id": 8})), None)
        .matched);

    assert_eq!(registry.get("equality").map(|m| m.name().to_string()).as_deref(), Some("equality"));
    assert!(registry.get("regex").is_none());
}
