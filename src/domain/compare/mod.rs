//! Structural comparison of expected and actual values.
//!
//! `expected` acts as a minimal-shape assertion: objects may carry extra keys,
//! arrays must match length and position, scalars must match exactly. Every
//! mismatch is reported with a JSON-path-like location (`$`, `$.field`, `$[i]`).

use serde_json::{Map, Number, Value as JsonValue};

mod headers;

pub use headers::{compare_headers, compare_status, HeaderSet};

/// Root path used for whole-document comparisons.
pub const ROOT_PATH: &str = "$";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComparisonResult {
    pub matched: bool,
    pub diffs: Vec<String>,
}

impl ComparisonResult {
    pub fn matched() -> Self {
        Self {
            matched: true,
            diffs: Vec::new(),
        }
    }

    /// Matched exactly when `diffs` is empty.
    pub fn from_diffs(diffs: Vec<String>) -> Self {
        Self {
            matched: diffs.is_empty(),
            diffs,
        }
    }

    /// Diffs joined with `"; "`.
    pub fn joined(&self) -> String {
        self.diffs.join("; ")
    }
}

/// Compares `actual` against `expected` starting at `path`.
///
/// An absent or null expectation matches anything, at any depth.
pub fn compare(expected: Option<&JsonValue>, actual: Option<&JsonValue>, path: &str) -> ComparisonResult {
    let mut diffs = Vec::new();
    if let Some(expected) = expected {
        compare_value(expected, actual, path, &mut diffs);
    }
    ComparisonResult::from_diffs(diffs)
}

fn compare_value(expected: &JsonValue, actual: Option<&JsonValue>, path: &str, diffs: &mut Vec<String>) {
    match expected {
        JsonValue::Object(expected) => match actual {
            Some(JsonValue::Object(actual)) => compare_objects(expected, actual, path, diffs),
            other => diffs.push(format!("{}: expected object, got {}", path, kind_of(other))),
        },
        JsonValue::Array(expected) => match actual {
            Some(JsonValue::Array(actual)) => compare_arrays(expected, actual, path, diffs),
            other => diffs.push(format!("{}: expected array, got {}", path, kind_of(other))),
        },
        // A null expectation leaves the value unconstrained; the key itself
        // must still be present.
        JsonValue::Null => {}
        scalar => {
            if !actual.is_some_and(|actual| scalars_equal(scalar, actual)) {
                diffs.push(format!(
                    "{}: expected {}, got {}",
                    path,
                    scalar,
                    actual.map_or_else(|| "nothing".to_string(), |v| v.to_string())
                ));
            }
        }
    }
}

fn compare_objects(
    expected: &Map<String, JsonValue>,
    actual: &Map<String, JsonValue>,
    path: &str,
    diffs: &mut Vec<String>,
) {
    for (key, expected_value) in expected {
        let child = format!("{}.{}", path, key);
        match actual.get(key) {
            Some(actual_value) => compare_value(expected_value, Some(actual_value), &child, diffs),
            None => diffs.push(format!("{}: missing field", child)),
        }
    }
}

fn compare_arrays(expected: &[JsonValue], actual: &[JsonValue], path: &str, diffs: &mut Vec<String>) {
    if expected.len() != actual.len() {
        diffs.push(format!(
            "{}: expected array length {}, got {}",
            path,
            expected.len(),
            actual.len()
        ));
        return;
    }
    for (i, (e, a)) in expected.iter().zip(actual).enumerate() {
        compare_value(e, Some(a), &format!("{}[{}]", path, i), diffs);
    }
}

fn scalars_equal(expected: &JsonValue, actual: &JsonValue) -> bool {
    match (expected, actual) {
        (JsonValue::Number(e), JsonValue::Number(a)) => numbers_equal(e, a),
        (e, a) => e == a,
    }
}

/// JSON numbers form one kind: `1` equals `1.0`.
fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

fn kind_of(value: Option<&JsonValue>) -> &'static str {
    match value {
        None => "nothing",
        Some(JsonValue::Null) => "null",
        Some(JsonValue::Bool(_)) => "boolean",
        Some(JsonValue::Number(_)) => "number",
        Some(JsonValue::String(_)) => "string",
        Some(JsonValue::Array(_)) => "array",
        Some(JsonValue::Object(_)) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integer_and_float_forms_are_equal() {
        assert!(compare(Some(&json!(1)), Some(&json!(1.0)), ROOT_PATH).matched);
        assert!(compare(Some(&json!({"n": -3})), Some(&json!({"n": -3.0})), ROOT_PATH).matched);
        assert!(!compare(Some(&json!(1)), Some(&json!(1.5)), ROOT_PATH).matched);
    }

    #[test]
    fn scalar_kinds_do_not_coerce() {
        let result = compare(Some(&json!("1")), Some(&json!(1)), ROOT_PATH);
        assert_eq!(result.diffs, vec![r#"$: expected "1", got 1"#]);
    }

    #[test]
    fn null_inside_documents_matches_any_value() {
        let result = compare(Some(&json!({"deleted": null})), Some(&json!({"deleted": false})), ROOT_PATH);
        assert!(result.matched, "{:?}", result.diffs);
        let result = compare(Some(&json!({"deleted": null})), Some(&json!({})), ROOT_PATH);
        assert_eq!(result.diffs, vec!["$.deleted: missing field"]);
    }

    #[test]
    fn missing_actual_is_reported_not_panicked() {
        let result = compare(Some(&json!({"a": 1})), None, ROOT_PATH);
        assert_eq!(result.diffs, vec!["$: expected object, got nothing"]);
    }
}
