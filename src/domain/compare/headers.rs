use crate::domain::contract::header_value_string;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;

/// Received HTTP headers with case-insensitive lookup.
///
/// Names are stored lowercased; when a header repeats, the first value wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HeaderSet(BTreeMap<String, String>);

impl HeaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut set = Self::new();
        for (name, value) in pairs {
            set.insert(name.as_ref(), value);
        }
        set
    }

    pub fn from_header_map(map: &axum::http::HeaderMap) -> Self {
        Self::from_pairs(
            map.iter()
                .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str(), v.to_string()))),
        )
    }

    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.0
            .entry(name.to_ascii_lowercase())
            .or_insert_with(|| value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Exact status comparison; `None` when equal.
pub fn compare_status(expected: u16, actual: u16) -> Option<String> {
    (expected != actual).then(|| format!("expected status {}, got {}", expected, actual))
}

/// Subset comparison: every expected header must be present with the same
/// string form. Extra actual headers are ignored.
pub fn compare_headers(expected: Option<&Map<String, JsonValue>>, actual: &HeaderSet) -> Vec<String> {
    let Some(expected) = expected else {
        return Vec::new();
    };
    let mut diffs = Vec::new();
    for (name, value) in expected {
        let expected_value = header_value_string(value);
        match actual.get(name) {
            None => diffs.push(format!("missing header: {}", name)),
            Some(actual_value) if actual_value != expected_value => diffs.push(format!(
                "header {}: expected {}, got {}",
                name, expected_value, actual_value
            )),
            Some(_) => {}
        }
    }
    diffs
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn header_lookup_ignores_case() {
        let set = HeaderSet::from_pairs([("Content-Type", "application/json")]);
        assert_eq!(set.get("content-type"), Some("application/json"));
        assert_eq!(set.get("CONTENT-TYPE"), Some("application/json"));
    }

    #[test]
    fn header_diffs_collect_every_problem() {
        let expected = json!({"Content-Type": "application/json", "X-Rate": 10, "X-Trace": "on"});
        let actual = HeaderSet::from_pairs([("content-type", "text/plain"), ("x-rate", "10")]);
        let diffs = compare_headers(expected.as_object(), &actual);
        assert_eq!(
            diffs,
            vec![
                "header Content-Type: expected application/json, got text/plain".to_string(),
                "missing header: X-Trace".to_string(),
            ]
        );
    }

    #[test]
    fn status_mismatch_is_one_diff() {
        assert_eq!(compare_status(200, 200), None);
        assert_eq!(compare_status(200, 500).as_deref(), Some("expected status 200, got 500"));
    }
}
