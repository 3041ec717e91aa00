//! Pluggable value matchers.
//!
//! Only equality is implemented. Matching rules found in a contract are
//! carried through unchanged and comparison falls back to equality; this is
//! the seam where type/regex/length matchers would be registered.

use crate::domain::compare::{compare, ComparisonResult, ROOT_PATH};
use crate::domain::contract::MatcherSet;
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

pub trait Matcher: Send + Sync {
    /// Rule name as it appears in a contract's `match` field.
    fn name(&self) -> &str;

    fn matches(&self, expected: Option<&JsonValue>, actual: Option<&JsonValue>) -> ComparisonResult;
}

/// Structural equality via the comparator.
#[derive(Debug, Default, Clone, Copy)]
pub struct EqualityMatcher;

impl Matcher for EqualityMatcher {
    fn name(&self) -> &str {
        "equality"
    }

    fn matches(&self, expected: Option<&JsonValue>, actual: Option<&JsonValue>) -> ComparisonResult {
        compare(expected, actual, ROOT_PATH)
    }
}

/// Registered matchers by name.
pub struct MatcherRegistry {
    matchers: HashMap<String, Arc<dyn Matcher>>,
}

impl MatcherRegistry {
    /// A registry holding the equality matcher.
    pub fn new() -> Self {
        let mut registry = Self {
            matchers: HashMap::new(),
        };
        registry.register(EqualityMatcher);
        registry
    }

    pub fn register<M: Matcher + 'static>(&mut self, matcher: M) {
        self.matchers
            .insert(matcher.name().to_string(), Arc::new(matcher));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Matcher>> {
        self.matchers.get(name).cloned()
    }

    /// Compares a body. Rules are accepted but not yet applied.
    pub fn compare_body(
        &self,
        expected: Option<&JsonValue>,
        actual: Option<&JsonValue>,
        rules: Option<&BTreeMap<String, MatcherSet>>,
    ) -> ComparisonResult {
        if rules.is_some_and(|r| !r.is_empty()) {
            tracing::debug!("body matching rules present; comparing by equality");
        }
        match self.get("equality") {
            Some(matcher) => matcher.matches(expected, actual),
            None => EqualityMatcher.matches(expected, actual),
        }
    }
}

impl Default for MatcherRegistry {
    fn default() -> Self {
        Self::new()
    }
}
