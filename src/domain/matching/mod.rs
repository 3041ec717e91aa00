//! Selecting the registered interaction that an inbound request satisfies.

use crate::domain::compare::HeaderSet;
use crate::domain::contract::{header_value_string, Interaction, Request};
use std::collections::BTreeMap;

pub mod rules;

pub use rules::{EqualityMatcher, Matcher, MatcherRegistry};

/// The parts of an inbound HTTP request that take part in matching.
#[derive(Debug, Clone, Default)]
pub struct IncomingRequest {
    pub method: String,
    pub path: String,
    /// Decoded query parameters, values in arrival order.
    pub query: BTreeMap<String, Vec<String>>,
    pub headers: HeaderSet,
}

impl IncomingRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    /// Decodes a raw `a=1&b=2&a=3` query string.
    pub fn with_raw_query(mut self, raw: &str) -> Self {
        for (name, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            self.query
                .entry(name.into_owned())
                .or_default()
                .push(value.into_owned());
        }
        self
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// First interaction, in registration order, whose request matches.
pub fn find_match<'a>(request: &IncomingRequest, interactions: &'a [Interaction]) -> Option<&'a Interaction> {
    interactions
        .iter()
        .find(|interaction| request_matches(request, &interaction.request))
}

/// Method (case-insensitive), exact path, exact per-key query values when
/// expected, and header subset when expected.
pub fn request_matches(actual: &IncomingRequest, expected: &Request) -> bool {
    if !actual.method.eq_ignore_ascii_case(&expected.method) {
        return false;
    }
    if actual.path != expected.path {
        return false;
    }

    if let Some(query) = expected.query.as_ref() {
        let all_equal = query.iter().all(|(name, values)| {
            let actual_values = actual.query.get(name).map(Vec::as_slice).unwrap_or_default();
            actual_values == values.as_slice()
        });
        if !all_equal {
            return false;
        }
    }

    if let Some(headers) = expected.headers.as_ref() {
        let all_equal = headers
            .iter()
            .all(|(name, value)| actual.headers.get(name) == Some(header_value_string(value).as_str()));
        if !all_equal {
            return false;
        }
    }

    true
}
