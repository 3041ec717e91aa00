//! Typed representation of a contract file (Pact v3 layout).
//!
//! Every document type keeps a flattened `extra` map so fields this crate does
//! not model survive a parse/write round-trip.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;

pub mod builder;
pub mod diff;
pub mod error;
pub mod io;
pub mod validator;

pub use builder::InteractionBuilder;
pub use diff::{diff_contracts, ContractDiff, FieldChange};
pub use error::ContractError;
pub use validator::ALLOWED_METHODS;

/// Pact specification version written by this crate.
pub const PACT_SPECIFICATION_VERSION: &str = "3.0.0";

/// A consumer/provider pair and the interactions the consumer relies on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub consumer: Pacticipant,
    pub provider: Pacticipant,
    #[serde(default)]
    pub interactions: Vec<Interaction>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl Contract {
    pub fn new(consumer: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            consumer: Pacticipant::new(consumer),
            provider: Pacticipant::new(provider),
            interactions: Vec::new(),
            messages: Vec::new(),
            metadata: Metadata::default(),
            extra: Map::new(),
        }
    }

    /// The version this contract is stored under.
    ///
    /// The broker overwrites `metadata.pactSpecification.version` with the
    /// published consumer version, so that field doubles as the storage version.
    pub fn version(&self) -> &str {
        &self.metadata.pact_specification.version
    }

    pub fn set_version(&mut self, version: impl Into<String>) {
        self.metadata.pact_specification.version = version.into();
    }
}

/// A named party in a contract.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pacticipant {
    pub name: String,
}

impl Pacticipant {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// One expected request/response exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub description: String,
    /// Legacy single precondition.
    #[serde(
        rename = "providerState",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub provider_state: Option<String>,
    #[serde(rename = "providerStates", default, skip_serializing_if = "Vec::is_empty")]
    pub provider_states: Vec<ProviderState>,
    #[serde(default)]
    pub request: Request,
    #[serde(default)]
    pub response: Response,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl Interaction {
    /// Names of every precondition, legacy field first.
    pub fn state_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        if let Some(state) = self.provider_state.as_deref().filter(|s| !s.is_empty()) {
            names.push(state);
        }
        names.extend(self.provider_states.iter().map(|s| s.name.as_str()));
        names
    }
}

/// A named precondition with optional parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderState {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Map<String, JsonValue>>,
}

impl ProviderState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: None,
        }
    }

    pub fn with_params(name: impl Into<String>, params: Map<String, JsonValue>) -> Self {
        Self {
            name: name.into(),
            params: Some(params),
        }
    }
}

/// Expected HTTP request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<BTreeMap<String, Vec<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Map<String, JsonValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<JsonValue>,
    #[serde(
        rename = "matchingRules",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub matching_rules: Option<MatchingRules>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generators: Option<JsonValue>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl Request {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.headers
            .get_or_insert_with(Map::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn with_query<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_body(mut self, body: impl Into<JsonValue>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Method in its canonical uppercase form.
    pub fn normalized_method(&self) -> String {
        self.method.to_ascii_uppercase()
    }
}

/// Expected HTTP response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Map<String, JsonValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<JsonValue>,
    #[serde(
        rename = "matchingRules",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub matching_rules: Option<MatchingRules>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generators: Option<JsonValue>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl Response {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.headers
            .get_or_insert_with(Map::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<JsonValue>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Matching rules per request/response section.
///
/// Parsed and written back but not applied: comparison is equality-only.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MatchingRules {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub body: BTreeMap<String, MatcherSet>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, MatcherSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<MatcherSet>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub query: BTreeMap<String, MatcherSet>,
}

impl MatchingRules {
    pub fn is_empty(&self) -> bool {
        self.body.is_empty() && self.headers.is_empty() && self.path.is_none() && self.query.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MatcherSet {
    #[serde(default)]
    pub matchers: Vec<MatcherRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combine: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatcherRule {
    #[serde(rename = "match")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
}

/// Contract file metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(rename = "pactSpecification", default)]
    pub pact_specification: PactSpecification,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<Client>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PactSpecification {
    #[serde(default)]
    pub version: String,
}

/// Tool that produced the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub name: String,
    pub version: String,
}

impl Client {
    /// Identity of this crate.
    pub fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Asynchronous message interaction. Carried through, never verified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub description: String,
    #[serde(rename = "providerStates", default, skip_serializing_if = "Vec::is_empty")]
    pub provider_states: Vec<ProviderState>,
    #[serde(default)]
    pub contents: JsonValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, JsonValue>>,
    #[serde(
        rename = "matchingRules",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub matching_rules: Option<MatchingRules>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generators: Option<JsonValue>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// Renders a header value from the contract the way it goes on the wire.
pub fn header_value_string(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}
