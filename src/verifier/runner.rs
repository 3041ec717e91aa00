use super::provider_states::ProviderStateCoordinator;
use super::result::{ActualResponse, InteractionResult, Phase, VerificationResult};
use crate::domain::compare::{compare_headers, compare_status, HeaderSet};
use crate::domain::contract::{header_value_string, Contract, Interaction};
use crate::domain::matching::MatcherRegistry;
use serde_json::Value as JsonValue;
use std::time::Duration;

/// Applied to provider and provider-state calls when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum VerifierError {
    #[error("invalid provider base URL {url:?}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct VerifierConfig {
    pub provider_base_url: String,
    pub provider_states_setup_url: Option<String>,
    /// Bound on every HTTP call the verifier makes.
    pub timeout: Duration,
}

impl VerifierConfig {
    pub fn new(provider_base_url: impl Into<String>) -> Self {
        Self {
            provider_base_url: provider_base_url.into(),
            provider_states_setup_url: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_provider_states_setup_url(mut self, url: impl Into<String>) -> Self {
        self.provider_states_setup_url = Some(url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Replays each interaction of a contract against a live provider.
pub struct Verifier {
    base_url: String,
    client: reqwest::Client,
    states: ProviderStateCoordinator,
    matchers: MatcherRegistry,
}

impl Verifier {
    pub fn new(config: VerifierConfig) -> Result<Self, VerifierError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Self::with_client(config, client)
    }

    /// Uses a caller-built client; its timeout is the caller's business.
    pub fn with_client(config: VerifierConfig, client: reqwest::Client) -> Result<Self, VerifierError> {
        url::Url::parse(&config.provider_base_url).map_err(|source| VerifierError::InvalidBaseUrl {
            url: config.provider_base_url.clone(),
            source,
        })?;

        Ok(Self {
            base_url: config.provider_base_url.trim_end_matches('/').to_string(),
            states: ProviderStateCoordinator::new(config.provider_states_setup_url, client.clone()),
            client,
            matchers: MatcherRegistry::new(),
        })
    }

    /// Registering a matcher under an existing name replaces it.
    pub fn matchers_mut(&mut self) -> &mut MatcherRegistry {
        &mut self.matchers
    }

    /// Verifies interactions sequentially in declared order. A failing
    /// interaction never stops the ones after it.
    pub async fn verify(&self, contract: &Contract) -> VerificationResult {
        tracing::info!(
            consumer = %contract.consumer.name,
            provider = %contract.provider.name,
            interactions = contract.interactions.len(),
            state_setup = self.states.is_configured(),
            "verifying contract"
        );

        let mut interactions = Vec::with_capacity(contract.interactions.len());
        for interaction in &contract.interactions {
            let result = self.verify_interaction(interaction).await;
            if result.success {
                tracing::info!(description = %result.description, "interaction passed");
            } else {
                tracing::warn!(
                    description = %result.description,
                    failed_phase = ?result.failed_phase,
                    diff = result.diff.as_deref().unwrap_or_default(),
                    error = result.error.as_deref().unwrap_or_default(),
                    "interaction failed"
                );
            }
            interactions.push(result);
        }

        VerificationResult {
            consumer: contract.consumer.name.clone(),
            provider: contract.provider.name.clone(),
            success: interactions.iter().all(|i| i.success),
            interactions,
            verified_at: chrono::Utc::now(),
        }
    }

    pub async fn verify_interaction(&self, interaction: &Interaction) -> InteractionResult {
        let mut result = InteractionResult::pending(
            &interaction.description,
            interaction.state_names().into_iter().map(String::from).collect(),
            interaction.request.clone(),
            interaction.response.clone(),
        );

        result.advance(Phase::StateSetup);
        if let Err(e) = self.setup_states(interaction).await {
            return result.fail_with_error(format!("failed to setup provider state(s): {}", e));
        }

        result.advance(Phase::RequestSent);
        let response = match self.send(interaction).await {
            Ok(response) => response,
            Err(error) => return result.fail_with_error(error),
        };

        let status = response.status().as_u16();
        let headers = HeaderSet::from_header_map(response.headers());
        let raw_body = match response.text().await {
            Ok(text) => text,
            Err(e) => return result.fail_with_error(format!("failed to read response body: {}", e)),
        };
        let expected_body = interaction.response.body.as_ref().filter(|b| !b.is_null());
        let body = match decode_body(&raw_body, expected_body) {
            Ok(body) => body,
            Err(error) => {
                result.actual = Some(ActualResponse {
                    status,
                    headers,
                    body: None,
                    raw_body,
                });
                return result.fail_with_error(error);
            }
        };

        result.advance(Phase::ResponseCompared);
        let mut diffs = Vec::new();
        diffs.extend(compare_status(interaction.response.status, status));
        diffs.extend(compare_headers(interaction.response.headers.as_ref(), &headers));
        if expected_body.is_some() {
            let rules = interaction
                .response
                .matching_rules
                .as_ref()
                .map(|rules| &rules.body);
            diffs.extend(
                self.matchers
                    .compare_body(expected_body, body.as_ref(), rules)
                    .diffs,
            );
        }

        result.actual = Some(ActualResponse {
            status,
            headers,
            body,
            raw_body,
        });
        result.finish(diffs)
    }

    async fn setup_states(&self, interaction: &Interaction) -> Result<(), super::ProviderStateError> {
        if let Some(state) = interaction.provider_state.as_deref().filter(|s| !s.is_empty()) {
            self.states.setup(state, None).await?;
        }
        self.states
            .setup_multiple(&interaction.provider_states)
            .await
    }

    /// Builds the real request from the expected one and sends it.
    async fn send(&self, interaction: &Interaction) -> Result<reqwest::Response, String> {
        let expected = &interaction.request;
        let method = reqwest::Method::from_bytes(expected.normalized_method().as_bytes())
            .map_err(|e| format!("invalid request method {:?}: {}", expected.method, e))?;

        let mut request = self
            .client
            .request(method, format!("{}{}", self.base_url, expected.path));

        if let Some(query) = expected.query.as_ref() {
            let pairs: Vec<(&str, &str)> = query
                .iter()
                .flat_map(|(name, values)| values.iter().map(move |v| (name.as_str(), v.as_str())))
                .collect();
            request = request.query(&pairs);
        }

        for (name, value) in expected.headers.iter().flatten() {
            request = request.header(name.as_str(), header_value_string(value));
        }

        match expected.body.as_ref() {
            None | Some(JsonValue::Null) => {}
            Some(JsonValue::String(text)) => request = request.body(text.clone()),
            Some(other) => request = request.json(other),
        }

        request.send().await.map_err(|e| {
            if e.is_builder() {
                format!("failed to build request: {}", e)
            } else {
                format!("connection error: {}", e)
            }
        })
    }
}

/// Decodes a provider response body for comparison.
///
/// Bodies that are not JSON are compared as text when a string was
/// expected. Any other non-empty body that fails to decode is an error,
/// even when the interaction expects no body.
fn decode_body(raw: &str, expected: Option<&JsonValue>) -> Result<Option<JsonValue>, String> {
    if let Some(JsonValue::String(_)) = expected {
        return Ok(Some(match serde_json::from_str::<JsonValue>(raw) {
            Ok(JsonValue::String(s)) => JsonValue::String(s),
            _ => JsonValue::String(raw.to_string()),
        }));
    }
    if raw.trim().is_empty() {
        return Ok(None);
    }
    match serde_json::from_str(raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => Err(format!("failed to parse response body: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_bodies_compare_as_strings() {
        let expected = json!("OK");
        assert_eq!(decode_body("OK", Some(&expected)), Ok(Some(json!("OK"))));
        assert_eq!(decode_body("\"OK\"", Some(&expected)), Ok(Some(json!("OK"))));
        assert_eq!(decode_body("true", Some(&expected)), Ok(Some(json!("true"))));
    }

    #[test]
    fn undecodable_bodies_fail_unless_text_was_expected() {
        for expected in [None, Some(json!({"id": 1}))] {
            assert!(decode_body("{not json", expected.as_ref())
                .unwrap_err()
                .starts_with("failed to parse response body"));
        }
        assert_eq!(decode_body("", Some(&json!({"id": 1}))), Ok(None));
        assert_eq!(decode_body("  ", None), Ok(None));
        assert_eq!(decode_body("<html>", Some(&json!("<html>"))), Ok(Some(json!("<html>"))));
    }

    #[test]
    fn invalid_base_urls_are_rejected() {
        let err = Verifier::new(VerifierConfig::new("not a url")).err().unwrap();
        assert!(matches!(err, VerifierError::InvalidBaseUrl { .. }));
    }
}
