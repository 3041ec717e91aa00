//! Fluent definition of a single interaction.

use super::{ContractError, Interaction, ProviderState, Request, Response};
use serde_json::{Map, Value as JsonValue};

/// Accumulates one interaction's fields across chained calls.
///
/// ```
/// use pactum::domain::contract::{InteractionBuilder, Request, Response};
/// use serde_json::json;
///
/// let interaction = InteractionBuilder::new()
///     .given("user 1 exists")
///     .upon_receiving("a request for user 1")
///     .with_request(Request::new("GET", "/users/1"))
///     .will_respond_with(Response::new(200).with_body(json!({"id": 1})))
///     .build()
///     .unwrap();
/// assert_eq!(interaction.provider_states[0].name, "user 1 exists");
/// ```
#[derive(Debug, Default, Clone)]
pub struct InteractionBuilder {
    description: String,
    states: Vec<ProviderState>,
    request: Option<Request>,
    response: Option<Response>,
}

impl InteractionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn given(mut self, state: impl Into<String>) -> Self {
        self.states.push(ProviderState::new(state));
        self
    }

    pub fn given_with_params(mut self, state: impl Into<String>, params: Map<String, JsonValue>) -> Self {
        self.states.push(ProviderState::with_params(state, params));
        self
    }

    pub fn upon_receiving(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_request(mut self, request: Request) -> Self {
        self.request = Some(request);
        self
    }

    pub fn will_respond_with(mut self, response: Response) -> Self {
        self.response = Some(response);
        self
    }

    /// Finalizes the interaction, rejecting incomplete or malformed definitions.
    pub fn build(self) -> Result<Interaction, ContractError> {
        let request = self
            .request
            .ok_or_else(|| ContractError::invalid("request", "request is required"))?;
        let response = self
            .response
            .ok_or_else(|| ContractError::invalid("response", "response is required"))?;

        let interaction = Interaction {
            description: self.description,
            provider_state: None,
            provider_states: self.states,
            request: Request {
                method: request.normalized_method(),
                ..request
            },
            response,
            extra: Map::new(),
        };
        interaction.validate()?;
        Ok(interaction)
    }
}
