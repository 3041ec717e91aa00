use crate::domain::contract::ProviderState;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

#[derive(Debug, thiserror::Error)]
pub enum ProviderStateError {
    #[error("failed to call provider states setup for {state:?}: {source}")]
    Transport {
        state: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("provider states setup failed for {state:?} with status {status}")]
    Rejected { state: String, status: u16 },
}

#[derive(Serialize)]
struct SetupRequest<'a> {
    state: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<&'a Map<String, JsonValue>>,
}

/// Asks the provider to establish named preconditions before an interaction
/// is replayed.
///
/// Without a setup URL every call succeeds without doing anything.
#[derive(Debug, Clone)]
pub struct ProviderStateCoordinator {
    setup_url: Option<String>,
    client: reqwest::Client,
}

impl ProviderStateCoordinator {
    /// An empty URL counts as unconfigured.
    pub fn new(setup_url: Option<String>, client: reqwest::Client) -> Self {
        Self {
            setup_url: setup_url.filter(|url| !url.is_empty()),
            client,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.setup_url.is_some()
    }

    /// POSTs `{state, params?}` to the setup URL; any status >= 400 fails.
    pub async fn setup(&self, state: &str, params: Option<&Map<String, JsonValue>>) -> Result<(), ProviderStateError> {
        let Some(url) = self.setup_url.as_deref() else {
            return Ok(());
        };

        tracing::debug!(state, "setting up provider state");
        let response = self
            .client
            .post(url)
            .json(&SetupRequest { state, params })
            .send()
            .await
            .map_err(|source| ProviderStateError::Transport {
                state: state.to_string(),
                source,
            })?;

        let status = response.status().as_u16();
        if status >= 400 {
            return Err(ProviderStateError::Rejected {
                state: state.to_string(),
                status,
            });
        }
        Ok(())
    }

    /// Applies states in order and stops at the first failure.
    pub async fn setup_multiple(&self, states: &[ProviderState]) -> Result<(), ProviderStateError> {
        for state in states {
            self.setup(&state.name, state.params.as_ref()).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_setup_is_a_no_op() {
        for url in [None, Some(String::new())] {
            let states = ProviderStateCoordinator::new(url, reqwest::Client::new());
            assert!(!states.is_configured());
            states.setup("anything", None).await.unwrap();
            states
                .setup_multiple(&[ProviderState::new("a"), ProviderState::new("b")])
                .await
                .unwrap();
        }

        let configured = ProviderStateCoordinator::new(
            Some("http://127.0.0.1:9/states".to_string()),
            reqwest::Client::new(),
        );
        assert!(configured.is_configured());
    }
}
