//! Consumer-side test harness.

use super::{MockServer, MockServerError};
use crate::domain::contract::{io, Client, Contract, ContractError, Interaction, InteractionBuilder, PACT_SPECIFICATION_VERSION};
use std::future::Future;
use std::path::PathBuf;

/// Default directory contract files are written to.
pub const DEFAULT_PACT_DIR: &str = "./pacts";

#[derive(Debug, thiserror::Error)]
pub enum PactError {
    #[error(transparent)]
    Contract(#[from] ContractError),

    #[error(transparent)]
    MockServer(#[from] MockServerError),

    /// The consumer test itself failed; no contract was written.
    #[error("consumer test failed: {0}")]
    ConsumerTest(#[source] anyhow::Error),
}

/// Collects the interactions of one consumer/provider pair, serves them from
/// a [`MockServer`] while a consumer test runs, and writes the contract.
///
/// ```no_run
/// # async fn demo() -> Result<(), pactum::mock::PactError> {
/// use pactum::domain::contract::{InteractionBuilder, Request, Response};
/// use pactum::mock::PactBuilder;
///
/// let mut pact = PactBuilder::new("OrderService", "UserService");
/// pact.interaction(
///     InteractionBuilder::new()
///         .given("user 1 exists")
///         .upon_receiving("a request for user 1")
///         .with_request(Request::new("GET", "/users/1"))
///         .will_respond_with(Response::new(200)),
/// )?;
/// pact.run(|url| async move {
///     reqwest::get(format!("{}/users/1", url)).await?;
///     Ok::<_, reqwest::Error>(())
/// })
/// .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PactBuilder {
    consumer: String,
    provider: String,
    pact_dir: PathBuf,
    interactions: Vec<Interaction>,
}

impl PactBuilder {
    pub fn new(consumer: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            consumer: consumer.into(),
            provider: provider.into(),
            pact_dir: PathBuf::from(DEFAULT_PACT_DIR),
            interactions: Vec::new(),
        }
    }

    pub fn pact_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.pact_dir = dir.into();
        self
    }

    /// Finalizes and adds one interaction.
    pub fn interaction(&mut self, builder: InteractionBuilder) -> Result<&mut Self, ContractError> {
        self.interactions.push(builder.build()?);
        Ok(self)
    }

    pub fn interactions(&self) -> &[Interaction] {
        &self.interactions
    }

    /// The contract as it will be written, stamped with this crate's identity.
    pub fn build_contract(&self) -> Contract {
        let mut contract = Contract::new(self.consumer.as_str(), self.provider.as_str());
        contract.interactions = self.interactions.clone();
        contract.set_version(PACT_SPECIFICATION_VERSION);
        contract.metadata.client = Some(Client::current());
        contract
    }

    /// Serves every interaction on a fresh mock, runs `test` with its base
    /// URL, stops the mock and writes the contract into the pact directory.
    ///
    /// Returns the written file. A failing test writes nothing.
    pub async fn run<F, Fut, E>(&self, test: F) -> Result<PathBuf, PactError>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: Into<anyhow::Error>,
    {
        let mut server = MockServer::new();
        for interaction in &self.interactions {
            server.register(interaction.clone()).await;
        }
        server.start().await?;

        let outcome = test(server.base_url()?).await;
        server.stop().await?;
        outcome.map_err(|e| PactError::ConsumerTest(e.into()))?;

        let path = io::write_to_dir(&self.build_contract(), &self.pact_dir)?;
        tracing::info!(path = %path.display(), "contract written");
        Ok(path)
    }
}
