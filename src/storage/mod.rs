//! Contract persistence and the compatibility matrix.
//!
//! [`ContractStore`] is what the broker talks to. Two implementations:
//! [`MemoryContractStore`] keeps everything behind one lock, and
//! [`ObjectContractStore`] layers the same rules over any [`ObjectStore`].

use crate::domain::contract::Contract;
use crate::domain::matrix::Deployability;
use async_trait::async_trait;

pub mod error;
pub mod memory;
pub mod object;

pub use error::StoreError;
pub use memory::MemoryContractStore;
pub use object::{FsObjectStore, MemoryObjectStore, ObjectContractStore, ObjectStore};

/// Versioned contract storage keyed by `(consumer, provider, version)`.
///
/// The version of a contract is `metadata.pactSpecification.version`.
/// Implementations must be `Send + Sync + 'static` to live in axum state.
#[async_trait]
pub trait ContractStore: Send + Sync + 'static {
    /// Inserts or overwrites the contract at its triple.
    async fn save_contract(&self, contract: &Contract) -> Result<(), StoreError>;

    /// Fetches one version; an empty `version` resolves to the latest.
    async fn get_contract(&self, consumer: &str, provider: &str, version: &str) -> Result<Contract, StoreError>;

    /// Latest contract of every pair.
    async fn list_contracts(&self) -> Result<Vec<Contract>, StoreError>;

    /// Latest contract of every pair with this provider.
    async fn contracts_by_provider(&self, provider: &str) -> Result<Vec<Contract>, StoreError>;

    /// Latest contract of every pair with this consumer.
    async fn contracts_by_consumer(&self, consumer: &str) -> Result<Vec<Contract>, StoreError>;

    /// Removes one version and its verification record.
    async fn delete_contract(&self, consumer: &str, provider: &str, version: &str) -> Result<(), StoreError>;

    async fn record_verification(
        &self,
        consumer: &str,
        provider: &str,
        version: &str,
        success: bool,
    ) -> Result<(), StoreError>;

    /// `None` when nothing was recorded for the triple.
    async fn verification(&self, consumer: &str, provider: &str, version: &str) -> Result<Option<bool>, StoreError>;

    /// Whether `version` of `pacticipant`, acting as consumer, has a
    /// successful verification for every contract it published.
    async fn is_deployable(&self, pacticipant: &str, version: &str) -> Result<Deployability, StoreError>;
}

pub(crate) fn ensure_versioned(contract: &Contract) -> Result<(), StoreError> {
    if contract.version().is_empty() {
        return Err(StoreError::MissingVersion {
            consumer: contract.consumer.name.clone(),
            provider: contract.provider.name.clone(),
        });
    }
    Ok(())
}
