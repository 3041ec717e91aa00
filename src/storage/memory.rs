use crate::domain::contract::Contract;
use crate::domain::matrix::{assess_deployability, ContractKey, Deployability, VersionIndex};
use crate::storage::{ensure_versioned, ContractStore, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    contracts: HashMap<ContractKey, Contract>,
    index: VersionIndex,
    verifications: HashMap<ContractKey, bool>,
}

impl Tables {
    fn latest_where<F>(&self, keep: F) -> Vec<Contract>
    where
        F: Fn(&str, &str) -> bool,
    {
        self.index
            .latest_per_pair()
            .filter(|(consumer, provider, _)| keep(consumer, provider))
            .filter_map(|(consumer, provider, version)| {
                self.contracts
                    .get(&ContractKey::new(consumer, provider, version))
                    .cloned()
            })
            .collect()
    }
}

/// Process-local store. All three tables sit behind a single reader/writer
/// lock; cloning shares the tables.
#[derive(Clone, Default)]
pub struct MemoryContractStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryContractStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContractStore for MemoryContractStore {
    async fn save_contract(&self, contract: &Contract) -> Result<(), StoreError> {
        ensure_versioned(contract)?;
        let key = ContractKey::new(
            contract.consumer.name.as_str(),
            contract.provider.name.as_str(),
            contract.version(),
        );

        let mut tables = self.tables.write().await;
        tables
            .index
            .insert(&key.consumer, &key.provider, &key.version);
        tracing::debug!(contract = %key, "contract saved");
        tables.contracts.insert(key, contract.clone());
        Ok(())
    }

    async fn get_contract(&self, consumer: &str, provider: &str, version: &str) -> Result<Contract, StoreError> {
        let tables = self.tables.read().await;
        let version = if version.is_empty() {
            tables
                .index
                .latest(consumer, provider)
                .ok_or_else(|| StoreError::not_found(consumer, provider, ""))?
        } else {
            version
        };
        tables
            .contracts
            .get(&ContractKey::new(consumer, provider, version))
            .cloned()
            .ok_or_else(|| StoreError::not_found(consumer, provider, version))
    }

    async fn list_contracts(&self) -> Result<Vec<Contract>, StoreError> {
        Ok(self.tables.read().await.latest_where(|_, _| true))
    }

    async fn contracts_by_provider(&self, provider: &str) -> Result<Vec<Contract>, StoreError> {
        Ok(self.tables.read().await.latest_where(|_, p| p == provider))
    }

    async fn contracts_by_consumer(&self, consumer: &str) -> Result<Vec<Contract>, StoreError> {
        Ok(self.tables.read().await.latest_where(|c, _| c == consumer))
    }

    async fn delete_contract(&self, consumer: &str, provider: &str, version: &str) -> Result<(), StoreError> {
        let key = ContractKey::new(consumer, provider, version);
        let mut tables = self.tables.write().await;
        if tables.contracts.remove(&key).is_none() {
            return Err(StoreError::not_found(consumer, provider, version));
        }
        tables.index.remove(consumer, provider, version);
        tables.verifications.remove(&key);
        tracing::debug!(contract = %key, "contract deleted");
        Ok(())
    }

    async fn record_verification(
        &self,
        consumer: &str,
        provider: &str,
        version: &str,
        success: bool,
    ) -> Result<(), StoreError> {
        let key = ContractKey::new(consumer, provider, version);
        tracing::debug!(contract = %key, success, "verification recorded");
        self.tables.write().await.verifications.insert(key, success);
        Ok(())
    }

    async fn verification(&self, consumer: &str, provider: &str, version: &str) -> Result<Option<bool>, StoreError> {
        let key = ContractKey::new(consumer, provider, version);
        Ok(self.tables.read().await.verifications.get(&key).copied())
    }

    async fn is_deployable(&self, pacticipant: &str, version: &str) -> Result<Deployability, StoreError> {
        let tables = self.tables.read().await;
        let mut required: Vec<&ContractKey> = tables
            .contracts
            .iter()
            .filter(|(_, contract)| contract.consumer.name == pacticipant && contract.version() == version)
            .map(|(key, _)| key)
            .collect();
        required.sort();
        Ok(assess_deployability(
            required
                .into_iter()
                .map(|key| tables.verifications.get(key).copied()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract(consumer: &str, provider: &str, version: &str) -> Contract {
        let mut c = Contract::new(consumer, provider);
        c.set_version(version);
        c
    }

    #[tokio::test]
    async fn resaving_a_version_overwrites_without_duplicating() {
        let store = MemoryContractStore::new();
        store.save_contract(&contract("web", "api", "1.0.0")).await.unwrap();

        let mut changed = contract("web", "api", "1.0.0");
        changed.extra.insert("note".into(), "second".into());
        store.save_contract(&changed).await.unwrap();

        let tables = store.tables.read().await;
        assert_eq!(tables.index.versions("web", "api").len(), 1);
        drop(tables);
        let fetched = store.get_contract("web", "api", "1.0.0").await.unwrap();
        assert_eq!(fetched.extra["note"], "second");
    }

    #[tokio::test]
    async fn unversioned_contracts_are_rejected() {
        let store = MemoryContractStore::new();
        let err = store.save_contract(&Contract::new("web", "api")).await.unwrap_err();
        assert!(matches!(err, StoreError::MissingVersion { .. }));
    }
}
