use super::ObjectStore;
use crate::domain::contract::Contract;
use crate::domain::matrix::{assess_deployability, ContractKey, Deployability, VersionIndex};
use crate::storage::{ensure_versioned, ContractStore, StoreError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::{Mutex, RwLock};

const INDEX_KEY: &str = "index.json";

/// Secondary index kept next to the contract objects.
#[derive(Debug, Default, Serialize, Deserialize)]
struct IndexDocument {
    #[serde(default)]
    versions: VersionIndex,
    /// `consumer|provider|version` to outcome.
    #[serde(default)]
    verifications: BTreeMap<String, bool>,
}

/// Contract store over any [`ObjectStore`].
///
/// Contracts live at `<prefix>contracts/<consumer>/<provider>/<version>.json`
/// and the version/verification index at `<prefix>index.json`. Every write
/// reloads the index, changes it and puts it back. Writers in this process
/// are serialized; separate processes sharing a backend race on the index
/// and the last writer wins.
pub struct ObjectContractStore<S> {
    objects: S,
    prefix: String,
    write_lock: Mutex<()>,
    cache: RwLock<HashMap<ContractKey, Contract>>,
}

impl<S: ObjectStore> ObjectContractStore<S> {
    pub fn new(objects: S) -> Self {
        Self::with_prefix(objects, "")
    }

    /// `prefix` is prepended verbatim to every key, e.g. `"broker/"`.
    pub fn with_prefix(objects: S, prefix: impl Into<String>) -> Self {
        Self {
            objects,
            prefix: prefix.into(),
            write_lock: Mutex::new(()),
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn contract_object_key(&self, key: &ContractKey) -> String {
        format!(
            "{}contracts/{}/{}/{}.json",
            self.prefix, key.consumer, key.provider, key.version
        )
    }

    fn index_object_key(&self) -> String {
        format!("{}{}", self.prefix, INDEX_KEY)
    }

    async fn load_index(&self) -> Result<IndexDocument, StoreError> {
        match self.objects.get(&self.index_object_key()).await {
            Ok(data) => Ok(serde_json::from_slice(&data)?),
            Err(StoreError::ObjectNotFound(_)) => Ok(IndexDocument::default()),
            Err(e) => Err(e),
        }
    }

    async fn save_index(&self, index: &IndexDocument) -> Result<(), StoreError> {
        let data = serde_json::to_vec(index)?;
        self.objects.put(&self.index_object_key(), data).await
    }

    async fn load_contract(&self, key: &ContractKey) -> Result<Contract, StoreError> {
        if let Some(hit) = self.cache.read().await.get(key) {
            return Ok(hit.clone());
        }

        let data = match self.objects.get(&self.contract_object_key(key)).await {
            Ok(data) => data,
            Err(StoreError::ObjectNotFound(_)) => {
                return Err(StoreError::not_found(&key.consumer, &key.provider, &key.version))
            }
            Err(e) => return Err(e),
        };
        let contract: Contract = serde_json::from_slice(&data)?;
        self.cache.write().await.insert(key.clone(), contract.clone());
        Ok(contract)
    }

    async fn latest_where<F>(&self, keep: F) -> Result<Vec<Contract>, StoreError>
    where
        F: Fn(&str, &str) -> bool + Send,
    {
        let index = self.load_index().await?;
        let keys: Vec<ContractKey> = index
            .versions
            .latest_per_pair()
            .filter(|(consumer, provider, _)| keep(consumer, provider))
            .map(|(consumer, provider, version)| ContractKey::new(consumer, provider, version))
            .collect();

        let mut contracts = Vec::with_capacity(keys.len());
        for key in &keys {
            match self.load_contract(key).await {
                Ok(contract) => contracts.push(contract),
                Err(StoreError::NotFound { .. }) => {
                    tracing::warn!(contract = %key, "index entry without contract object");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(contracts)
    }
}

#[async_trait]
impl<S: ObjectStore> ContractStore for ObjectContractStore<S> {
    async fn save_contract(&self, contract: &Contract) -> Result<(), StoreError> {
        ensure_versioned(contract)?;
        let key = ContractKey::new(
            contract.consumer.name.as_str(),
            contract.provider.name.as_str(),
            contract.version(),
        );
        let data = serde_json::to_vec(contract)?;

        let _guard = self.write_lock.lock().await;
        self.objects.put(&self.contract_object_key(&key), data).await?;

        let mut index = self.load_index().await?;
        if index.versions.insert(&key.consumer, &key.provider, &key.version) {
            self.save_index(&index).await?;
        }

        tracing::debug!(contract = %key, "contract saved");
        self.cache.write().await.insert(key, contract.clone());
        Ok(())
    }

    async fn get_contract(&self, consumer: &str, provider: &str, version: &str) -> Result<Contract, StoreError> {
        let version = if version.is_empty() {
            let index = self.load_index().await?;
            index
                .versions
                .latest(consumer, provider)
                .map(str::to_string)
                .ok_or_else(|| StoreError::not_found(consumer, provider, ""))?
        } else {
            version.to_string()
        };
        self.load_contract(&ContractKey::new(consumer, provider, version))
            .await
    }

    async fn list_contracts(&self) -> Result<Vec<Contract>, StoreError> {
        self.latest_where(|_, _| true).await
    }

    async fn contracts_by_provider(&self, provider: &str) -> Result<Vec<Contract>, StoreError> {
        self.latest_where(|_, p| p == provider).await
    }

    async fn contracts_by_consumer(&self, consumer: &str) -> Result<Vec<Contract>, StoreError> {
        self.latest_where(|c, _| c == consumer).await
    }

    async fn delete_contract(&self, consumer: &str, provider: &str, version: &str) -> Result<(), StoreError> {
        let key = ContractKey::new(consumer, provider, version);
        let object_key = self.contract_object_key(&key);

        let _guard = self.write_lock.lock().await;
        match self.objects.get(&object_key).await {
            Ok(_) => {}
            Err(StoreError::ObjectNotFound(_)) => return Err(StoreError::not_found(consumer, provider, version)),
            Err(e) => return Err(e),
        }
        self.objects.delete(&object_key).await?;

        let mut index = self.load_index().await?;
        index.versions.remove(consumer, provider, version);
        index.verifications.remove(&key.to_string());
        self.save_index(&index).await?;

        tracing::debug!(contract = %key, "contract deleted");
        self.cache.write().await.remove(&key);
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

        let _guard = self.write_lock.lock().await;
        let mut index = self.load_index().await?;
        index.verifications.insert(key.to_string(), success);
        self.save_index(&index).await?;

        tracing::debug!(contract = %key, success, "verification recorded");
        Ok(())
    }

    async fn verification(&self, consumer: &str, provider: &str, version: &str) -> Result<Option<bool>, StoreError> {
        let key = ContractKey::new(consumer, provider, version);
        Ok(self
            .load_index()
            .await?
            .verifications
            .get(&key.to_string())
            .copied())
    }

    async fn is_deployable(&self, pacticipant: &str, version: &str) -> Result<Deployability, StoreError> {
        let index = self.load_index().await?;
        let mut records = Vec::new();
        for key in index.versions.keys() {
            if key.consumer != pacticipant || key.version != version {
                continue;
            }
            // The index is authoritative for existence; the object decides the version.
            let contract = match self.load_contract(&key).await {
                Ok(contract) => contract,
                Err(StoreError::NotFound { .. }) => continue,
                Err(e) => return Err(e),
            };
            if contract.version() == version {
                records.push(index.verifications.get(&key.to_string()).copied());
            }
        }
        Ok(assess_deployability(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::object::MemoryObjectStore;

    fn contract(version: &str) -> Contract {
        let mut c = Contract::new("web", "api");
        c.set_version(version);
        c
    }

    #[tokio::test]
    async fn objects_and_index_use_the_prefix() {
        let objects = MemoryObjectStore::new();
        let store = ObjectContractStore::with_prefix(objects.clone(), "broker/");
        store.save_contract(&contract("1.0.0")).await.unwrap();

        assert_eq!(
            objects.list("").await.unwrap(),
            vec!["broker/contracts/web/api/1.0.0.json", "broker/index.json"]
        );
    }

    #[tokio::test]
    async fn a_fresh_store_reads_what_another_wrote() {
        let objects = MemoryObjectStore::new();
        let writer = ObjectContractStore::new(objects.clone());
        writer.save_contract(&contract("1.0.0")).await.unwrap();
        writer.save_contract(&contract("2.0.0")).await.unwrap();
        writer.record_verification("web", "api", "2.0.0", true).await.unwrap();

        let reader = ObjectContractStore::new(objects);
        assert_eq!(reader.get_contract("web", "api", "").await.unwrap().version(), "2.0.0");
        assert_eq!(reader.verification("web", "api", "2.0.0").await.unwrap(), Some(true));
    }

    #[tokio::test]
    async fn index_document_lists_pairs() {
        let objects = MemoryObjectStore::new();
        let store = ObjectContractStore::new(objects.clone());
        store.save_contract(&contract("1.0.0")).await.unwrap();

        let raw = objects.get(INDEX_KEY).await.unwrap();
        let index: IndexDocument = serde_json::from_slice(&raw).unwrap();
        let pairs: Vec<_> = index.versions.latest_per_pair().collect();
        assert_eq!(pairs, vec![("web", "api", "1.0.0")]);
    }
}
