//! The same behavioural checks run against every `ContractStore`.

use pactum::domain::contract::Contract;
use pactum::domain::matrix::{REASON_DEPLOYABLE, REASON_FAILED, REASON_MISSING};
use pactum::storage::{
    ContractStore, FsObjectStore, MemoryContractStore, MemoryObjectStore, ObjectContractStore, StoreError,
};

fn contract(consumer: &str, provider: &str, version: &str) -> Contract {
    let mut c = Contract::new(consumer, provider);
    c.set_version(version);
    c
}

async fn latest_version_is_resolved(store: &dyn ContractStore) {
    for v in ["1.0.0", "2.0.0", "1.1.0"] {
        store.save_contract(&contract("OrderService", "UserService", v)).await.unwrap();
    }
    let latest = store.get_contract("OrderService", "UserService", "").await.unwrap();
    assert_eq!(latest.version(), "2.0.0");

    let pinned = store.get_contract("OrderService", "UserService", "1.1.0").await.unwrap();
    assert_eq!(pinned.version(), "1.1.0");

    let err = store.get_contract("OrderService", "UserService", "9.9.9").await.unwrap_err();
    assert!(err.is_not_found(), "{}", err);
    let err = store.get_contract("Nobody", "UserService", "").await.unwrap_err();
    assert!(err.is_not_found(), "{}", err);
}

async fn no_contracts_is_deployable(store: &dyn ContractStore) {
    let answer = store.is_deployable("FreshService", "0.1.0").await.unwrap();
    assert!(answer.deployable);
    assert_eq!(answer.reason, REASON_DEPLOYABLE);
}

async fn verification_outcomes_decide_deployability(store: &dyn ContractStore) {
    store.save_contract(&contract("Web", "UserService", "1.0.0")).await.unwrap();

    let missing = store.is_deployable("Web", "1.0.0").await.unwrap();
    assert!(!missing.deployable);
    assert_eq!(missing.reason, REASON_MISSING);

    store.record_verification("Web", "UserService", "1.0.0", false).await.unwrap();
    let failed = store.is_deployable("Web", "1.0.0").await.unwrap();
    assert!(!failed.deployable);
    assert_eq!(failed.reason, REASON_FAILED);

    store.record_verification("Web", "UserService", "1.0.0", true).await.unwrap();
    let passed = store.is_deployable("Web", "1.0.0").await.unwrap();
    assert!(passed.deployable);
    assert_eq!(passed.reason, REASON_DEPLOYABLE);

    // A second provider without a result blocks the same version again.
    store.save_contract(&contract("Web", "BillingService", "1.0.0")).await.unwrap();
    let partial = store.is_deployable("Web", "1.0.0").await.unwrap();
    assert!(!partial.deployable);
    assert_eq!(partial.reason, REASON_MISSING);

    // Other versions are judged on their own contracts only.
    assert!(store.is_deployable("Web", "2.0.0").await.unwrap().deployable);
}

async fn delete_forgets_the_verification(store: &dyn ContractStore) {
    store.save_contract(&contract("Mobile", "UserService", "3.0.0")).await.unwrap();
    store.record_verification("Mobile", "UserService", "3.0.0", true).await.unwrap();
    assert_eq!(store.verification("Mobile", "UserService", "3.0.0").await.unwrap(), Some(true));

    store.delete_contract("Mobile", "UserService", "3.0.0").await.unwrap();
    assert_eq!(store.verification("Mobile", "UserService", "3.0.0").await.unwrap(), None);
    assert!(store
        .get_contract("Mobile", "UserService", "3.0.0")
        .await
        .unwrap_err()
        .is_not_found());
    assert!(store.get_contract("Mobile", "UserService", "").await.unwrap_err().is_not_found());

    // Saving the same triple again starts without a result.
    store.save_contract(&contract("Mobile", "UserService", "3.0.0")).await.unwrap();
    let answer = store.is_deployable("Mobile", "3.0.0").await.unwrap();
    assert_eq!(answer.reason, REASON_MISSING);

    let err = store.delete_contract("Mobile", "UserService", "0.0.1").await.unwrap_err();
    assert!(err.is_not_found(), "{}", err);
}

async fn listings_return_the_latest_of_each_pair(store: &dyn ContractStore) {
    for (consumer, provider, version) in [
        ("A", "P1", "1.0.0"),
        ("A", "P1", "1.2.0"),
        ("A", "P2", "0.9.0"),
        ("B", "P1", "5.0.0"),
    ] {
        store.save_contract(&contract(consumer, provider, version)).await.unwrap();
    }

    let mut all: Vec<(String, String, String)> = store
        .list_contracts()
        .await
        .unwrap()
        .into_iter()
        .map(|c| (c.consumer.name.clone(), c.provider.name.clone(), c.version().to_string()))
        .collect();
    all.sort();
    assert_eq!(
        all,
        vec![
            ("A".to_string(), "P1".to_string(), "1.2.0".to_string()),
            ("A".to_string(), "P2".to_string(), "0.9.0".to_string()),
            ("B".to_string(), "P1".to_string(), "5.0.0".to_string()),
        ]
    );

    let mut by_provider: Vec<String> = store
        .contracts_by_provider("P1")
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.consumer.name)
        .collect();
    by_provider.sort();
    assert_eq!(by_provider, ["A", "B"]);

    let by_consumer = store.contracts_by_consumer("A").await.unwrap();
    assert_eq!(by_consumer.len(), 2);
    assert!(by_consumer.iter().all(|c| c.consumer.name == "A"));

    assert!(store.contracts_by_provider("Nobody").await.unwrap().is_empty());
}

async fn unversioned_contracts_are_rejected(store: &dyn ContractStore) {
    let err = store.save_contract(&Contract::new("A", "P")).await.unwrap_err();
    assert!(matches!(err, StoreError::MissingVersion { .. }), "{}", err);
}

/// Each check gets its own fresh store from `make`.
async fn conformance<S, F>(make: F)
where
    S: ContractStore,
    F: Fn() -> S,
{
    pactum::infra::telemetry::init_test_tracing();
    latest_version_is_resolved(&make()).await;
    no_contracts_is_deployable(&make()).await;
    verification_outcomes_decide_deployability(&make()).await;
    delete_forgets_the_verification(&make()).await;
    listings_return_the_latest_of_each_pair(&make()).await;
    unversioned_contracts_are_rejected(&make()).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn memory_store() {
    conformance(MemoryContractStore::new).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn object_store_in_memory() {
    conformance(|| ObjectContractStore::new(MemoryObjectStore::new())).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn object_store_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let counter = std::sync::atomic::AtomicUsize::new(0);
    conformance(|| {
        let n = counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        ObjectContractStore::new(FsObjectStore::new(dir.path().join(n.to_string())))
    })
    .await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn disk_store_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = ObjectContractStore::new(FsObjectStore::new(dir.path()));
        store.save_contract(&contract("Web", "UserService", "1.0.0")).await.unwrap();
        store.record_verification("Web", "UserService", "1.0.0", true).await.unwrap();
    }

    let reopened = ObjectContractStore::new(FsObjectStore::new(dir.path()));
    let latest = reopened.get_contract("Web", "UserService", "").await.unwrap();
    assert_eq!(latest.version(), "1.0.0");
    assert!(reopened.is_deployable("Web", "1.0.0").await.unwrap().deployable);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_saves_through_one_handle_keep_every_version() {
    let store = std::sync::Arc::new(ObjectContractStore::new(MemoryObjectStore::new()));
    let mut tasks = Vec::new();
    for i in 0..16 {
        let store = store.clone();
        tasks.push(tokio::spawn(async move {
            store
                .save_contract(&contract("Web", "UserService", &format!("1.0.{:02}", i)))
                .await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }
    let latest = store.get_contract("Web", "UserService", "").await.unwrap();
    assert_eq!(latest.version(), "1.0.15");
    for i in 0..16 {
        store
            .get_contract("Web", "UserService", &format!("1.0.{:02}", i))
            .await
            .unwrap();
    }
}
