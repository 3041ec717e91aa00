//! Version bookkeeping and the deployability rule shared by every store.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const REASON_DEPLOYABLE: &str = "All required verification results are published and successful";
pub const REASON_MISSING: &str = "No verification results found";
pub const REASON_FAILED: &str = "Verification failed";

/// Identity of a stored contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContractKey {
    pub consumer: String,
    pub provider: String,
    pub version: String,
}

impl ContractKey {
    pub fn new(consumer: impl Into<String>, provider: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            consumer: consumer.into(),
            provider: provider.into(),
            version: version.into(),
        }
    }

    pub fn pair_key(&self) -> String {
        pair_key(&self.consumer, &self.provider)
    }
}

impl fmt::Display for ContractKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}", self.consumer, self.provider, self.version)
    }
}

/// `consumer|provider`.
pub fn pair_key(consumer: &str, provider: &str) -> String {
    format!("{}|{}", consumer, provider)
}

/// Splits a pair key back into `(consumer, provider)`.
pub fn split_pair_key(key: &str) -> Option<(&str, &str)> {
    key.split_once('|')
}

/// Pair key to version list, each list kept lexicographically sorted.
///
/// Ordering is plain string ordering, not semver: `"10.0.0"` sorts before
/// `"2.0.0"`, so "latest" is whatever sorts last.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionIndex(BTreeMap<String, Vec<String>>);

impl VersionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a version; returns `false` if it was already known.
    pub fn insert(&mut self, consumer: &str, provider: &str, version: &str) -> bool {
        let versions = self.0.entry(pair_key(consumer, provider)).or_default();
        if versions.iter().any(|v| v == version) {
            return false;
        }
        versions.push(version.to_string());
        versions.sort();
        true
    }

    /// Forgets a version; the pair entry stays even when emptied.
    pub fn remove(&mut self, consumer: &str, provider: &str, version: &str) {
        if let Some(versions) = self.0.get_mut(&pair_key(consumer, provider)) {
            versions.retain(|v| v != version);
        }
    }

    pub fn latest(&self, consumer: &str, provider: &str) -> Option<&str> {
        self.0
            .get(&pair_key(consumer, provider))
            .and_then(|versions| versions.last())
            .map(String::as_str)
    }

    pub fn contains(&self, consumer: &str, provider: &str, version: &str) -> bool {
        self.0
            .get(&pair_key(consumer, provider))
            .is_some_and(|versions| versions.iter().any(|v| v == version))
    }

    pub fn versions(&self, consumer: &str, provider: &str) -> &[String] {
        self.0
            .get(&pair_key(consumer, provider))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// `(consumer, provider, latest)` for every pair that still has a version.
    pub fn latest_per_pair(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.0.iter().filter_map(|(key, versions)| {
            let (consumer, provider) = split_pair_key(key)?;
            let latest = versions.last()?;
            Some((consumer, provider, latest.as_str()))
        })
    }

    /// Every stored `(consumer, provider, version)` triple.
    pub fn keys(&self) -> impl Iterator<Item = ContractKey> + '_ {
        self.0.iter().flat_map(|(key, versions)| {
            let (consumer, provider) = split_pair_key(key).unwrap_or((key.as_str(), ""));
            versions
                .iter()
                .map(move |v| ContractKey::new(consumer, provider, v.as_str()))
        })
    }
}

/// Answer to "can this version be deployed".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployability {
    pub deployable: bool,
    pub reason: String,
}

impl Deployability {
    fn yes() -> Self {
        Self {
            deployable: true,
            reason: REASON_DEPLOYABLE.to_string(),
        }
    }

    fn no(reason: &str) -> Self {
        Self {
            deployable: false,
            reason: reason.to_string(),
        }
    }
}

/// Folds the verification records of every qualifying contract.
///
/// `None` means no record was published for that contract. No qualifying
/// contracts at all is deployable.
pub fn assess_deployability<I>(records: I) -> Deployability
where
    I: IntoIterator<Item = Option<bool>>,
{
    for record in records {
        match record {
            None => return Deployability::no(REASON_MISSING),
            Some(false) => return Deployability::no(REASON_FAILED),
            Some(true) => {}
        }
    }
    Deployability::yes()
}
