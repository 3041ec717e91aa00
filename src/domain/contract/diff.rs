//! Differences between two revisions of a contract, keyed by interaction description.

use super::{Contract, Interaction};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldChange {
    pub field: String,
    pub old_value: String,
    pub new_value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractDiff {
    pub has_differences: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub metadata: Vec<FieldChange>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub added: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub removed: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub modified: Vec<String>,
}

pub fn diff_contracts(old: &Contract, new: &Contract) -> ContractDiff {
    let mut diff = ContractDiff::default();

    for (field, old_value, new_value) in [
        ("consumer", &old.consumer.name, &new.consumer.name),
        ("provider", &old.provider.name, &new.provider.name),
    ] {
        if old_value != new_value {
            diff.metadata.push(FieldChange {
                field: field.to_string(),
                old_value: old_value.clone(),
                new_value: new_value.clone(),
            });
        }
    }

    let old_by_desc = by_description(&old.interactions);
    let new_by_desc = by_description(&new.interactions);

    for interaction in &new.interactions {
        let desc = &interaction.description;
        match old_by_desc.get(desc.as_str()) {
            None => push_unique(&mut diff.added, desc),
            Some(previous) if *previous != interaction => push_unique(&mut diff.modified, desc),
            Some(_) => {}
        }
    }
    for interaction in &old.interactions {
        if !new_by_desc.contains_key(interaction.description.as_str()) {
            push_unique(&mut diff.removed, &interaction.description);
        }
    }

    diff.has_differences = !(diff.metadata.is_empty()
        && diff.added.is_empty()
        && diff.removed.is_empty()
        && diff.modified.is_empty());
    diff
}

// Later duplicates win, matching how a map keyed by description behaves.
fn by_description(interactions: &[Interaction]) -> HashMap<&str, &Interaction> {
    interactions
        .iter()
        .map(|i| (i.description.as_str(), i))
        .collect()
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::contract::{Request, Response};

    fn interaction(desc: &str, status: u16) -> Interaction {
        Interaction {
            description: desc.to_string(),
            provider_state: None,
            provider_states: Vec::new(),
            request: Request::new("GET", "/things"),
            response: Response::new(status),
            extra: Default::default(),
        }
    }

    #[test]
    fn identical_contracts_have_no_differences() {
        let mut c = Contract::new("web", "api");
        c.interactions.push(interaction("list things", 200));
        assert!(!diff_contracts(&c, &c.clone()).has_differences);
    }

    #[test]
    fn reports_added_removed_and_modified_interactions() {
        let mut old = Contract::new("web", "api");
        old.interactions.push(interaction("list things", 200));
        old.interactions.push(interaction("delete thing", 204));

        let mut new = Contract::new("web", "api-v2");
        new.interactions.push(interaction("list things", 206));
        new.interactions.push(interaction("create thing", 201));

        let diff = diff_contracts(&old, &new);
        assert!(diff.has_differences);
        assert_eq!(diff.metadata[0].field, "provider");
        assert_eq!(diff.added, vec!["create thing"]);
        assert_eq!(diff.removed, vec!["delete thing"]);
        assert_eq!(diff.modified, vec!["list things"]);
    }
}
