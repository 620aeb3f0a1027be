//! Cross-entity publish dependencies.

use crate::config::DependencyRule;
use crate::error::PublishResult;
use autosave_storage::{DraftRecord, DraftStore};
use autosave_types::ItemKey;
use std::collections::HashSet;

/// A pending draft that must join the batch but was not requested.
#[derive(Debug, Clone, PartialEq)]
pub struct RequiredAddition {
    pub rule: DependencyRule,
    /// The candidate that triggered the rule.
    pub required_by: ItemKey,
    /// The dependency's own pending draft.
    pub record: DraftRecord,
}

/// Applies a fixed set of co-publish rules to a candidate batch.
#[derive(Debug, Clone, Default)]
pub struct DependencyEnforcer {
    rules: Vec<DependencyRule>,
}

impl DependencyEnforcer {
    pub fn new(rules: Vec<DependencyRule>) -> Self {
        Self { rules }
    }

    /// Keys outside `candidates` that must be published with them.
    ///
    /// A rule fires when a candidate has the rule's trigger type and the
    /// dependency has a pending draft that is not itself a candidate.
    /// Dependencies without a draft have nothing to publish and never fire.
    pub fn required_additions(
        &self,
        candidates: &[ItemKey],
        store: &DraftStore,
    ) -> PublishResult<Vec<RequiredAddition>> {
        let present: HashSet<&ItemKey> = candidates.iter().collect();
        let mut additions: Vec<RequiredAddition> = Vec::new();

        for rule in &self.rules {
            if present.contains(&rule.dependency)
                || additions.iter().any(|a| a.record.key == rule.dependency)
            {
                continue;
            }
            let Some(trigger) = candidates
                .iter()
                .find(|k| k.entity_type() == rule.trigger_entity_type)
            else {
                continue;
            };
            if let Some(record) = store.get(&rule.dependency)? {
                additions.push(RequiredAddition {
                    rule: rule.clone(),
                    required_by: trigger.clone(),
                    record,
                });
            }
        }
        Ok(additions)
    }
}
