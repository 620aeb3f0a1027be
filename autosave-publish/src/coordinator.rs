//! Publish coordinator: applies a batch of drafts to their live entities.
//!
//! A publish runs as a fixed sequence of phases:
//!
//! 1. **Resolve**: conflict detection against the draft store
//! 2. **Augment**: mandatory co-dependencies must already be in the batch
//! 3. **Load**: every resolved draft must still have a live entity
//! 4. **Authorize**: field-level update checks for every item
//! 5. **Validate**: content validation of every materialized draft
//! 6. **Apply**: write all entities, then drop their drafts
//!
//! Phases 1–5 only read. Each returns `Err(issues)` with every problem it
//! found, and the batch stops there with nothing written.

use crate::config::PublishConfig;
use crate::conflict;
use crate::dependency::DependencyEnforcer;
use crate::error::{PublishError, PublishResult};
use crate::policy::{AccessChecker, AccessDecision, AllowAllAccess};
use crate::request::{FailurePhase, IssueKind, ItemIssue, PublishFailure, PublishOutcome, PublishRequest};
use autosave_model::{changed_fields, Entity, EntityRepository, EntityValidator, NoopValidator};
use autosave_storage::{DraftRecord, DraftStore};
use autosave_types::{ItemKey, Principal};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

const GONE_DETAIL: &str = "The item this draft belongs to no longer exists.";

/// A resolved draft alongside the live entity it will replace.
struct Staged {
    record: DraftRecord,
    live: Entity,
    /// Transient copy of `live` carrying the draft snapshot.
    draft: Entity,
}

type Phase<T> = PublishResult<Result<T, Vec<ItemIssue>>>;

/// Orchestrates publishing drafts onto live entities.
pub struct Publisher {
    drafts: DraftStore,
    repo: Arc<dyn EntityRepository>,
    access: Arc<dyn AccessChecker>,
    validator: Arc<dyn EntityValidator>,
    enforcer: DependencyEnforcer,
    config: PublishConfig,
}

impl Publisher {
    /// Creates a publisher that allows every actor and accepts all content.
    pub fn new(drafts: DraftStore, repo: Arc<dyn EntityRepository>, config: PublishConfig) -> Self {
        Self {
            drafts,
            repo,
            access: Arc::new(AllowAllAccess),
            validator: Arc::new(NoopValidator),
            enforcer: DependencyEnforcer::new(config.dependency_rules.clone()),
            config,
        }
    }

    #[must_use]
    pub fn with_access(mut self, access: Arc<dyn AccessChecker>) -> Self {
        self.access = access;
        self
    }

    #[must_use]
    pub fn with_validator(mut self, validator: Arc<dyn EntityValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn drafts(&self) -> &DraftStore {
        &self.drafts
    }

    pub fn repository(&self) -> &dyn EntityRepository {
        self.repo.as_ref()
    }

    pub fn access(&self) -> &dyn AccessChecker {
        self.access.as_ref()
    }

    pub fn config(&self) -> &PublishConfig {
        &self.config
    }

    /// Publishes the drafts named by `request` on behalf of `actor`.
    ///
    /// Returns `Ok(Failure)` when the batch is rejected; nothing has been
    /// written in that case. `Err` is reserved for storage failures. An
    /// [`PublishError::Apply`] means a live write failed mid-batch: earlier
    /// writes were restored from their pre-publish copies where possible and
    /// no draft was dropped.
    pub fn publish(&self, request: &PublishRequest, actor: &Principal) -> PublishResult<PublishOutcome> {
        let batch = Uuid::now_v7();
        let span = info_span!("publish", %batch, actor = %actor.id);
        let _enter = span.enter();

        let records = match conflict::detect(request, &self.drafts)? {
            Ok(records) => records,
            Err(issues) => return Ok(reject(FailurePhase::Conflict, issues)),
        };
        if records.is_empty() {
            info!("nothing to publish");
            return Ok(PublishOutcome::Success(0));
        }
        debug!("resolved {} drafts", records.len());

        if let Err(issues) = self.augment(&records)? {
            return Ok(reject(FailurePhase::MissingDependency, issues));
        }
        let staged = match self.load(records)? {
            Ok(staged) => staged,
            Err(issues) => return Ok(reject(FailurePhase::Conflict, issues)),
        };
        if let Err(issues) = self.authorize(&staged, actor) {
            return Ok(reject(FailurePhase::Unauthorized, issues));
        }
        if let Err(issues) = self.validate(&staged) {
            return Ok(reject(FailurePhase::Validation, issues));
        }

        let count = self.apply(staged)?;
        info!("published {} items", count);
        Ok(PublishOutcome::Success(count))
    }

    // ── Read-only phases ─────────────────────────────────────────

    fn augment(&self, records: &[DraftRecord]) -> Phase<()> {
        let keys: Vec<ItemKey> = records.iter().map(|r| r.key.clone()).collect();
        let additions = self.enforcer.required_additions(&keys, &self.drafts)?;
        if additions.is_empty() {
            return Ok(Ok(()));
        }

        let issues = additions
            .into_iter()
            .map(|a| {
                let detail = format!(
                    "{} has unpublished changes that {} depends on. Publish them together.",
                    a.record.label, a.required_by
                );
                ItemIssue::new(&a.record.key, IssueKind::MissingDependency, detail, Some(a.record.label))
                    .with_code(a.rule.code)
            })
            .collect();
        Ok(Err(issues))
    }

    fn load(&self, records: Vec<DraftRecord>) -> Phase<Vec<Staged>> {
        let mut staged = Vec::with_capacity(records.len());
        let mut issues = Vec::new();
        for record in records {
            match self.repo.load(&record.key)? {
                Some(live) => staged.push(Staged {
                    draft: live.with_snapshot(&record.snapshot),
                    live,
                    record,
                }),
                None => issues.push(ItemIssue::new(
                    &record.key,
                    IssueKind::Missing,
                    GONE_DETAIL,
                    Some(record.label),
                )),
            }
        }
        Ok(if issues.is_empty() { Ok(staged) } else { Err(issues) })
    }

    fn authorize(&self, staged: &[Staged], actor: &Principal) -> Result<(), Vec<ItemIssue>> {
        let issues: Vec<ItemIssue> = staged
            .iter()
            .filter_map(|s| {
                let fields = changed_fields(&s.live.data, &s.record.snapshot);
                match self.access.check_update(actor, &s.live, &fields) {
                    AccessDecision::Allowed => None,
                    AccessDecision::Denied { reason } => {
                        debug!("{} denied {}: {}", actor.id, s.record.key, reason);
                        Some(ItemIssue::new(
                            &s.record.key,
                            IssueKind::Unauthorized,
                            format!("You do not have permission to publish {}: {}.", s.live.label, reason),
                            Some(s.live.label.clone()),
                        ))
                    }
                }
            })
            .collect();
        if issues.is_empty() { Ok(()) } else { Err(issues) }
    }

    fn validate(&self, staged: &[Staged]) -> Result<(), Vec<ItemIssue>> {
        let issues: Vec<ItemIssue> = staged
            .iter()
            .flat_map(|s| {
                self.validator.validate(&s.draft).into_iter().map(move |v| {
                    ItemIssue::new(&s.record.key, IssueKind::Invalid, v.message, Some(s.draft.label.clone()))
                        .with_pointer(v.property_path)
                })
            })
            .collect();
        if issues.is_empty() { Ok(()) } else { Err(issues) }
    }

    // ── Apply ────────────────────────────────────────────────────

    fn apply(&self, staged: Vec<Staged>) -> PublishResult<usize> {
        let ordered = self.apply_order(staged);

        for (i, s) in ordered.iter().enumerate() {
            if let Err(source) = self.repo.save(&s.draft) {
                warn!("writing {} failed, restoring {} earlier items: {}", s.record.key, i, source);
                let rolled_back = self.restore(&ordered[..i]);
                return Err(PublishError::Apply {
                    key: s.record.key.clone(),
                    rolled_back,
                    source,
                });
            }
            debug!("applied {}", s.record.key);
        }

        for s in &ordered {
            self.drafts.delete(&s.record.key)?;
        }
        Ok(ordered.len())
    }

    /// Rewrites the pre-publish live copies, newest first. Returns false if
    /// any restore failed.
    fn restore(&self, written: &[Staged]) -> bool {
        let mut clean = true;
        for s in written.iter().rev() {
            if let Err(e) = self.repo.save(&s.live) {
                warn!("could not restore {}: {}", s.record.key, e);
                clean = false;
            }
        }
        clean
    }

    /// Orders the batch so structural parents are written before children,
    /// keeping resolution order otherwise. Parents outside the batch are
    /// ignored. A reference cycle is written in resolution order.
    fn apply_order(&self, staged: Vec<Staged>) -> Vec<Staged> {
        let position: HashMap<ItemKey, usize> = staged
            .iter()
            .enumerate()
            .map(|(i, s)| (s.record.key.clone(), i))
            .collect();
        let parents: Vec<Vec<usize>> = staged
            .iter()
            .enumerate()
            .map(|(i, s)| {
                self.repo
                    .structural_parents(&s.draft)
                    .iter()
                    .filter_map(|k| position.get(k).copied())
                    .filter(|&p| p != i)
                    .collect()
            })
            .collect();

        let mut emitted = vec![false; staged.len()];
        let mut order = Vec::with_capacity(staged.len());
        while order.len() < staged.len() {
            let ready = (0..staged.len())
                .find(|&i| !emitted[i] && parents[i].iter().all(|&p| emitted[p]));
            let Some(i) = ready else {
                warn!("structural reference cycle in publish batch");
                order.extend((0..staged.len()).filter(|&i| !emitted[i]));
                break;
            };
            emitted[i] = true;
            order.push(i);
        }

        let mut slots: Vec<Option<Staged>> = staged.into_iter().map(Some).collect();
        order.into_iter().filter_map(|i| slots[i].take()).collect()
    }
}

fn reject(phase: FailurePhase, issues: Vec<ItemIssue>) -> PublishOutcome {
    info!("publish rejected ({:?}, {} issues)", phase, issues.len());
    PublishOutcome::Failure(PublishFailure { phase, issues })
}
