//! Conflict detection, the optimistic-concurrency gate of a publish.
//!
//! Compares the hashes a client expects against the draft store. It detects,
//! but does not prevent, races between a client building its request and
//! another editor changing the same draft.

use crate::error::PublishResult;
use crate::request::{IssueKind, ItemIssue, PublishRequest};
use autosave_storage::{DraftFilter, DraftRecord, DraftStore};
use tracing::debug;

const MISSING_DETAIL: &str =
    "This item has no pending changes. It may have been published or discarded by someone else.";
const UNMATCHED_DETAIL: &str =
    "This item was changed since you last loaded it. Refresh and apply your changes again.";

/// Resolves `request` against `store`.
///
/// An empty request resolves to every stored draft. Otherwise each requested
/// key must have a draft whose hash equals the expected one; stored drafts
/// the request does not name are left alone. Any issue fails the whole
/// resolution, so `Ok` is never a partial set.
pub fn detect(
    request: &PublishRequest,
    store: &DraftStore,
) -> PublishResult<Result<Vec<DraftRecord>, Vec<ItemIssue>>> {
    if request.is_all() {
        let records = store.list(&DraftFilter::all())?;
        debug!("publish-all resolved {} drafts", records.len());
        return Ok(Ok(records));
    }

    let mut resolved = Vec::with_capacity(request.len());
    let mut issues = Vec::new();
    for (key, expected) in request.iter() {
        match store.get(key)? {
            None => issues.push(ItemIssue::new(key, IssueKind::Missing, MISSING_DETAIL, None)),
            Some(record) if record.data_hash != expected => {
                debug!(
                    "draft {} is stale (expected {}, stored {})",
                    key, expected, record.data_hash
                );
                issues.push(ItemIssue::new(
                    key,
                    IssueKind::Unmatched,
                    UNMATCHED_DETAIL,
                    Some(record.label),
                ));
            }
            Some(record) => resolved.push(record),
        }
    }

    if issues.is_empty() {
        Ok(Ok(resolved))
    } else {
        Ok(Err(issues))
    }
}
