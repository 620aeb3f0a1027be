//! Publish requests, itemized issues, and outcomes.

use crate::error::{PublishError, PublishResult};
use autosave_types::ItemKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The drafts a client believes exist, with the hash it last observed for each.
///
/// An empty request means "publish everything in the draft store".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishRequest {
    expected: BTreeMap<ItemKey, String>,
}

impl PublishRequest {
    /// A request to publish every pending draft.
    pub fn all() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the expected hash for `key`.
    pub fn insert(&mut self, key: ItemKey, data_hash: impl Into<String>) {
        self.expected.insert(key, data_hash.into());
    }

    #[must_use]
    pub fn with(mut self, key: ItemKey, data_hash: impl Into<String>) -> Self {
        self.insert(key, data_hash);
        self
    }

    /// Whether this request publishes everything.
    pub fn is_all(&self) -> bool {
        self.expected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.expected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expected.is_empty()
    }

    pub fn contains(&self, key: &ItemKey) -> bool {
        self.expected.contains_key(key)
    }

    /// Requested keys and expected hashes, ordered by key.
    pub fn iter(&self) -> impl Iterator<Item = (&ItemKey, &str)> {
        self.expected.iter().map(|(k, h)| (k, h.as_str()))
    }

    /// Parses a `{ "<item key>": { "data_hash": "...", ... }, ... }` body.
    ///
    /// `null` and `{}` both mean "publish everything". Extra members of each
    /// entry are ignored.
    pub fn from_json(body: &serde_json::Value) -> PublishResult<Self> {
        let map = match body {
            serde_json::Value::Null => return Ok(Self::all()),
            serde_json::Value::Object(map) => map,
            _ => {
                return Err(PublishError::InvalidRequest(
                    "request body must be an object keyed by item key".to_string(),
                ));
            }
        };

        let mut request = Self::all();
        for (raw_key, entry) in map {
            let key = ItemKey::parse(raw_key)?;
            let data_hash = entry
                .get("data_hash")
                .and_then(|h| h.as_str())
                .ok_or_else(|| {
                    PublishError::InvalidRequest(format!("{raw_key} has no data_hash"))
                })?;
            request.insert(key, data_hash);
        }
        Ok(request)
    }
}

/// Classification of a per-item publish problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// The client referenced a draft the server no longer has.
    Missing,
    /// The draft changed since the client last fetched it.
    Unmatched,
    /// The actor may not publish the fields this draft touches.
    Unauthorized,
    /// The materialized draft fails content validation.
    Invalid,
    /// A mandatory co-dependency was left out of the batch.
    MissingDependency,
}

impl IssueKind {
    /// Default machine-readable code for this kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Unmatched => "unmatched",
            Self::Unauthorized => "unauthorized",
            Self::Invalid => "invalid",
            Self::MissingDependency => "missing_dependency",
        }
    }
}

/// Entity identification attached to an issue so clients can render
/// per-entity banners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueMeta {
    pub entity_type: String,
    pub entity_id: String,
    pub label: Option<String>,
    pub auto_save_key: ItemKey,
}

impl IssueMeta {
    pub fn new(key: &ItemKey, label: Option<String>) -> Self {
        Self {
            entity_type: key.entity_type().to_string(),
            entity_id: key.entity_id().to_string(),
            label,
            auto_save_key: key.clone(),
        }
    }
}

/// One itemized problem found while validating a publish batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemIssue {
    pub key: ItemKey,
    pub kind: IssueKind,
    pub code: String,
    pub detail: String,
    /// Where the problem is: the item key itself, or a property path inside
    /// the snapshot for content violations.
    pub pointer: String,
    pub meta: IssueMeta,
}

impl ItemIssue {
    pub fn new(key: &ItemKey, kind: IssueKind, detail: impl Into<String>, label: Option<String>) -> Self {
        Self {
            key: key.clone(),
            kind,
            code: kind.code().to_string(),
            detail: detail.into(),
            pointer: key.to_string(),
            meta: IssueMeta::new(key, label),
        }
    }

    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    #[must_use]
    pub fn with_pointer(mut self, pointer: impl Into<String>) -> Self {
        self.pointer = pointer.into();
        self
    }
}

/// The pipeline phase that rejected a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePhase {
    /// Stale or missing drafts.
    Conflict,
    /// A mandatory co-dependency was not requested.
    MissingDependency,
    /// The actor lacks permission for at least one item.
    Unauthorized,
    /// At least one materialized draft is invalid.
    Validation,
}

impl FailurePhase {
    /// HTTP status equivalent of this failure.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Conflict => 409,
            Self::MissingDependency => 424,
            Self::Unauthorized => 403,
            Self::Validation => 422,
        }
    }
}

/// A rejected batch. Nothing was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishFailure {
    pub phase: FailurePhase,
    pub issues: Vec<ItemIssue>,
}

/// Result of a publish attempt that did not hit a storage failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Every resolved draft was applied; carries the number published.
    Success(usize),
    /// The batch was rejected before any write.
    Failure(PublishFailure),
}

impl PublishOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Issues of a failed outcome; empty on success.
    pub fn issues(&self) -> &[ItemIssue] {
        match self {
            Self::Success(_) => &[],
            Self::Failure(f) => &f.issues,
        }
    }
}
