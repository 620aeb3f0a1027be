//! The auto-save endpoints as status/body pairs.
//!
//! Routing and request decoding belong to the host. Each method here takes
//! already-decoded inputs and returns the status code and JSON body clients
//! expect, so any HTTP stack can serve them unchanged.

use crate::coordinator::Publisher;
use crate::error::PublishError;
use crate::policy::AccessDecision;
use crate::request::{FailurePhase, ItemIssue, PublishFailure, PublishOutcome, PublishRequest};
use autosave_model::Entity;
use autosave_storage::{DraftFilter, DraftRecord, SaveOutcome, StorageError};
use autosave_types::{ItemKey, Principal};
use serde_json::{json, Map, Value};
use tracing::{error, warn};

const NO_DRAFT_ERROR: &str = "No auto-save data found for this entity.";

/// Status code plus optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Option<Value>,
}

impl ApiResponse {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    pub fn no_content() -> Self {
        Self {
            status: 204,
            body: None,
        }
    }

    fn error(status: u16, detail: impl Into<String>) -> Self {
        Self::json(status, json!({ "errors": [{ "detail": detail.into() }] }))
    }

    fn internal(e: &PublishError) -> Self {
        error!("auto-save request failed: {}", e);
        Self::error(500, "An unexpected error occurred while processing auto-save data.")
    }
}

/// The auto-save HTTP surface over a [`Publisher`].
pub struct AutoSaveApi {
    publisher: Publisher,
}

impl AutoSaveApi {
    pub fn new(publisher: Publisher) -> Self {
        Self { publisher }
    }

    pub fn publisher(&self) -> &Publisher {
        &self.publisher
    }

    /// `GET /auto-save`: every draft the actor may see.
    pub fn list(&self, actor: &Principal) -> ApiResponse {
        let records = match self.publisher.drafts().list(&DraftFilter::all()) {
            Ok(records) => records,
            Err(e) => return ApiResponse::internal(&e.into()),
        };

        let mut body = Map::new();
        for record in records {
            if self.publisher.access().can_view(actor, &record.key) {
                body.insert(record.key.to_string(), summary(&record));
            }
        }
        ApiResponse::json(200, Value::Object(body))
    }

    /// `POST /auto-save/publish-all`: `body` is `None` when omitted.
    pub fn publish_all(&self, body: Option<&Value>, actor: &Principal) -> ApiResponse {
        let request = match body.map(PublishRequest::from_json).transpose() {
            Ok(request) => request.unwrap_or_default(),
            Err(e) => {
                warn!("rejected publish request: {}", e);
                return ApiResponse::error(400, e.to_string());
            }
        };

        match self.publisher.publish(&request, actor) {
            Ok(PublishOutcome::Success(0)) => {
                ApiResponse::json(200, json!({ "message": "No items to publish." }))
            }
            Ok(PublishOutcome::Success(count)) => ApiResponse::json(
                200,
                json!({ "message": format!("Successfully published {count} {}.", plural(count)) }),
            ),
            Ok(PublishOutcome::Failure(failure)) => failure_response(&failure),
            Err(e) => ApiResponse::internal(&e),
        }
    }

    /// `DELETE /auto-save/{entity_type}/{id}`: discards every translation's draft.
    pub fn discard(&self, entity_type: &str, entity_id: &str) -> ApiResponse {
        match self.publisher.drafts().delete_entity(entity_type, entity_id) {
            Ok(0) => ApiResponse::json(404, json!({ "error": NO_DRAFT_ERROR })),
            Ok(_) => ApiResponse::no_content(),
            Err(e) => ApiResponse::internal(&e.into()),
        }
    }

    /// `GET` of one item: the draft snapshot (or live data when there is no
    /// draft) plus the `autoSaves` map for every key of the edit session.
    pub fn get_item(&self, key: &ItemKey, session: &[ItemKey]) -> ApiResponse {
        match self.item_view(key, session) {
            Ok(Some(body)) => ApiResponse::json(200, body),
            Ok(None) => ApiResponse::error(404, format!("{key} does not exist.")),
            Err(e) => ApiResponse::internal(&e),
        }
    }

    /// `PATCH` of one item: stages `snapshot` and returns the refreshed view.
    pub fn patch_item(
        &self,
        key: &ItemKey,
        snapshot: Value,
        actor: &Principal,
        session: &[ItemKey],
    ) -> ApiResponse {
        let live = match self.publisher.repository().load(key) {
            Ok(Some(live)) => live,
            Ok(None) => return ApiResponse::error(404, format!("{key} does not exist.")),
            Err(e) => return ApiResponse::internal(&e.into()),
        };
        let fields = autosave_model::changed_fields(&live.data, &snapshot);
        if let AccessDecision::Denied { reason } =
            self.publisher.access().check_update(actor, &live, &fields)
        {
            return ApiResponse::error(403, format!("You may not edit {}: {}.", live.label, reason));
        }

        let saved = self
            .publisher
            .drafts()
            .save(key, snapshot, actor, self.publisher.repository());
        match saved {
            Ok(_) => self.get_item(key, session),
            Err(StorageError::NotFound(_)) => ApiResponse::error(404, format!("{key} does not exist.")),
            Err(e) => ApiResponse::internal(&e.into()),
        }
    }

    /// Carries a direct live change of a config entity's status/label into
    /// its pending draft.
    pub fn live_config_saved(&self, live: &Entity) -> Result<Option<SaveOutcome>, PublishError> {
        let fields = &self.publisher.config().config_live_fields;
        Ok(self.publisher.drafts().reconcile_config_fields(live, fields)?)
    }

    /// Drops every draft. Called when the owning feature is uninstalled.
    pub fn teardown(&self) -> Result<(), PublishError> {
        self.publisher.drafts().clear()?;
        Ok(())
    }

    fn item_view(&self, key: &ItemKey, session: &[ItemKey]) -> Result<Option<Value>, PublishError> {
        let Some(live) = self.publisher.repository().load(key)? else {
            return Ok(None);
        };
        let drafts = self.publisher.drafts();
        let data = match drafts.get(key)? {
            Some(record) => record.snapshot,
            None => live.data,
        };

        let mut auto_saves = Map::new();
        for k in std::iter::once(key).chain(session.iter().filter(|k| *k != key)) {
            let entry = match drafts.get(k)? {
                Some(record) => json!({
                    "data_hash": record.data_hash,
                    "owner": record.owner.id,
                    "updated": record.updated.as_secs(),
                }),
                None => Value::Null,
            };
            auto_saves.insert(k.to_string(), entry);
        }

        Ok(Some(json!({ "data": data, "autoSaves": auto_saves })))
    }
}

fn summary(record: &DraftRecord) -> Value {
    json!({
        "entity_type": record.key.entity_type(),
        "entity_id": record.key.entity_id(),
        "langcode": record.key.langcode(),
        "owner": {
            "id": record.owner.id,
            "name": record.owner.name,
            "avatar": record.owner.avatar,
            "uri": record.owner.uri,
        },
        "label": record.label,
        "updated": record.updated.as_secs(),
        "data_hash": record.data_hash,
    })
}

fn failure_response(failure: &PublishFailure) -> ApiResponse {
    let status = failure.phase.http_status();
    let errors: Vec<Value> = failure
        .issues
        .iter()
        .map(|issue| issue_json(failure.phase, issue))
        .collect();

    if failure.phase == FailurePhase::Unauthorized {
        let labels: Vec<&str> = failure
            .issues
            .iter()
            .filter_map(|i| i.meta.label.as_deref())
            .collect();
        return ApiResponse::json(
            status,
            json!({
                "message": format!("You do not have permission to publish: {}.", labels.join(", ")),
                "errors": errors,
            }),
        );
    }
    ApiResponse::json(status, json!({ "errors": errors }))
}

fn issue_json(phase: FailurePhase, issue: &ItemIssue) -> Value {
    let meta = json!({
        "entity_type": issue.meta.entity_type,
        "entity_id": issue.meta.entity_id,
        "label": issue.meta.label,
        "auto_save_key": issue.meta.auto_save_key,
    });
    match phase {
        FailurePhase::Conflict => json!({
            "detail": issue.detail,
            "source": { "pointer": issue.pointer },
            "code": issue.code,
        }),
        FailurePhase::MissingDependency => json!({
            "detail": issue.detail,
            "source": { "pointer": issue.pointer },
            "code": issue.code,
            "meta": meta,
        }),
        FailurePhase::Unauthorized | FailurePhase::Validation => json!({
            "detail": issue.detail,
            "source": { "pointer": issue.pointer },
            "meta": meta,
        }),
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "item" } else { "items" }
}
