//! Publish pipeline configuration.

use autosave_storage::CONFIG_LIVE_FIELDS;
use autosave_types::ItemKey;
use serde::{Deserialize, Serialize};

/// Entity type of code-defined components.
pub const JS_COMPONENT_TYPE: &str = "js_component";

/// Key of the global shared asset bundle.
pub const GLOBAL_ASSET_LIBRARY: &str = "asset_library:global";

/// Error code reported when the global asset bundle is left out of a batch.
pub const GLOBAL_ASSET_NOT_PUBLISHED: &str = "GlobalAssetNotPublished";

/// Configuration for the publish pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Co-publish rules enforced before any write.
    pub dependency_rules: Vec<DependencyRule>,
    /// Fields of config entities that may change on the live object without
    /// invalidating a pending draft.
    pub config_live_fields: Vec<String>,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            dependency_rules: vec![DependencyRule::global_asset_library()],
            config_live_fields: CONFIG_LIVE_FIELDS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// If any draft of `trigger_entity_type` is published and `dependency` has a
/// pending draft of its own, `dependency` must be in the same batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyRule {
    pub trigger_entity_type: String,
    pub dependency: ItemKey,
    /// Machine-readable code reported when the dependency is missing.
    pub code: String,
}

impl DependencyRule {
    /// Code components may reference the global CSS/JS bundle, which must not
    /// go live partially.
    pub fn global_asset_library() -> Self {
        Self {
            trigger_entity_type: JS_COMPONENT_TYPE.to_string(),
            dependency: GLOBAL_ASSET_LIBRARY
                .parse()
                .expect("global asset library key is well-formed"),
            code: GLOBAL_ASSET_NOT_PUBLISHED.to_string(),
        }
    }
}
