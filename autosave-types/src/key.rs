//! Stable identity of a draft.
//!
//! An item key scopes a draft by entity type, entity id and, for translatable
//! content, language: `node:42:en`, `js_component:hero`,
//! `page_region:olivero.sidebar`. Keys compare, order and hash by their
//! rendered string so the same key read back from storage or from a client
//! request is always the same key.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

const SEPARATOR: char = ':';

/// Composite identifier of a draft: `entity_type:entity_id[:langcode]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemKey {
    entity_type: String,
    entity_id: String,
    langcode: Option<String>,
    rendered: String,
}

impl ItemKey {
    /// Creates a key for an untranslated item (config entities, components).
    pub fn new(entity_type: impl Into<String>, entity_id: impl Into<String>) -> Result<Self> {
        Self::build(entity_type.into(), entity_id.into(), None)
    }

    /// Creates a key scoped to one translation of a content entity.
    pub fn translated(
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
        langcode: impl Into<String>,
    ) -> Result<Self> {
        Self::build(entity_type.into(), entity_id.into(), Some(langcode.into()))
    }

    fn build(entity_type: String, entity_id: String, langcode: Option<String>) -> Result<Self> {
        for segment in [Some(&entity_type), Some(&entity_id), langcode.as_ref()]
            .into_iter()
            .flatten()
        {
            if segment.is_empty() {
                return Err(Error::InvalidKey("empty key segment".to_string()));
            }
            if segment.contains(SEPARATOR) {
                return Err(Error::InvalidKey(format!(
                    "segment {segment:?} contains '{SEPARATOR}'"
                )));
            }
        }

        let rendered = match &langcode {
            Some(lang) => format!("{entity_type}{SEPARATOR}{entity_id}{SEPARATOR}{lang}"),
            None => format!("{entity_type}{SEPARATOR}{entity_id}"),
        };

        Ok(Self {
            entity_type,
            entity_id,
            langcode,
            rendered,
        })
    }

    /// Parses a rendered key.
    pub fn parse(s: &str) -> Result<Self> {
        let mut parts = s.split(SEPARATOR);
        let entity_type = parts.next().unwrap_or_default();
        let entity_id = parts
            .next()
            .ok_or_else(|| Error::InvalidKey(format!("{s:?} has no entity id")))?;
        let langcode = parts.next();
        if parts.next().is_some() {
            return Err(Error::InvalidKey(format!("{s:?} has too many segments")));
        }
        Self::build(
            entity_type.to_string(),
            entity_id.to_string(),
            langcode.map(str::to_string),
        )
    }

    /// The entity type segment (e.g. `node`, `js_component`).
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// The entity id segment.
    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    /// The language segment, if the key is scoped to a translation.
    pub fn langcode(&self) -> Option<&str> {
        self.langcode.as_deref()
    }

    /// The rendered string form.
    pub fn as_str(&self) -> &str {
        &self.rendered
    }
}

impl PartialEq for ItemKey {
    fn eq(&self, other: &Self) -> bool {
        self.rendered == other.rendered
    }
}

impl Eq for ItemKey {}

impl Hash for ItemKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rendered.hash(state);
    }
}

impl PartialOrd for ItemKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ItemKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rendered.cmp(&other.rendered)
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

impl FromStr for ItemKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ItemKey {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<ItemKey> for String {
    fn from(key: ItemKey) -> Self {
        key.rendered
    }
}
