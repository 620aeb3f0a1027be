use crate::{Entity, EntitySchema};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One content constraint violated by a materialized draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Property path inside the snapshot, as a JSON pointer.
    pub property_path: String,
    pub message: String,
}

impl Violation {
    pub fn new(property_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            property_path: property_path.into(),
            message: message.into(),
        }
    }
}

/// Validates an entity after a draft has been materialized onto it.
///
/// Implementations report every violation they find rather than stopping at
/// the first, so one publish attempt surfaces all problems in the batch.
pub trait EntityValidator: Send + Sync {
    fn validate(&self, entity: &Entity) -> Vec<Violation>;
}

/// Accepts every entity.
pub struct NoopValidator;

impl EntityValidator for NoopValidator {
    fn validate(&self, _entity: &Entity) -> Vec<Violation> {
        Vec::new()
    }
}

/// Validates entities against registered per-type schemas.
///
/// Entity types without a schema pass unchecked.
#[derive(Debug, Clone, Default)]
pub struct SchemaValidator {
    schemas: HashMap<String, EntitySchema>,
}

impl SchemaValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the schema for its entity type.
    pub fn register(&mut self, schema: EntitySchema) {
        self.schemas.insert(schema.entity_type.clone(), schema);
    }

    #[must_use]
    pub fn with_schema(mut self, schema: EntitySchema) -> Self {
        self.register(schema);
        self
    }
}

impl EntityValidator for SchemaValidator {
    fn validate(&self, entity: &Entity) -> Vec<Violation> {
        let Some(schema) = self.schemas.get(&entity.entity_type) else {
            return Vec::new();
        };

        let mut violations = Vec::new();
        for field in &schema.fields {
            match entity.data.pointer(&field.path) {
                None | Some(serde_json::Value::Null) => {
                    if field.required {
                        violations.push(Violation::new(&field.path, "This value should not be null."));
                    }
                }
                Some(value) if !field.accepts(value) => {
                    violations.push(Violation::new(
                        &field.path,
                        format!("This value should be of type {}.", field.field_type.as_str()),
                    ));
                }
                Some(serde_json::Value::String(s)) if field.required && s.trim().is_empty() => {
                    violations.push(Violation::new(&field.path, "This value should not be blank."));
                }
                Some(_) => {}
            }
        }
        violations
    }
}
