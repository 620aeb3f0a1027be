use serde::{Deserialize, Serialize};

/// Declares the fields an entity type's snapshot must carry to be publishable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySchema {
    pub entity_type: String,
    pub fields: Vec<SchemaField>,
}

impl EntitySchema {
    pub fn new(entity_type: impl Into<String>, fields: Vec<SchemaField>) -> Self {
        Self {
            entity_type: entity_type.into(),
            fields,
        }
    }
}

/// A field checked during content validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaField {
    /// JSON pointer path (e.g., "/title", "/components/0/uuid").
    pub path: String,
    pub field_type: FieldType,
    /// A required field must be present, non-null, and not an empty string.
    #[serde(default)]
    pub required: bool,
}

impl SchemaField {
    fn simple(path: &str, field_type: FieldType, required: bool) -> Self {
        Self {
            path: path.into(),
            field_type,
            required,
        }
    }

    /// Shorthand for a text field.
    pub fn text(path: &str, required: bool) -> Self {
        Self::simple(path, FieldType::Text, required)
    }

    /// Shorthand for an optional numeric field.
    pub fn number(path: &str) -> Self {
        Self::simple(path, FieldType::Number, false)
    }

    /// Shorthand for an optional boolean field.
    pub fn bool(path: &str) -> Self {
        Self::simple(path, FieldType::Bool, false)
    }

    /// Shorthand for a list field (component trees, region contents).
    pub fn list(path: &str, required: bool) -> Self {
        Self::simple(path, FieldType::List, required)
    }

    /// Shorthand for a nested object field.
    pub fn object(path: &str, required: bool) -> Self {
        Self::simple(path, FieldType::Object, required)
    }

    /// Whether `value` has this field's JSON type.
    pub fn accepts(&self, value: &serde_json::Value) -> bool {
        match self.field_type {
            FieldType::Text => value.is_string(),
            FieldType::Number => value.is_number(),
            FieldType::Bool => value.is_boolean(),
            FieldType::List => value.is_array(),
            FieldType::Object => value.is_object(),
            FieldType::Any => true,
        }
    }
}

/// The JSON type a schema field must hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Number,
    Bool,
    List,
    Object,
    Any,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Bool => "bool",
            Self::List => "list",
            Self::Object => "object",
            Self::Any => "any",
        }
    }
}
