use autosave_model::{
    Entity, EntityKind, EntitySchema, EntityValidator, FieldType, NoopValidator, SchemaField,
    SchemaValidator, Violation,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn make_entity(entity_type: &str, data: serde_json::Value) -> Entity {
    Entity {
        entity_type: entity_type.to_string(),
        id: "1".to_string(),
        langcode: None,
        kind: EntityKind::Content,
        label: "x".to_string(),
        data,
    }
}

fn page_validator() -> SchemaValidator {
    SchemaValidator::new().with_schema(EntitySchema::new(
        "page",
        vec![
            SchemaField::text("/title", true),
            SchemaField::list("/components", true),
            SchemaField::bool("/status"),
        ],
    ))
}

// ── SchemaField constructors ─────────────────────────────────────

#[test]
fn text_field_shorthand() {
    let f = SchemaField::text("/title", true);
    assert_eq!(f.path, "/title");
    assert_eq!(f.field_type, FieldType::Text);
    assert!(f.required);
}

#[test]
fn optional_shorthands_not_required() {
    assert!(!SchemaField::number("/n").required);
    assert!(!SchemaField::bool("/b").required);
}

#[test]
fn schema_deserializes_without_required_flag() {
    let s: EntitySchema = serde_json::from_str(
        r#"{"entity_type":"page","fields":[{"path":"/title","field_type":"text"}]}"#,
    )
    .unwrap();
    assert_eq!(s.fields.len(), 1);
    assert!(!s.fields[0].required);
}

// ── Validation ───────────────────────────────────────────────────

#[test]
fn valid_entity_has_no_violations() {
    let e = make_entity("page", json!({"title": "Home", "components": [], "status": true}));
    assert!(page_validator().validate(&e).is_empty());
}

#[test]
fn every_violation_is_reported() {
    let e = make_entity("page", json!({"title": "  ", "status": "yes"}));
    assert_eq!(
        page_validator().validate(&e),
        vec![
            Violation::new("/title", "This value should not be blank."),
            Violation::new("/components", "This value should not be null."),
            Violation::new("/status", "This value should be of type bool."),
        ]
    );
}

#[test]
fn null_required_field_is_violation() {
    let e = make_entity("page", json!({"title": null, "components": []}));
    let v = page_validator().validate(&e);
    assert_eq!(v.len(), 1);
    assert_eq!(v[0].property_path, "/title");
}

#[test]
fn unregistered_type_passes() {
    let e = make_entity("node", json!({}));
    assert!(page_validator().validate(&e).is_empty());
}

#[test]
fn noop_validator_accepts_everything() {
    let e = make_entity("page", json!(null));
    assert!(NoopValidator.validate(&e).is_empty());
}
