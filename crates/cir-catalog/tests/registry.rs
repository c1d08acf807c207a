use std::sync::Arc;

use cir_catalog::error::ConfigError;
use cir_catalog::{RegistryHandle, SchemaRegistry};
use cir_core::vocab::{FlagColor, Hint, ItemType, ValidatorType};
use serde_json::json;

fn registry_from(value: serde_json::Value) -> Result<SchemaRegistry, ConfigError> {
    SchemaRegistry::from_json(&value.to_string())
}

#[test]
fn builtin_catalog_covers_authoring_item_types() {
    let registry = SchemaRegistry::builtin();
    assert_eq!(registry.len(), 28);

    for name in ["TEXT_FIELD", "MENU", "MENU_MULTI_SELECT", "DATE", "ASSESSMENT", "LABEL"] {
        assert!(registry.contains(&ItemType::from(name)), "missing {name}");
    }
    assert!(registry.is_emr_field("birthDate"));
    assert!(!registry.is_emr_field("favouriteColour"));
}

#[test]
fn builtin_menus_require_choices_and_nothing_else_does() {
    let registry = SchemaRegistry::builtin();
    let requiring: Vec<_> = registry
        .rules()
        .into_iter()
        .filter(|r| r.requires_choices)
        .map(|r| r.item_type.as_str().to_string())
        .collect();
    assert_eq!(requiring, vec!["MENU", "MENU_MULTI_SELECT"]);
}

#[test]
fn builtin_assessment_does_not_allow_blue() {
    let rule = SchemaRegistry::builtin()
        .lookup(&ItemType::from("ASSESSMENT"))
        .unwrap();
    assert!(!rule.allows_flag(FlagColor::Blue));
    assert!(rule.allows_flag(FlagColor::Red));
    assert!(rule.allows_validator(ValidatorType::Mandatory));
}

#[test]
fn lookup_of_unknown_type_fails() {
    let err = SchemaRegistry::builtin()
        .lookup(&ItemType::from("HOLOGRAM"))
        .unwrap_err();
    assert_eq!(err.0, ItemType::from("HOLOGRAM"));
    assert_eq!(err.to_string(), "unknown item type: HOLOGRAM");
}

#[test]
fn new_item_types_are_pure_data() {
    let registry = registry_from(json!({
        "catalog_version": 1,
        "item_types": [
            { "type": "SIGNATURE", "validators": ["MANDATORY"], "hints": ["BORDER"], "flags": ["NONE"] }
        ]
    }))
    .unwrap();

    let rule = registry.lookup(&ItemType::from("SIGNATURE")).unwrap();
    assert!(rule.allows_hint(Hint::Border));
    assert!(!rule.requires_choices);
}

#[test]
fn duplicate_item_type_is_rejected() {
    let err = registry_from(json!({
        "catalog_version": 1,
        "item_types": [
            { "type": "TEXT_FIELD" },
            { "type": "TEXT_FIELD", "validators": ["EMAIL"] }
        ]
    }))
    .unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateItemType(t) if t.as_str() == "TEXT_FIELD"));
}

#[test]
fn unknown_vocabulary_names_are_malformed_rules() {
    let err = registry_from(json!({
        "catalog_version": 1,
        "item_types": [ { "type": "TEXT_FIELD", "hints": ["SPARKLES"] } ]
    }))
    .unwrap_err();
    assert!(matches!(
        err,
        ConfigError::MalformedRule { ref item_type, ref reason }
            if item_type == "TEXT_FIELD" && reason.contains("SPARKLES")
    ));

    let err = registry_from(json!({
        "catalog_version": 1,
        "item_types": [ { "type": "TEXT_FIELD", "validators": ["mandatory"] } ]
    }))
    .unwrap_err();
    assert!(matches!(err, ConfigError::MalformedRule { .. }));
}

#[test]
fn lower_case_item_type_is_rejected() {
    let err = registry_from(json!({
        "catalog_version": 1,
        "item_types": [ { "type": "text_field" } ]
    }))
    .unwrap_err();
    assert!(matches!(err, ConfigError::MalformedRule { .. }));
}

#[test]
fn unversioned_catalog_is_migrated() {
    let registry = registry_from(json!({
        "item_types": [
            { "type": "MENU", "validators": ["MANDATORY"], "choices_required": true }
        ]
    }))
    .unwrap();

    let rule = registry.lookup(&ItemType::from("MENU")).unwrap();
    assert!(rule.requires_choices);
    assert_eq!(registry.emr_fields().count(), 0);
}

#[test]
fn newer_catalog_version_is_rejected() {
    let err = registry_from(json!({ "catalog_version": 99, "item_types": [] })).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::UnsupportedVersion { found: 99, supported: 1 }
    ));
}

#[test]
fn malformed_json_is_a_config_error() {
    let err = SchemaRegistry::from_json("{ not json").unwrap_err();
    assert!(matches!(err, ConfigError::Serialization(_)));
}

#[test]
fn duplicate_emr_field_is_rejected() {
    let err = registry_from(json!({
        "catalog_version": 1,
        "item_types": [],
        "emr_fields": ["sex", "sex"]
    }))
    .unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateEmrField(f) if f == "sex"));
}

#[test]
fn swap_keeps_existing_snapshots() {
    let handle = RegistryHandle::new(SchemaRegistry::builtin().clone());
    let before = handle.snapshot();

    let replacement = registry_from(json!({
        "catalog_version": 1,
        "item_types": [ { "type": "LABEL" } ]
    }))
    .unwrap();
    let previous = handle.swap(replacement);

    assert!(Arc::ptr_eq(&before, &previous));
    assert_eq!(before.len(), 28);
    assert_eq!(handle.snapshot().len(), 1);
}

#[test]
fn registry_is_shareable_across_threads() {
    let registry = SchemaRegistry::builtin();
    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                assert!(registry.lookup(&ItemType::from("MENU")).is_ok());
            });
        }
    });
}
