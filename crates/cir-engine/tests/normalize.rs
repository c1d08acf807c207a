use cir_catalog::SchemaRegistry;
use cir_core::vocab::{FlagColor, Hint, ItemType, ValidatorType};
use cir_engine::{Engine, EngineOptions, SchemaViolation, Violation};
use serde_json::{json, Value};

fn parse(raw: Value) -> Result<cir_engine::Document, SchemaViolation> {
    Engine::new(SchemaRegistry::builtin()).parse(&raw)
}

fn violations(raw: Value) -> Vec<Violation> {
    parse(raw).unwrap_err().violations
}

#[test]
fn items_keep_display_order() {
    let doc = parse(json!([
        { "id": "name", "type": "TEXT_FIELD", "text": "Name" },
        { "id": "dob", "type": "DATE", "text": "Date of birth" },
        { "id": "smoker", "type": "MENU", "choices": [{ "val": "Y" }, { "val": "N" }] },
    ]))
    .unwrap();

    let ids: Vec<_> = doc.items().iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, ["name", "dob", "smoker"]);
    assert_eq!(doc.position("dob"), Some(1));
    assert_eq!(doc.item("smoker").unwrap().choice_count(), 2);
    assert_eq!(doc.item("name").unwrap().item_type, ItemType::from("TEXT_FIELD"));
    assert!(doc.notes().is_empty());
}

#[test]
fn hint_and_flag_lists_become_sets() {
    let doc = parse(json!([{
        "id": "q1",
        "type": "TEXT_FIELD",
        "hints": ["SAME_LINE", "BORDER", "SAME_LINE"],
        "flags": ["BLUE"],
        "flag": "RED",
    }]))
    .unwrap();

    let item = doc.item("q1").unwrap();
    assert_eq!(item.hints.len(), 2);
    assert!(item.hints.contains(&Hint::SameLine));
    assert_eq!(
        item.flags.iter().copied().collect::<Vec<_>>(),
        [FlagColor::Red, FlagColor::Blue]
    );
}

#[test]
fn sections_are_flattened_in_order() {
    let doc = parse(json!({
        "meta": { "title": "Intake" },
        "sections": [
            {
                "kind": "section",
                "ref": "demographics",
                "items": [
                    { "id": "name", "type": "TEXT_FIELD" },
                    { "header": "Contact", "items": [{ "id": "email", "type": "TEXT_FIELD" }] },
                ],
            },
            { "id": "notes", "type": "TEXT_AREA" },
        ],
    }))
    .unwrap();

    let placed: Vec<_> = doc
        .items()
        .iter()
        .map(|i| (i.id.as_str(), i.section.as_deref()))
        .collect();
    assert_eq!(
        placed,
        [
            ("name", Some("demographics")),
            ("email", Some("Contact")),
            ("notes", None),
        ]
    );
}

#[test]
fn section_hints_and_flag_are_checked_against_the_vocabularies() {
    let doc = parse(json!({
        "sections": [{
            "kind": "section",
            "ref": "history",
            "hints": ["grey_bg"],
            "attributes": { "flag": "red" },
            "items": [{ "id": "q", "type": "TEXT_FIELD" }],
        }],
    }))
    .unwrap();
    assert_eq!(
        doc.notes(),
        [
            "$.sections[0]: section hint 'grey_bg' read as GREY_BG",
            "$.sections[0]: section flag 'red' read as RED",
        ]
    );

    let err = parse(json!({
        "sections": [{
            "kind": "section",
            "hints": ["SPARKLES"],
            "attributes": { "flag": "MAUVE" },
            "items": [{ "id": "q", "type": "TEXT_FIELD" }],
        }],
    }))
    .unwrap_err();
    assert_eq!(err.path, "$.sections[0]");
    assert_eq!(err.position, None);
    assert_eq!(
        err.violations,
        [
            Violation::UnknownHint { name: "SPARKLES".into() },
            Violation::UnknownFlag { name: "MAUVE".into() },
        ]
    );

    assert_eq!(
        violations(json!([{ "kind": "section", "attributes": "loud", "items": [] }])),
        [Violation::WrongFieldType { field: "attributes", expected: "an object" }]
    );
}

#[test]
fn neg_flag_must_name_a_flag_color() {
    assert!(parse(json!([{ "id": "q", "type": "CHECKBOX", "negFlag": "ORANGE" }])).is_ok());
    assert_eq!(
        violations(json!([{ "id": "q", "type": "CHECKBOX", "negFlag": "SCARLET" }])),
        [Violation::UnknownFlag { name: "SCARLET".into() }]
    );
    assert_eq!(
        violations(json!([{ "id": "q", "type": "CHECKBOX", "negFlag": 3 }])),
        [Violation::WrongFieldType { field: "negFlag", expected: "a string" }]
    );
}

#[test]
fn section_nesting_is_bounded() {
    let nested = |depth: usize| {
        let mut entry = json!({ "id": "deep", "type": "LABEL" });
        for _ in 0..depth {
            entry = json!({ "kind": "section", "items": [entry] });
        }
        json!([entry])
    };
    let engine_options = EngineOptions {
        max_section_depth: 2,
        ..EngineOptions::default()
    };
    let engine = Engine::with_options(SchemaRegistry::builtin(), engine_options);

    assert!(engine.parse(&nested(2)).is_ok());
    let err = engine.parse(&nested(3)).unwrap_err();
    assert_eq!(err.violations, [Violation::SectionTooDeep { limit: 2 }]);
    assert_eq!(err.position, None);
}

#[test]
fn malformed_documents() {
    let err = parse(json!("not a form")).unwrap_err();
    assert!(matches!(err.violations[0], Violation::MalformedDocument { .. }));

    let err = parse(json!({ "title": "no sections" })).unwrap_err();
    assert!(matches!(err.violations[0], Violation::MalformedDocument { .. }));

    assert_eq!(violations(json!([42])), [Violation::NotAnObject]);
    assert_eq!(
        violations(json!([{ "kind": "page", "items": [] }])),
        [Violation::UnknownKind { kind: "page".into() }]
    );
    assert_eq!(
        violations(json!([{ "id": "q1" }])),
        [Violation::MissingField { field: "type" }]
    );
}

#[test]
fn empty_document_is_valid() {
    let doc = parse(json!([])).unwrap();
    assert!(doc.is_empty());
}

#[test]
fn every_violation_of_the_first_bad_item_is_reported() {
    let err = parse(json!([
        { "id": "ok", "type": "TEXT_FIELD" },
        {
            "id": "bad",
            "type": "TEXT_FIELD",
            "hints": ["EXPANDED"],
            "flags": ["NOPE"],
            "validator": { "type": "MAGIC" },
        },
        { "id": "also_bad", "type": "WIDGET" },
    ]))
    .unwrap_err();

    assert_eq!(err.position, Some(1));
    assert_eq!(err.path, "$[1]");
    assert_eq!(err.item_id.as_deref(), Some("bad"));
    assert_eq!(
        err.violations,
        [
            Violation::HintNotAllowed { hint: Hint::Expanded },
            Violation::UnknownFlag { name: "NOPE".into() },
            Violation::UnknownValidatorType { name: "MAGIC".into() },
        ]
    );
}

#[test]
fn violation_display_names_the_entry() {
    let err = parse(json!([{ "id": "q1", "type": "WIDGET" }])).unwrap_err();
    assert_eq!(err.to_string(), "$[0]: unknown item type 'WIDGET'");
}

#[test]
fn validator_must_be_allowed_for_the_type() {
    assert_eq!(
        violations(json!([{ "id": "dob", "type": "DATE", "validator": { "type": "EMAIL" } }])),
        [Violation::ValidatorNotAllowed {
            validator: ValidatorType::Email
        }]
    );
    assert_eq!(
        violations(json!([{ "id": "pic", "type": "PICTURE", "validator": "MANDATORY" }])),
        [Violation::ValidatorNotAllowed {
            validator: ValidatorType::Mandatory
        }]
    );
}

#[test]
fn flag_must_be_allowed_for_the_type() {
    assert_eq!(
        violations(json!([{ "id": "a1", "type": "ASSESSMENT", "flags": ["BLUE"] }])),
        [Violation::FlagNotAllowed {
            flag: FlagColor::Blue
        }]
    );
}

#[test]
fn validator_shorthand_and_params() {
    let doc = parse(json!([
        { "id": "a", "type": "TEXT_FIELD", "validator": "MANDATORY" },
        {
            "id": "b",
            "type": "TEXT_FIELD",
            "validator": { "type": "REG_EXP", "format": "[0-9]+", "message": "digits only" },
        },
    ]))
    .unwrap();

    let a = doc.item("a").unwrap().validator.as_ref().unwrap();
    assert_eq!(a.kind, ValidatorType::Mandatory);
    let b = doc.item("b").unwrap().validator.as_ref().unwrap();
    assert_eq!(b.pattern(), Some("[0-9]+"));
    assert_eq!(b.message(), Some("digits only"));
}

#[test]
fn reg_exp_patterns_are_compiled_up_front() {
    assert_eq!(
        violations(json!([{ "id": "a", "type": "TEXT_FIELD", "validator": { "type": "REG_EXP" } }])),
        [Violation::MissingPattern]
    );

    let found = violations(json!([{
        "id": "a",
        "type": "TEXT_FIELD",
        "validator": { "type": "REG_EXP", "format": "a)(b" },
    }]));
    assert!(matches!(&found[..], [Violation::InvalidPattern { pattern, .. }] if pattern == "a)(b"));
}

#[test]
fn script_expressions_are_compiled_up_front() {
    assert_eq!(
        violations(json!([{ "id": "a", "type": "LABEL", "validator": { "type": "SCRIPT" } }])),
        [Violation::MissingExpression]
    );

    let found = violations(json!([{
        "id": "a",
        "type": "LABEL",
        "validator": { "type": "SCRIPT", "validIf": "smoker == " },
    }]));
    assert!(matches!(&found[..], [Violation::InvalidScript { expression, .. }] if expression == "smoker == "));

    // Unknown references are only detected when the script runs.
    assert!(parse(json!([{
        "id": "a",
        "type": "LABEL",
        "validator": { "type": "SCRIPT", "validIf": "isSet(ghost)" },
    }]))
    .is_ok());
}

#[test]
fn menus_require_choices() {
    assert_eq!(
        violations(json!([{ "id": "m", "type": "MENU" }])),
        [Violation::MissingChoices]
    );
    assert_eq!(
        violations(json!([{ "id": "m", "type": "MENU_MULTI_SELECT", "choices": [] }])),
        [Violation::MissingChoices]
    );
}

#[test]
fn other_types_reject_choices() {
    assert_eq!(
        violations(json!([{ "id": "t", "type": "TEXT_FIELD", "choices": [{ "val": "A" }] }])),
        [Violation::UnexpectedChoices { count: 1 }]
    );

    // An empty list is the same as none.
    let doc = parse(json!([{ "id": "t", "type": "TEXT_FIELD", "choices": [] }])).unwrap();
    assert_eq!(doc.item("t").unwrap().choices, None);
}

#[test]
fn choice_values_are_unique_and_well_formed() {
    assert_eq!(
        violations(json!([{
            "id": "m",
            "type": "MENU",
            "choices": [{ "val": "A", "display": "A" }, { "val": "A", "display": "Again" }],
        }])),
        [Violation::DuplicateChoiceValue { val: "A".into() }]
    );

    assert_eq!(
        violations(json!([{ "id": "m", "type": "MENU", "choices": [{ "val": "A" }, { "display": "B" }] }])),
        [Violation::MalformedChoice {
            index: 1,
            reason: "'val' must be a string"
        }]
    );
}

#[test]
fn item_ids_are_checked() {
    assert_eq!(
        violations(json!([{ "id": "bad-id", "type": "TEXT_FIELD" }])),
        [Violation::InvalidItemId { id: "bad-id".into() }]
    );

    let err = parse(json!([
        { "id": "q1", "type": "TEXT_FIELD" },
        { "ref": "q1", "type": "TEXT_FIELD" },
    ]))
    .unwrap_err();
    assert_eq!(err.position, Some(1));
    assert_eq!(err.violations, [Violation::DuplicateItemId { id: "q1".into() }]);
}

#[test]
fn missing_ids_are_generated_from_text() {
    let doc = parse(json!([
        { "type": "TEXT_FIELD", "text": "Patient name" },
        { "type": "LABEL" },
        { "id": "Patient_name_1", "type": "TEXT_FIELD" },
    ]))
    .unwrap();

    let ids: Vec<_> = doc.items().iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, ["Patient_name_2", "item_1", "Patient_name_1"]);
    assert_eq!(
        doc.notes(),
        ["$[0]: generated id 'Patient_name_2'", "$[1]: generated id 'item_1'"]
    );
}

#[test]
fn names_are_case_folded_with_a_note() {
    let doc = parse(json!([{
        "id": "q1",
        "type": "text_field",
        "hints": ["same_line"],
        "flags": ["Red"],
        "validator": { "type": "mandatory" },
    }]))
    .unwrap();

    let item = doc.item("q1").unwrap();
    assert_eq!(item.item_type, ItemType::from("TEXT_FIELD"));
    assert!(item.hints.contains(&Hint::SameLine));
    assert!(item.flags.contains(&FlagColor::Red));
    assert_eq!(
        doc.notes(),
        [
            "$[0]: item type 'text_field' read as TEXT_FIELD",
            "$[0]: hint 'same_line' read as SAME_LINE",
            "$[0]: flag 'Red' read as RED",
            "$[0]: validator type 'mandatory' read as MANDATORY",
        ]
    );
}

#[test]
fn emr_fields_come_from_the_registry() {
    let doc = parse(json!([{ "id": "dob", "type": "DATE", "emrField": "birthDate" }])).unwrap();
    assert_eq!(doc.bound_to_emr("birthDate").map(|i| i.id.as_str()), Some("dob"));

    assert_eq!(
        violations(json!([{ "id": "c", "type": "TEXT_FIELD", "emrField": "favouriteColour" }])),
        [Violation::UnknownEmrField {
            name: "favouriteColour".into()
        }]
    );
}

#[test]
fn wrong_field_types_are_violations() {
    assert_eq!(
        violations(json!([{ "id": "q1", "type": "TEXT_FIELD", "hints": "SAME_LINE" }])),
        [Violation::WrongFieldType {
            field: "hints",
            expected: "an array of strings"
        }]
    );
    assert_eq!(
        violations(json!([{ "id": 7, "type": "TEXT_FIELD" }])),
        [Violation::WrongFieldType {
            field: "id",
            expected: "a string"
        }]
    );
}
