use std::collections::BTreeSet;

use cir_catalog::SchemaRegistry;
use cir_core::models::item::{Choice, Item, ValidatorDefinition};
use cir_core::vocab::{FlagColor, Hint, ItemType, ValidatorType};
use cir_engine::{resolve_hints, suggest_menu_hint, suggest_validator};

fn flagged(flags: &[FlagColor]) -> Item {
    let mut item = Item::new("q1", "TEXT_FIELD");
    item.flags = flags.iter().copied().collect();
    item
}

fn menu(choices: usize, hints: &[Hint]) -> Item {
    let mut item = Item::new("m1", "MENU");
    item.choices = Some(
        (0..choices)
            .map(|i| Choice {
                val: format!("V{i}"),
                display: format!("Option {i}"),
            })
            .collect(),
    );
    item.hints = hints.iter().copied().collect();
    item
}

#[test]
fn most_severe_flag_wins() {
    assert_eq!(
        resolve_hints(&flagged(&[FlagColor::Blue, FlagColor::Red])).effective_flag,
        FlagColor::Red
    );
    assert_eq!(
        resolve_hints(&flagged(&[FlagColor::RedUnderline, FlagColor::Red])).effective_flag,
        FlagColor::Red
    );
    assert_eq!(
        resolve_hints(&flagged(&[FlagColor::Green, FlagColor::Purple, FlagColor::Yellow])).effective_flag,
        FlagColor::Yellow
    );
    assert_eq!(
        resolve_hints(&flagged(&[FlagColor::None, FlagColor::Green])).effective_flag,
        FlagColor::Green
    );
}

#[test]
fn no_flags_resolves_to_none() {
    assert_eq!(resolve_hints(&flagged(&[])).effective_flag, FlagColor::None);
}

#[test]
fn hints_pass_through_as_a_set() {
    let mut item = Item::new("q1", "TEXT_FIELD");
    item.hints = BTreeSet::from([Hint::SameLine, Hint::GreyBg]);

    let resolved = resolve_hints(&item);
    assert_eq!(resolved.effective_hints, item.hints);
}

#[test]
fn resolution_serializes_for_renderers() {
    let resolved = resolve_hints(&flagged(&[FlagColor::Orange]));
    assert_eq!(
        serde_json::to_value(&resolved).unwrap(),
        serde_json::json!({ "effectiveHints": [], "effectiveFlag": "ORANGE" })
    );
}

#[test]
fn menu_hint_suggestion_by_choice_count() {
    assert_eq!(suggest_menu_hint(&menu(2, &[])), None);
    assert_eq!(suggest_menu_hint(&menu(3, &[])), Some(Hint::UseDropdownMenu));
    assert_eq!(suggest_menu_hint(&menu(6, &[])), Some(Hint::UseDropdownMenu));
    assert_eq!(suggest_menu_hint(&menu(7, &[])), Some(Hint::UseSearchableMenu));
    assert_eq!(suggest_menu_hint(&menu(40, &[])), Some(Hint::UseSearchableMenu));
}

#[test]
fn no_suggestion_when_a_menu_style_is_declared() {
    assert_eq!(suggest_menu_hint(&menu(12, &[Hint::UseButtonsForMenu])), None);
    assert_eq!(suggest_menu_hint(&menu(12, &[Hint::SameLine])), Some(Hint::UseSearchableMenu));
}

#[test]
fn no_suggestion_for_items_without_choices() {
    assert_eq!(suggest_menu_hint(&Item::new("q1", "TEXT_FIELD")), None);
}

fn suggested(item_type: &str, text: &str) -> Option<ValidatorType> {
    let mut item = Item::new("q1", item_type);
    item.text = text.to_string();
    let rule = SchemaRegistry::builtin().lookup(&ItemType::from(item_type)).unwrap();
    suggest_validator(&item, rule)
}

#[test]
fn format_validator_suggested_from_item_text() {
    assert_eq!(suggested("TEXT_FIELD", "Your E-mail address"), Some(ValidatorType::Email));
    assert_eq!(suggested("TEXT_FIELD", "Best telephone number"), Some(ValidatorType::Phone));
    assert_eq!(suggested("TEXT_FIELD", "Cell"), Some(ValidatorType::Phone));
    assert_eq!(suggested("TEXT_FIELD", "Postal code"), Some(ValidatorType::PostalCode));
    assert_eq!(suggested("TEXT_FIELD", "ZIP"), Some(ValidatorType::PostalCode));
    assert_eq!(suggested("TEXT_FIELD", "Date of birth"), None);
}

#[test]
fn validator_suggestion_respects_the_item_type() {
    // CHECKBOX allows no format validators.
    assert_eq!(suggested("CHECKBOX", "Email me a copy"), None);
}

#[test]
fn no_validator_suggestion_when_one_is_declared() {
    let mut item = Item::new("q1", "TEXT_FIELD");
    item.text = "Email".to_string();
    item.validator = Some(ValidatorDefinition::new(ValidatorType::Mandatory));
    let rule = SchemaRegistry::builtin().lookup(&item.item_type).unwrap();
    assert_eq!(suggest_validator(&item, rule), None);
}
