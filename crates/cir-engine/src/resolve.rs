use cir_catalog::rule::SchemaRule;
use cir_core::models::item::Item;
use cir_core::models::presentation::ResolvedHints;
use cir_core::vocab::{FlagColor, Hint, ValidatorType};

/// Choice count from which a searchable menu reads better than a dropdown.
const SEARCHABLE_MENU_MIN: usize = 7;
const DROPDOWN_MENU_MIN: usize = 3;

/// Item-text keywords that suggest a format validator, checked in order.
const VALIDATOR_KEYWORDS: [(ValidatorType, &[&str]); 3] = [
    (ValidatorType::Email, &["email", "e-mail"]),
    (ValidatorType::Phone, &["phone", "telephone", "cell"]),
    (ValidatorType::PostalCode, &["postal", "zip"]),
];

/// Presentation attributes for one item.
///
/// Hints are independent toggles, so the effective set is the declared set.
/// When several flag colors are declared the most severe one wins, in the
/// order `RED > RED_UNDERLINE > ORANGE > YELLOW > PURPLE > BLUE > GREEN >
/// NONE`; no flags resolves to `NONE`.
pub fn resolve_hints(item: &Item) -> ResolvedHints {
    ResolvedHints {
        effective_hints: item.hints.clone(),
        effective_flag: item.flags.iter().min().copied().unwrap_or(FlagColor::None),
    }
}

/// Advisory menu style for a menu item that declares none. Never applied
/// by the engine itself.
pub fn suggest_menu_hint(item: &Item) -> Option<Hint> {
    let count = item.choices.as_ref()?.len();
    if Hint::MENU_STYLES.iter().any(|h| item.hints.contains(h)) {
        return None;
    }
    match count {
        n if n >= SEARCHABLE_MENU_MIN => Some(Hint::UseSearchableMenu),
        n if n >= DROPDOWN_MENU_MIN => Some(Hint::UseDropdownMenu),
        _ => None,
    }
}

/// Advisory format validator for an item that declares none, read from
/// its text. Only validators `rule` allows are suggested.
pub fn suggest_validator(item: &Item, rule: &SchemaRule) -> Option<ValidatorType> {
    if item.validator.is_some() {
        return None;
    }
    let text = item.text.to_lowercase();
    VALIDATOR_KEYWORDS
        .iter()
        .find(|(kind, keywords)| rule.allows_validator(*kind) && keywords.iter().any(|k| text.contains(k)))
        .map(|(kind, _)| *kind)
}
