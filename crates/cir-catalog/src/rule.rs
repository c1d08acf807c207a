use std::collections::BTreeSet;

use serde::Serialize;

use cir_core::vocab::{FlagColor, Hint, ItemType, ValidatorType};

/// What one item type may declare.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaRule {
    pub item_type: ItemType,
    pub validators: BTreeSet<ValidatorType>,
    pub hints: BTreeSet<Hint>,
    pub flags: BTreeSet<FlagColor>,
    /// Choice list required (and non-empty) when `true`, forbidden otherwise.
    pub requires_choices: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SchemaRule {
    pub fn allows_validator(&self, kind: ValidatorType) -> bool {
        self.validators.contains(&kind)
    }

    pub fn allows_hint(&self, hint: Hint) -> bool {
        self.hints.contains(&hint)
    }

    pub fn allows_flag(&self, flag: FlagColor) -> bool {
        self.flags.contains(&flag)
    }
}
