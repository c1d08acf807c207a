use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::vocab::{FlagColor, Hint, ItemType, ValidatorType};

/// One entry of a menu's choice list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Stored answer value. Unique within one item.
    pub val: String,
    #[serde(default)]
    pub display: String,
}

/// A declared runtime validator: `{type, ...params}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatorDefinition {
    #[serde(rename = "type")]
    pub kind: ValidatorType,
    #[serde(flatten)]
    pub params: BTreeMap<String, Value>,
}

impl ValidatorDefinition {
    pub fn new(kind: ValidatorType) -> Self {
        Self {
            kind,
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    fn str_param(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .find_map(|k| self.params.get(*k).and_then(Value::as_str))
    }

    /// `REG_EXP` pattern (`format` in authored documents, `pattern` also accepted).
    pub fn pattern(&self) -> Option<&str> {
        self.str_param(&["format", "pattern"])
    }

    /// `SCRIPT` expression (`validIf` in authored documents, `expression` also accepted).
    pub fn expression(&self) -> Option<&str> {
        self.str_param(&["validIf", "expression"])
    }

    /// Author-supplied failure message.
    pub fn message(&self) -> Option<&str> {
        self.str_param(&["message"])
    }

    /// Whether format validators accept an absent or blank answer. Defaults to `true`.
    pub fn allow_empty(&self) -> bool {
        self.params
            .get("allowEmpty")
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }
}

/// A normalized form item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub hints: BTreeSet<Hint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validator: Option<ValidatorDefinition>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub flags: BTreeSet<FlagColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Choice>>,
    /// EMR field this item is bound to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emr_field: Option<String>,
    /// Ref (or header) of the enclosing section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

impl Item {
    pub fn new(id: impl Into<String>, item_type: impl Into<ItemType>) -> Self {
        Self {
            id: id.into(),
            item_type: item_type.into(),
            text: String::new(),
            hints: BTreeSet::new(),
            validator: None,
            flags: BTreeSet::new(),
            choices: None,
            emr_field: None,
            section: None,
        }
    }

    pub fn choice_count(&self) -> usize {
        self.choices.as_ref().map_or(0, Vec::len)
    }
}
