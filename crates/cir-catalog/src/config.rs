//! On-disk catalog format and its migrations.
//!
//! Catalog files are JSON:
//!
//! ```json
//! {
//!   "catalog_version": 1,
//!   "item_types": [
//!     { "type": "TEXT_FIELD", "validators": ["MANDATORY"], "hints": [],
//!       "flags": ["NONE", "RED"], "requires_choices": false }
//!   ],
//!   "emr_fields": ["firstName"]
//! }
//! ```
//!
//! `item_types` is a list rather than a map so a type declared twice is
//! reported instead of silently overwritten.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use cir_core::vocab::{FlagColor, Hint, ItemType, ValidatorType};

use crate::error::ConfigError;
use crate::rule::SchemaRule;

/// Current catalog version. Bump this when changing shape; each bump needs a
/// step in [`migrate`].
pub const CURRENT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub catalog_version: u32,
    pub item_types: Vec<RuleConfig>,
    #[serde(default)]
    pub emr_fields: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(default)]
    pub validators: Vec<String>,
    #[serde(default)]
    pub hints: Vec<String>,
    #[serde(default)]
    pub flags: Vec<String>,
    #[serde(default)]
    pub requires_choices: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CatalogConfig {
    /// Parse a catalog document, migrating older versions first.
    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        let json: Value = serde_json::from_str(contents)?;
        let on_disk_version = json
            .get("catalog_version")
            .and_then(Value::as_u64)
            .unwrap_or(0) as u32;

        let migrated = migrate(json, on_disk_version)?;
        Ok(serde_json::from_value(migrated)?)
    }
}

/// Run sequential migrations from `from_version` up to [`CURRENT_VERSION`].
fn migrate(mut json: Value, from_version: u32) -> Result<Value, ConfigError> {
    if from_version > CURRENT_VERSION {
        return Err(ConfigError::UnsupportedVersion {
            found: from_version,
            supported: CURRENT_VERSION,
        });
    }

    // v0 → v1: `choices_required` renamed to `requires_choices`; `emr_fields` added.
    if from_version < 1 {
        let obj = json.as_object_mut().ok_or(ConfigError::NotAnObject)?;
        if let Some(Value::Array(rules)) = obj.get_mut("item_types") {
            for rule in rules.iter_mut().filter_map(Value::as_object_mut) {
                if let Some(flag) = rule.remove("choices_required") {
                    rule.entry("requires_choices").or_insert(flag);
                }
            }
        }
        obj.entry("emr_fields")
            .or_insert_with(|| Value::Array(Vec::new()));
        obj.insert("catalog_version".to_string(), Value::Number(1.into()));
        tracing::info!("migrated catalog v0 → v1");
    }

    Ok(json)
}

impl RuleConfig {
    /// Check every name against the closed vocabularies. Catalog files must
    /// use exact spelling; no case folding here.
    pub(crate) fn into_rule(self) -> Result<SchemaRule, ConfigError> {
        let item_type = self.item_type.trim().to_string();
        if item_type.is_empty() {
            return Err(ConfigError::MalformedRule {
                item_type: self.item_type,
                reason: "item type name is empty".to_string(),
            });
        }
        if item_type != item_type.to_ascii_uppercase() {
            return Err(ConfigError::MalformedRule {
                item_type,
                reason: "item type names must be upper-case".to_string(),
            });
        }

        let validators: BTreeSet<ValidatorType> = parse_names(&item_type, "validator", &self.validators)?;
        let hints: BTreeSet<Hint> = parse_names(&item_type, "hint", &self.hints)?;
        let flags: BTreeSet<FlagColor> = parse_names(&item_type, "flag", &self.flags)?;

        Ok(SchemaRule {
            item_type: ItemType::new(item_type),
            validators,
            hints,
            flags,
            requires_choices: self.requires_choices,
            description: self.description,
        })
    }
}

fn parse_names<T>(item_type: &str, what: &str, names: &[String]) -> Result<BTreeSet<T>, ConfigError>
where
    T: std::str::FromStr + Ord,
{
    let mut out = BTreeSet::new();
    for name in names {
        let parsed = name.parse::<T>().map_err(|_| ConfigError::MalformedRule {
            item_type: item_type.to_string(),
            reason: format!("unknown {what} '{name}'"),
        })?;
        if !out.insert(parsed) {
            tracing::warn!(item_type, name = %name, "{what} listed twice in catalog rule");
        }
    }
    Ok(out)
}
