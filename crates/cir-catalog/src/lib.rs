//! cir-catalog
//!
//! The schema registry: which validators, hints and flags each item type
//! may declare, and whether it carries a choice list. Legality rules are
//! data loaded from a catalog file, never compiled-in branches, so adding an
//! item type is a catalog edit.
//!
//! A registry is immutable once built. Share it by reference (or through a
//! [`RegistryHandle`] when it must be replaced at runtime).

pub mod config;
pub mod error;
pub mod rule;

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use cir_core::vocab::ItemType;

use config::CatalogConfig;
use error::{ConfigError, UnknownItemType};
use rule::SchemaRule;

const BUILTIN_CATALOG: &str = include_str!("../catalog/default.json");

#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    rules: HashMap<ItemType, SchemaRule>,
    emr_fields: BTreeSet<String>,
}

impl SchemaRegistry {
    /// Build a registry from a parsed catalog, rejecting duplicates and
    /// names outside the closed vocabularies.
    pub fn from_config(config: CatalogConfig) -> Result<Self, ConfigError> {
        let mut rules = HashMap::with_capacity(config.item_types.len());
        for raw in config.item_types {
            let rule = raw.into_rule()?;
            if rules.contains_key(&rule.item_type) {
                return Err(ConfigError::DuplicateItemType(rule.item_type));
            }
            rules.insert(rule.item_type.clone(), rule);
        }

        let mut emr_fields = BTreeSet::new();
        for field in config.emr_fields {
            if !emr_fields.insert(field.clone()) {
                return Err(ConfigError::DuplicateEmrField(field));
            }
        }

        tracing::debug!(
            item_types = rules.len(),
            emr_fields = emr_fields.len(),
            "schema registry built"
        );
        Ok(Self { rules, emr_fields })
    }

    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        Self::from_config(CatalogConfig::from_json(contents)?)
    }

    /// The catalog shipped with this build.
    ///
    /// # Panics
    ///
    /// Panics if the embedded catalog fails to load. The catalog is compiled
    /// into the binary, so a panic indicates a packaging bug.
    pub fn builtin() -> &'static SchemaRegistry {
        static BUILTIN: LazyLock<SchemaRegistry> = LazyLock::new(|| {
            SchemaRegistry::from_json(BUILTIN_CATALOG)
                .unwrap_or_else(|e| panic!("embedded catalog is invalid: {e}"))
        });
        &BUILTIN
    }

    pub fn lookup(&self, item_type: &ItemType) -> Result<&SchemaRule, UnknownItemType> {
        self.rules
            .get(item_type)
            .ok_or_else(|| UnknownItemType(item_type.clone()))
    }

    pub fn contains(&self, item_type: &ItemType) -> bool {
        self.rules.contains_key(item_type)
    }

    /// Rules sorted by item type name.
    pub fn rules(&self) -> Vec<&SchemaRule> {
        let mut rules: Vec<_> = self.rules.values().collect();
        rules.sort_by(|a, b| a.item_type.cmp(&b.item_type));
        rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn is_emr_field(&self, name: &str) -> bool {
        self.emr_fields.contains(name)
    }

    pub fn emr_fields(&self) -> impl Iterator<Item = &str> {
        self.emr_fields.iter().map(String::as_str)
    }
}

/// Holder for the process-wide active registry.
///
/// Readers take an `Arc` snapshot and keep it for a whole validation pass;
/// [`RegistryHandle::swap`] replaces the registry for later snapshots only.
#[derive(Debug)]
pub struct RegistryHandle {
    current: RwLock<Arc<SchemaRegistry>>,
}

impl RegistryHandle {
    pub fn new(registry: SchemaRegistry) -> Self {
        Self {
            current: RwLock::new(Arc::new(registry)),
        }
    }

    pub fn snapshot(&self) -> Arc<SchemaRegistry> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Install `next` and return the registry it replaced.
    pub fn swap(&self, next: SchemaRegistry) -> Arc<SchemaRegistry> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let previous = std::mem::replace(&mut *guard, Arc::new(next));
        tracing::info!(item_types = guard.len(), "schema registry swapped");
        previous
    }
}
