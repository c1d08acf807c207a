use thiserror::Error;

use cir_core::vocab::ItemType;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("catalog is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("catalog_version {found} is newer than this build supports ({supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("catalog is not a JSON object")]
    NotAnObject,

    #[error("item type declared more than once: {0}")]
    DuplicateItemType(ItemType),

    #[error("malformed rule for item type '{item_type}': {reason}")]
    MalformedRule { item_type: String, reason: String },

    #[error("EMR field declared more than once: {0}")]
    DuplicateEmrField(String),
}

/// Lookup failure against a loaded registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown item type: {0}")]
pub struct UnknownItemType(pub ItemType);
