use serde::Serialize;
use thiserror::Error;

use cir_core::vocab::{FlagColor, Hint, ValidatorType};
use cir_script::ParseError;

/// A document failed structural conformance. Fatal for the whole document:
/// it carries every problem found on the first offending entry.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{path}: {}", summarize(.violations))]
pub struct SchemaViolation {
    /// Display-order index of the offending item; `None` when the problem
    /// is with the document as a whole or with a section entry.
    pub position: Option<usize>,
    /// JSON path of the offending entry, e.g. `$[3]` or `$.sections[0].items[2]`.
    pub path: String,
    pub item_id: Option<String>,
    pub violations: Vec<Violation>,
}

fn summarize(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "code")]
pub enum Violation {
    #[error("document must be an array of entries or an object with 'sections': {reason}")]
    MalformedDocument { reason: String },

    #[error("entry is not a JSON object")]
    NotAnObject,

    #[error("unknown entry kind '{kind}'")]
    UnknownKind { kind: String },

    #[error("missing required field '{field}'")]
    MissingField { field: &'static str },

    #[error("field '{field}' must be {expected}")]
    WrongFieldType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("sections nested deeper than {limit} levels")]
    SectionTooDeep { limit: usize },

    #[error("unknown item type '{name}'")]
    UnknownItemType { name: String },

    #[error("item id '{id}' may only contain letters, digits and '_'")]
    InvalidItemId { id: String },

    #[error("item id '{id}' is used more than once")]
    DuplicateItemId { id: String },

    #[error("unknown validator type '{name}'")]
    UnknownValidatorType { name: String },

    #[error("validator {validator} is not allowed for this item type")]
    ValidatorNotAllowed { validator: ValidatorType },

    #[error("REG_EXP validator needs a 'format' pattern")]
    MissingPattern,

    #[error("REG_EXP pattern '{pattern}' does not compile: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("SCRIPT validator needs a 'validIf' expression")]
    MissingExpression,

    #[error("SCRIPT expression '{expression}' is invalid: {error}")]
    InvalidScript {
        expression: String,
        error: ParseError,
    },

    #[error("unknown hint '{name}'")]
    UnknownHint { name: String },

    #[error("hint {hint} is not allowed for this item type")]
    HintNotAllowed { hint: Hint },

    #[error("unknown flag color '{name}'")]
    UnknownFlag { name: String },

    #[error("flag {flag} is not allowed for this item type")]
    FlagNotAllowed { flag: FlagColor },

    #[error("item type requires a non-empty choice list")]
    MissingChoices,

    #[error("item type does not take choices ({count} given)")]
    UnexpectedChoices { count: usize },

    #[error("choice {index} is malformed: {reason}")]
    MalformedChoice { index: usize, reason: &'static str },

    #[error("choice value '{val}' appears more than once")]
    DuplicateChoiceValue { val: String },

    #[error("unknown EMR field '{name}'")]
    UnknownEmrField { name: String },
}
