use serde::Serialize;
use thiserror::Error;

/// Compile-time failure, located by byte offset into the source.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{kind} at offset {offset}")]
pub struct ParseError {
    pub offset: usize,
    pub kind: ParseErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum ParseErrorKind {
    #[error("empty expression")]
    Empty,

    #[error("expression longer than {limit} bytes")]
    TooLong { limit: usize },

    #[error("expression nested deeper than {limit} levels")]
    TooDeep { limit: usize },

    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("backquoted reference must be an item id followed by '`'")]
    UnterminatedReference,

    #[error("invalid number literal '{0}'")]
    InvalidNumber(String),

    #[error("expected {expected}, found {found}")]
    Expected {
        expected: &'static str,
        found: String,
    },

    #[error("comparison operators cannot be chained")]
    ChainedComparison,

    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("'{function}' takes {expected} argument(s)")]
    Arity {
        function: &'static str,
        expected: usize,
    },
}

impl ParseError {
    pub(crate) fn new(offset: usize, kind: ParseErrorKind) -> Self {
        Self { offset, kind }
    }
}

/// Runtime failure of one script evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("unknown reference: {0}")]
    UnknownReference(String),

    #[error("type error: {0}")]
    Type(String),

    #[error("step budget of {limit} exceeded")]
    BudgetExceeded { limit: u32 },
}
