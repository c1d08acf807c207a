//! cir-script
//!
//! The expression language behind `SCRIPT` validators: literals, references
//! to other items' answers, comparisons, short-circuit boolean operators and
//! a handful of predicates (`isSet`, `contains`, `num`).
//!
//! Scripts are compiled once ([`parse`]) and evaluated any number of times
//! against caller-supplied [`Bindings`]. Evaluation is pure, never coerces
//! between types, and is bounded by a step budget.

pub mod ast;
pub mod error;
pub mod interp;
pub mod lexer;
pub mod parser;

pub use ast::{Expr, Reference, Script};
pub use error::{EvalError, ParseError, ParseErrorKind};
pub use interp::{evaluate, Bindings, Lookup, Value, DEFAULT_MAX_STEPS};
pub use parser::{parse, Limits};
