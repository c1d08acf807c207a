//! cir-core
//!
//! Shared vocabulary of the Clinical Item Representation engine: the closed
//! enumerations (validator types, hints, flag colors), the typed item model,
//! submitted answers, and the validation report. Pure data, no engine logic.

pub mod error;
pub mod models;
pub mod vocab;
