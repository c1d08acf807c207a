//! cir-engine
//!
//! Validates clinical intake documents. A raw JSON document is normalized
//! against a [`SchemaRegistry`] into a [`Document`] (structural violations
//! are fatal), then each item's runtime validator is run against an
//! [`AnswerSet`] and the outcomes are folded into a [`Report`].
//!
//! The engine never mutates the registry, the document or the answers, so
//! one registry can serve any number of concurrent validations.

pub mod document;
pub mod error;
mod evaluate;
pub mod formats;
mod normalize;
pub mod options;
mod resolve;

use serde_json::Value;
use tracing::info;

use cir_catalog::SchemaRegistry;
use cir_core::models::answer::AnswerSet;
use cir_core::models::report::Report;

pub use document::Document;
pub use error::{SchemaViolation, Violation};
pub use options::EngineOptions;
pub use resolve::{resolve_hints, suggest_menu_hint, suggest_validator};

use evaluate::{evaluate_item, AnswerBindings};

/// A registry plus resource limits. Cheap to build; borrow one per request
/// or share it across threads.
#[derive(Debug, Clone, Copy)]
pub struct Engine<'r> {
    registry: &'r SchemaRegistry,
    options: EngineOptions,
}

impl<'r> Engine<'r> {
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Self::with_options(registry, EngineOptions::default())
    }

    pub fn with_options(registry: &'r SchemaRegistry, options: EngineOptions) -> Self {
        Self { registry, options }
    }

    pub fn registry(&self) -> &'r SchemaRegistry {
        self.registry
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Normalize a raw document. Fails on the first entry that does not
    /// conform to the registry.
    pub fn parse(&self, raw: &Value) -> Result<Document, SchemaViolation> {
        normalize::normalize(raw, self.registry, &self.options)
    }

    /// Run every item's validator against `answers`. Answers for ids the
    /// document does not contain are ignored.
    pub fn validate(&self, document: &Document, answers: &AnswerSet) -> Report {
        let bindings = AnswerBindings {
            document,
            answers,
            registry: self.registry,
        };
        let outcomes = (0..document.len())
            .map(|position| evaluate_item(&bindings, position, self.options.max_script_steps))
            .collect();
        let report = Report::from_outcomes(outcomes, document.notes().to_vec());

        info!(
            items = report.items.len(),
            failures = report.failures().count(),
            status = ?report.status,
            "document validated"
        );
        report
    }

    /// Parse then validate.
    pub fn validate_document(&self, raw: &Value, answers: &AnswerSet) -> Result<Report, SchemaViolation> {
        let document = self.parse(raw)?;
        Ok(self.validate(&document, answers))
    }
}

/// [`Engine::validate_document`] with default options.
pub fn validate_document(
    registry: &SchemaRegistry,
    raw: &Value,
    answers: &AnswerSet,
) -> Result<Report, SchemaViolation> {
    Engine::new(registry).validate_document(raw, answers)
}
