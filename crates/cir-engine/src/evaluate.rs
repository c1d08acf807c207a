use tracing::debug;

use cir_catalog::SchemaRegistry;
use cir_core::models::answer::{AnswerSet, AnswerValue};
use cir_core::models::item::ValidatorDefinition;
use cir_core::models::report::{FailureKind, ItemOutcome};
use cir_script::{Bindings, EvalError, Lookup, Reference, Value};

use crate::document::{Check, Document};
use crate::formats;

/// Read-only view of one request's answers, as seen by SCRIPT validators.
pub(crate) struct AnswerBindings<'a> {
    pub document: &'a Document,
    pub answers: &'a AnswerSet,
    pub registry: &'a SchemaRegistry,
}

impl AnswerBindings<'_> {
    fn answer(&self, id: &str) -> Lookup {
        match self.answers.get(id) {
            Some(AnswerValue::Text(s)) => Lookup::Value(Value::Str(s.clone())),
            Some(AnswerValue::Selection(set)) => Lookup::Value(Value::Set(set.clone())),
            None => Lookup::Unset,
        }
    }
}

impl Bindings for AnswerBindings<'_> {
    fn lookup(&self, reference: &Reference) -> Lookup {
        match reference {
            Reference::Item(id) if self.document.item(id).is_some() => self.answer(id),
            Reference::Item(_) => Lookup::Unknown,
            Reference::Emr(field) if !self.registry.is_emr_field(field) => Lookup::Unknown,
            Reference::Emr(field) => match self.document.bound_to_emr(field) {
                Some(item) => self.answer(&item.id),
                None => Lookup::Unset,
            },
        }
    }
}

/// Run the validator of the item at `position`. Items without one pass.
pub(crate) fn evaluate_item(bindings: &AnswerBindings<'_>, position: usize, max_steps: u32) -> ItemOutcome {
    let item = &bindings.document.items()[position];
    let Some(check) = bindings.document.check(position) else {
        return ItemOutcome::ok(&item.id);
    };

    let definition = item.validator.as_ref();
    let message = definition.and_then(ValidatorDefinition::message);
    let allow_empty = definition.is_none_or(ValidatorDefinition::allow_empty);
    let answer = bindings.answers.get(&item.id).filter(|a| !a.is_blank());
    let format = FormatAnswer {
        id: &item.id,
        answer,
        allow_empty,
        message,
    };

    let outcome = match check {
        Check::Mandatory => match answer {
            Some(_) => ItemOutcome::ok(&item.id),
            None => ItemOutcome::fail(&item.id, FailureKind::MissingRequiredValue, message),
        },
        Check::Script(script) => match cir_script::evaluate(script, bindings, max_steps) {
            Ok(true) => ItemOutcome::ok(&item.id),
            Ok(false) => ItemOutcome::fail(&item.id, FailureKind::ScriptConditionFalse, message),
            Err(e) => ItemOutcome::fail(&item.id, script_failure(&e), None).with_detail(e.to_string()),
        },
        Check::Pattern(regex) => format.check(FailureKind::PatternMismatch, |v| regex.is_match(v)),
        Check::Email => format.check(FailureKind::InvalidEmail, formats::is_email),
        Check::Phone => format.check(FailureKind::InvalidPhone, formats::is_phone),
        Check::PostalCode => format.check(FailureKind::InvalidPostalCode, formats::is_postal_code),
    };

    debug!(item_id = %item.id, position, ok = outcome.is_ok(), "item evaluated");
    outcome
}

/// An answer headed for one of the format validators.
struct FormatAnswer<'a> {
    id: &'a str,
    /// `None` when absent or blank.
    answer: Option<&'a AnswerValue>,
    allow_empty: bool,
    message: Option<&'a str>,
}

impl FormatAnswer<'_> {
    /// Text answers are matched whole; for selections every chosen value
    /// must match.
    fn check(&self, kind: FailureKind, matches: impl Fn(&str) -> bool) -> ItemOutcome {
        let passes = match self.answer {
            None => self.allow_empty,
            Some(AnswerValue::Text(s)) => matches(s),
            Some(AnswerValue::Selection(set)) => set
                .iter()
                .filter(|v| !v.trim().is_empty())
                .all(|v| matches(v)),
        };
        match (passes, self.answer) {
            (true, _) => ItemOutcome::ok(self.id),
            (false, None) => ItemOutcome::fail(self.id, FailureKind::MissingRequiredValue, self.message),
            (false, Some(_)) => ItemOutcome::fail(self.id, kind, self.message),
        }
    }
}

fn script_failure(error: &EvalError) -> FailureKind {
    match error {
        EvalError::UnknownReference(_) => FailureKind::UnknownReference,
        EvalError::Type(_) => FailureKind::ScriptTypeError,
        EvalError::BudgetExceeded { .. } => FailureKind::ScriptBudgetExceeded,
    }
}
