use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "UPPERCASE")]
#[ts(export)]
pub enum Status {
    Ok,
    Fail,
}

/// Why an item's runtime validator failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum FailureKind {
    MissingRequiredValue,
    PatternMismatch,
    InvalidEmail,
    InvalidPhone,
    InvalidPostalCode,
    /// The SCRIPT expression evaluated to `false`.
    ScriptConditionFalse,
    UnknownReference,
    ScriptTypeError,
    ScriptBudgetExceeded,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingRequiredValue => "MissingRequiredValue",
            Self::PatternMismatch => "PatternMismatch",
            Self::InvalidEmail => "InvalidEmail",
            Self::InvalidPhone => "InvalidPhone",
            Self::InvalidPostalCode => "InvalidPostalCode",
            Self::ScriptConditionFalse => "ScriptConditionFalse",
            Self::UnknownReference => "UnknownReference",
            Self::ScriptTypeError => "ScriptTypeError",
            Self::ScriptBudgetExceeded => "ScriptBudgetExceeded",
        }
    }

    /// Interpreter faults, as opposed to a condition that simply did not hold.
    pub fn is_script_error(self) -> bool {
        matches!(
            self,
            Self::UnknownReference | Self::ScriptTypeError | Self::ScriptBudgetExceeded
        )
    }
}

/// Runtime outcome for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ItemOutcome {
    pub id: String,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    /// Author message when configured, otherwise the failure kind's name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Interpreter detail for script faults (e.g. the unresolved reference).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ItemOutcome {
    pub fn ok(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: Status::Ok,
            failure: None,
            message: None,
            detail: None,
        }
    }

    pub fn fail(id: impl Into<String>, failure: FailureKind, message: Option<&str>) -> Self {
        Self {
            id: id.into(),
            status: Status::Fail,
            failure: Some(failure),
            message: Some(message.unwrap_or(failure.as_str()).to_string()),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }
}

/// Runtime validation report, items in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Report {
    pub status: Status,
    pub items: Vec<ItemOutcome>,
    /// Corrections the normalizer applied while reading the document.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl Report {
    pub fn from_outcomes(items: Vec<ItemOutcome>, notes: Vec<String>) -> Self {
        let status = if items.iter().all(ItemOutcome::is_ok) {
            Status::Ok
        } else {
            Status::Fail
        };
        Self {
            status,
            items,
            notes,
        }
    }

    pub fn outcome(&self, id: &str) -> Option<&ItemOutcome> {
        self.items.iter().find(|o| o.id == id)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.items.iter().filter(|o| !o.is_ok())
    }
}
