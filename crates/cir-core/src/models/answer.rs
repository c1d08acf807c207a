use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// A submitted answer: free text, or the set of selected choice values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Text(String),
    Selection(BTreeSet<String>),
}

impl AnswerValue {
    /// Blank text and empty selections count as "no answer".
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(s) => s.trim().is_empty(),
            Self::Selection(set) => set.iter().all(|v| v.trim().is_empty()),
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// Answers keyed by item id. A JSON `null` is the same as a missing key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet(BTreeMap<String, Option<AnswerValue>>);

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: &str, value: impl Into<AnswerValue>) -> Self {
        self.insert(id, value);
        self
    }

    pub fn with_selection<I, S>(mut self, id: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set = values.into_iter().map(Into::into).collect();
        self.0.insert(id.to_string(), Some(AnswerValue::Selection(set)));
        self
    }

    pub fn insert(&mut self, id: &str, value: impl Into<AnswerValue>) {
        self.0.insert(id.to_string(), Some(value.into()));
    }

    pub fn get(&self, id: &str) -> Option<&AnswerValue> {
        self.0.get(id).and_then(Option::as_ref)
    }

    pub fn len(&self) -> usize {
        self.0.values().filter(|v| v.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
