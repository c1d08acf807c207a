use std::collections::HashMap;

use regex::Regex;

use cir_core::models::item::Item;
use cir_script::Script;

/// A validator compiled at parse time.
#[derive(Debug, Clone)]
pub(crate) enum Check {
    Mandatory,
    Pattern(Regex),
    Email,
    Phone,
    PostalCode,
    Script(Script),
}

/// A structurally valid document: items in display order plus their
/// compiled validators.
///
/// Lives for one validation request. Cross-item references are resolved
/// by id against this document only.
#[derive(Debug, Clone)]
pub struct Document {
    items: Vec<Item>,
    checks: Vec<Option<Check>>,
    by_id: HashMap<String, usize>,
    by_emr: HashMap<String, usize>,
    notes: Vec<String>,
}

impl Document {
    pub(crate) fn new(items: Vec<Item>, checks: Vec<Option<Check>>, notes: Vec<String>) -> Self {
        let by_id = items
            .iter()
            .enumerate()
            .map(|(i, item)| (item.id.clone(), i))
            .collect();

        let mut by_emr = HashMap::new();
        for (i, item) in items.iter().enumerate() {
            if let Some(field) = &item.emr_field {
                by_emr.entry(field.clone()).or_insert(i);
            }
        }

        Self {
            items,
            checks,
            by_id,
            by_emr,
            notes,
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, id: &str) -> Option<&Item> {
        self.position(id).map(|i| &self.items[i])
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    /// First item (in display order) bound to the EMR field `field`.
    pub fn bound_to_emr(&self, field: &str) -> Option<&Item> {
        self.by_emr.get(field).map(|&i| &self.items[i])
    }

    /// Corrections applied while normalizing, e.g. case-folded names.
    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub(crate) fn check(&self, position: usize) -> Option<&Check> {
        self.checks.get(position).and_then(Option::as_ref)
    }
}
