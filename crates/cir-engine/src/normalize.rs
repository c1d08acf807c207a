//! Raw JSON → typed [`Document`], checked against the schema registry.
//!
//! Every violation on an entry is collected, but the first offending entry
//! aborts the whole document. Hint and flag lists become sets; item order
//! is preserved.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde_json::{Map, Value};
use tracing::debug;

use cir_catalog::SchemaRegistry;
use cir_catalog::rule::SchemaRule;
use cir_core::models::item::{Choice, Item, ValidatorDefinition};
use cir_core::vocab::{FlagColor, Hint, ItemType, ValidatorType};

use crate::document::{Check, Document};
use crate::error::{SchemaViolation, Violation};
use crate::formats;
use crate::options::EngineOptions;

/// Longest generated item id stem.
const GENERATED_ID_STEM: usize = 24;

pub fn normalize(
    raw: &Value,
    registry: &SchemaRegistry,
    options: &EngineOptions,
) -> Result<Document, SchemaViolation> {
    let (entries, base) = top_level_entries(raw)?;

    let mut normalizer = Normalizer {
        registry,
        options,
        items: Vec::new(),
        checks: Vec::new(),
        notes: Vec::new(),
        seen_ids: HashSet::new(),
        pending_ids: Vec::new(),
    };
    normalizer.walk(entries, &base, None, 0)?;
    normalizer.assign_generated_ids();

    debug!(
        items = normalizer.items.len(),
        notes = normalizer.notes.len(),
        "document normalized"
    );
    Ok(Document::new(
        normalizer.items,
        normalizer.checks,
        normalizer.notes,
    ))
}

fn top_level_entries(raw: &Value) -> Result<(&[Value], String), SchemaViolation> {
    match raw {
        Value::Array(entries) => Ok((entries.as_slice(), "$".to_string())),
        Value::Object(obj) => {
            for key in ["sections", "items"] {
                match obj.get(key) {
                    Some(Value::Array(entries)) => return Ok((entries.as_slice(), format!("$.{key}"))),
                    Some(_) => return Err(malformed(format!("'{key}' is not an array"))),
                    None => {}
                }
            }
            Err(malformed("object has no 'sections' array".to_string()))
        }
        other => Err(malformed(format!("found {}", json_type(other)))),
    }
}

fn malformed(reason: String) -> SchemaViolation {
    SchemaViolation {
        position: None,
        path: "$".to_string(),
        item_id: None,
        violations: vec![Violation::MalformedDocument { reason }],
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

enum EntryKind {
    Item,
    Section,
}

/// Entries without `kind` are sections when they hold `items` and no `type`.
fn entry_kind(obj: &Map<String, Value>) -> Result<EntryKind, Violation> {
    match obj.get("kind") {
        Some(Value::String(kind)) if kind.eq_ignore_ascii_case("item") => Ok(EntryKind::Item),
        Some(Value::String(kind)) if kind.eq_ignore_ascii_case("section") => Ok(EntryKind::Section),
        Some(Value::String(kind)) => Err(Violation::UnknownKind { kind: kind.clone() }),
        Some(_) => Err(Violation::WrongFieldType {
            field: "kind",
            expected: "a string",
        }),
        None if obj.contains_key("items") && !obj.contains_key("type") => Ok(EntryKind::Section),
        None => Ok(EntryKind::Item),
    }
}

struct Normalizer<'a> {
    registry: &'a SchemaRegistry,
    options: &'a EngineOptions,
    items: Vec<Item>,
    checks: Vec<Option<Check>>,
    notes: Vec<String>,
    seen_ids: HashSet<String>,
    /// Positions and paths of items that arrived without an id.
    pending_ids: Vec<(usize, String)>,
}

impl<'a> Normalizer<'a> {
    fn walk(
        &mut self,
        entries: &[Value],
        base: &str,
        section: Option<&str>,
        depth: usize,
    ) -> Result<(), SchemaViolation> {
        for (i, entry) in entries.iter().enumerate() {
            let path = format!("{base}[{i}]");
            let Some(obj) = entry.as_object() else {
                return Err(self.reject(&path, Some(self.items.len()), None, vec![Violation::NotAnObject]));
            };
            match entry_kind(obj) {
                Ok(EntryKind::Section) => self.section(obj, &path, depth)?,
                Ok(EntryKind::Item) => self.item(obj, &path, section)?,
                Err(violation) => return Err(self.reject(&path, None, None, vec![violation])),
            }
        }
        Ok(())
    }

    fn section(&mut self, obj: &Map<String, Value>, path: &str, depth: usize) -> Result<(), SchemaViolation> {
        let limit = self.options.max_section_depth;
        if depth + 1 > limit {
            return Err(self.reject(path, None, None, vec![Violation::SectionTooDeep { limit }]));
        }

        let name = ["ref", "header"]
            .iter()
            .find_map(|k| obj.get(*k).and_then(Value::as_str))
            .map(str::to_string);

        let mut violations = Vec::new();
        self.section_presentation(obj, path, &mut violations);

        let children = match obj.get("items") {
            None | Some(Value::Null) => None,
            Some(Value::Array(children)) => Some(children),
            Some(_) => {
                violations.push(Violation::WrongFieldType {
                    field: "items",
                    expected: "an array",
                });
                None
            }
        };
        if !violations.is_empty() {
            return Err(self.reject(path, None, None, violations));
        }

        match children {
            Some(children) => self.walk(children, &format!("{path}.items"), name.as_deref(), depth + 1),
            None => Ok(()),
        }
    }

    /// Section hints and `attributes.flag` are checked against the
    /// vocabularies only; no item-type rule applies to a section.
    fn section_presentation(&mut self, obj: &Map<String, Value>, path: &str, violations: &mut Vec<Violation>) {
        for name in string_list(obj.get("hints"), "hints", violations) {
            match Hint::parse_lenient(name) {
                Some(parsed) if parsed.corrected => self.note(path, "section hint", name, parsed.value.as_str()),
                Some(_) => {}
                None => violations.push(Violation::UnknownHint {
                    name: name.to_string(),
                }),
            }
        }

        match obj.get("attributes") {
            None | Some(Value::Null) => {}
            Some(Value::Object(attributes)) => {
                self.flag_name(attributes.get("flag"), "flag", "section flag", path, violations);
            }
            Some(_) => violations.push(Violation::WrongFieldType {
                field: "attributes",
                expected: "an object",
            }),
        }
    }

    /// A single optional flag color that is checked but not kept.
    fn flag_name(
        &mut self,
        value: Option<&Value>,
        field: &'static str,
        what: &str,
        path: &str,
        violations: &mut Vec<Violation>,
    ) {
        match value {
            None | Some(Value::Null) => {}
            Some(Value::String(name)) => match FlagColor::parse_lenient(name) {
                Some(parsed) if parsed.corrected => self.note(path, what, name, parsed.value.as_str()),
                Some(_) => {}
                None => violations.push(Violation::UnknownFlag { name: name.clone() }),
            },
            Some(_) => violations.push(Violation::WrongFieldType {
                field,
                expected: "a string",
            }),
        }
    }

    fn reject(
        &self,
        path: &str,
        position: Option<usize>,
        item_id: Option<String>,
        violations: Vec<Violation>,
    ) -> SchemaViolation {
        debug!(path, violations = violations.len(), "document rejected");
        SchemaViolation {
            position,
            path: path.to_string(),
            item_id,
            violations,
        }
    }

    fn note(&mut self, path: &str, what: &str, from: &str, to: &str) {
        self.notes.push(format!("{path}: {what} '{from}' read as {to}"));
    }

    fn item(&mut self, obj: &Map<String, Value>, path: &str, section: Option<&str>) -> Result<(), SchemaViolation> {
        let registry = self.registry;
        let position = self.items.len();
        let mut violations = Vec::new();

        let id = self.item_id(obj, &mut violations);

        let (item_type, rule) = match obj.get("type") {
            Some(Value::String(name)) => {
                let canonical = ItemType::canonical(name);
                if canonical.as_str() != name.as_str() {
                    self.note(path, "item type", name, canonical.as_str());
                }
                match registry.lookup(&canonical) {
                    Ok(rule) => (canonical, Some(rule)),
                    Err(_) => {
                        violations.push(Violation::UnknownItemType { name: name.clone() });
                        (canonical, None)
                    }
                }
            }
            None | Some(Value::Null) => {
                violations.push(Violation::MissingField { field: "type" });
                (ItemType::new(""), None)
            }
            Some(_) => {
                violations.push(Violation::WrongFieldType {
                    field: "type",
                    expected: "a string",
                });
                (ItemType::new(""), None)
            }
        };

        let text = match obj.get("text") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(_) => {
                violations.push(Violation::WrongFieldType {
                    field: "text",
                    expected: "a string",
                });
                String::new()
            }
        };

        let hints = self.hints(obj, rule, path, &mut violations);
        let flags = self.flags(obj, rule, path, &mut violations);
        self.flag_name(obj.get("negFlag"), "negFlag", "negFlag", path, &mut violations);
        let (validator, check) = self.validator(obj, rule, path, &mut violations);
        let choices = self.choices(obj, rule, &mut violations);

        let emr_field = match obj.get("emrField") {
            None | Some(Value::Null) => None,
            Some(Value::String(name)) => {
                if !registry.is_emr_field(name) {
                    violations.push(Violation::UnknownEmrField { name: name.clone() });
                }
                Some(name.clone())
            }
            Some(_) => {
                violations.push(Violation::WrongFieldType {
                    field: "emrField",
                    expected: "a string",
                });
                None
            }
        };

        if !violations.is_empty() {
            return Err(self.reject(path, Some(position), id, violations));
        }

        if id.is_none() {
            self.pending_ids.push((position, path.to_string()));
        }
        self.items.push(Item {
            id: id.unwrap_or_default(),
            item_type,
            text,
            hints,
            validator,
            flags,
            choices,
            emr_field,
            section: section.map(str::to_string),
        });
        self.checks.push(check);
        Ok(())
    }

    fn item_id(&mut self, obj: &Map<String, Value>, violations: &mut Vec<Violation>) -> Option<String> {
        let raw = match obj.get("id") {
            None | Some(Value::Null) => obj.get("ref"),
            some => some,
        };
        match raw {
            None | Some(Value::Null) => None,
            Some(Value::String(id)) => {
                if !is_valid_id(id) {
                    violations.push(Violation::InvalidItemId { id: id.clone() });
                } else if !self.seen_ids.insert(id.clone()) {
                    violations.push(Violation::DuplicateItemId { id: id.clone() });
                }
                Some(id.clone())
            }
            Some(_) => {
                violations.push(Violation::WrongFieldType {
                    field: "id",
                    expected: "a string",
                });
                None
            }
        }
    }

    fn hints(
        &mut self,
        obj: &Map<String, Value>,
        rule: Option<&SchemaRule>,
        path: &str,
        violations: &mut Vec<Violation>,
    ) -> BTreeSet<Hint> {
        let mut hints = BTreeSet::new();
        for name in string_list(obj.get("hints"), "hints", violations) {
            let Some(parsed) = Hint::parse_lenient(name) else {
                violations.push(Violation::UnknownHint {
                    name: name.to_string(),
                });
                continue;
            };
            if parsed.corrected {
                self.note(path, "hint", name, parsed.value.as_str());
            }
            if hints.insert(parsed.value)
                && let Some(rule) = rule
                && !rule.allows_hint(parsed.value)
            {
                violations.push(Violation::HintNotAllowed { hint: parsed.value });
            }
        }
        hints
    }

    fn flags(
        &mut self,
        obj: &Map<String, Value>,
        rule: Option<&SchemaRule>,
        path: &str,
        violations: &mut Vec<Violation>,
    ) -> BTreeSet<FlagColor> {
        let mut names = string_list(obj.get("flags"), "flags", violations);
        match obj.get("flag") {
            None | Some(Value::Null) => {}
            Some(Value::String(single)) => names.push(single),
            Some(_) => violations.push(Violation::WrongFieldType {
                field: "flag",
                expected: "a string",
            }),
        }

        let mut flags = BTreeSet::new();
        for name in names {
            let Some(parsed) = FlagColor::parse_lenient(name) else {
                violations.push(Violation::UnknownFlag {
                    name: name.to_string(),
                });
                continue;
            };
            if parsed.corrected {
                self.note(path, "flag", name, parsed.value.as_str());
            }
            if flags.insert(parsed.value)
                && let Some(rule) = rule
                && !rule.allows_flag(parsed.value)
            {
                violations.push(Violation::FlagNotAllowed { flag: parsed.value });
            }
        }
        flags
    }

    fn validator(
        &mut self,
        obj: &Map<String, Value>,
        rule: Option<&SchemaRule>,
        path: &str,
        violations: &mut Vec<Violation>,
    ) -> (Option<ValidatorDefinition>, Option<Check>) {
        let (name, params) = match obj.get("validator") {
            None | Some(Value::Null) => return (None, None),
            // Shorthand: "validator": "MANDATORY".
            Some(Value::String(name)) => (name.as_str(), BTreeMap::new()),
            Some(Value::Object(map)) => match map.get("type") {
                Some(Value::String(name)) => {
                    let params: BTreeMap<String, Value> = map
                        .iter()
                        .filter(|(k, _)| k.as_str() != "type")
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect();
                    (name.as_str(), params)
                }
                None | Some(Value::Null) => {
                    violations.push(Violation::MissingField {
                        field: "validator.type",
                    });
                    return (None, None);
                }
                Some(_) => {
                    violations.push(Violation::WrongFieldType {
                        field: "validator.type",
                        expected: "a string",
                    });
                    return (None, None);
                }
            },
            Some(_) => {
                violations.push(Violation::WrongFieldType {
                    field: "validator",
                    expected: "an object or a validator name",
                });
                return (None, None);
            }
        };

        let Some(parsed) = ValidatorType::parse_lenient(name) else {
            violations.push(Violation::UnknownValidatorType {
                name: name.to_string(),
            });
            return (None, None);
        };
        if parsed.corrected {
            self.note(path, "validator type", name, parsed.value.as_str());
        }
        let kind = parsed.value;
        if let Some(rule) = rule
            && !rule.allows_validator(kind)
        {
            violations.push(Violation::ValidatorNotAllowed { validator: kind });
        }

        if params.get("message").is_some_and(|m| !m.is_string()) {
            violations.push(Violation::WrongFieldType {
                field: "validator.message",
                expected: "a string",
            });
        }
        if params.get("allowEmpty").is_some_and(|m| !m.is_boolean()) {
            violations.push(Violation::WrongFieldType {
                field: "validator.allowEmpty",
                expected: "a boolean",
            });
        }

        let definition = ValidatorDefinition { kind, params };
        let check = match kind {
            ValidatorType::Mandatory => Some(Check::Mandatory),
            ValidatorType::Email => Some(Check::Email),
            ValidatorType::Phone => Some(Check::Phone),
            ValidatorType::PostalCode => Some(Check::PostalCode),
            ValidatorType::RegExp => self.compile_pattern(&definition, violations),
            ValidatorType::Script => self.compile_script(&definition, violations),
        };
        (Some(definition), check)
    }

    fn compile_pattern(&self, definition: &ValidatorDefinition, violations: &mut Vec<Violation>) -> Option<Check> {
        let Some(pattern) = definition.pattern() else {
            if ["format", "pattern"].iter().any(|k| definition.params.contains_key(*k)) {
                violations.push(Violation::WrongFieldType {
                    field: "validator.format",
                    expected: "a string",
                });
            } else {
                violations.push(Violation::MissingPattern);
            }
            return None;
        };
        match formats::compile_full_match(pattern, self.options.max_pattern_size) {
            Ok(regex) => Some(Check::Pattern(regex)),
            Err(e) => {
                violations.push(Violation::InvalidPattern {
                    pattern: pattern.to_string(),
                    reason: e.to_string(),
                });
                None
            }
        }
    }

    fn compile_script(&self, definition: &ValidatorDefinition, violations: &mut Vec<Violation>) -> Option<Check> {
        let Some(expression) = definition.expression() else {
            if ["validIf", "expression"].iter().any(|k| definition.params.contains_key(*k)) {
                violations.push(Violation::WrongFieldType {
                    field: "validator.validIf",
                    expected: "a string",
                });
            } else {
                violations.push(Violation::MissingExpression);
            }
            return None;
        };
        match cir_script::parse(expression, &self.options.script_limits()) {
            Ok(script) => Some(Check::Script(script)),
            Err(error) => {
                violations.push(Violation::InvalidScript {
                    expression: expression.to_string(),
                    error,
                });
                None
            }
        }
    }

    fn choices(
        &self,
        obj: &Map<String, Value>,
        rule: Option<&SchemaRule>,
        violations: &mut Vec<Violation>,
    ) -> Option<Vec<Choice>> {
        let choices = match obj.get("choices") {
            None | Some(Value::Null) => None,
            Some(Value::Array(list)) => Some(read_choices(list, violations)),
            Some(_) => {
                violations.push(Violation::WrongFieldType {
                    field: "choices",
                    expected: "an array",
                });
                None
            }
        };

        if let Some(rule) = rule {
            let count = choices.as_ref().map_or(0, Vec::len);
            if rule.requires_choices && count == 0 {
                violations.push(Violation::MissingChoices);
            }
            if !rule.requires_choices && count > 0 {
                violations.push(Violation::UnexpectedChoices { count });
            }
        }
        choices.filter(|c| !c.is_empty())
    }

    /// Give id-less items a stem from their text, `<stem>_<n>`, avoiding
    /// every id already in the document.
    fn assign_generated_ids(&mut self) {
        let pending = std::mem::take(&mut self.pending_ids);
        for (position, path) in pending {
            let stem = id_stem(&self.items[position].text);
            let mut n = 1;
            let id = loop {
                let candidate = format!("{stem}_{n}");
                if !self.seen_ids.contains(&candidate) {
                    break candidate;
                }
                n += 1;
            };
            self.seen_ids.insert(id.clone());
            self.notes.push(format!("{path}: generated id '{id}'"));
            self.items[position].id = id;
        }
    }
}

fn read_choices(list: &[Value], violations: &mut Vec<Violation>) -> Vec<Choice> {
    let mut seen = HashSet::new();
    let mut choices = Vec::with_capacity(list.len());
    for (index, entry) in list.iter().enumerate() {
        let Some(obj) = entry.as_object() else {
            violations.push(Violation::MalformedChoice {
                index,
                reason: "choice is not an object",
            });
            continue;
        };
        let Some(val) = obj.get("val").and_then(Value::as_str) else {
            violations.push(Violation::MalformedChoice {
                index,
                reason: "'val' must be a string",
            });
            continue;
        };
        let display = match obj.get("display") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(_) => {
                violations.push(Violation::MalformedChoice {
                    index,
                    reason: "'display' must be a string",
                });
                continue;
            }
        };
        if !seen.insert(val) {
            violations.push(Violation::DuplicateChoiceValue {
                val: val.to_string(),
            });
        }
        choices.push(Choice {
            val: val.to_string(),
            display,
        });
    }
    choices
}

/// Strings of an optional array field; records one violation if the field
/// is not an array of strings.
fn string_list<'v>(value: Option<&'v Value>, field: &'static str, violations: &mut Vec<Violation>) -> Vec<&'v str> {
    let wrong = Violation::WrongFieldType {
        field,
        expected: "an array of strings",
    };
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(list)) => {
            let names: Vec<&str> = list.iter().filter_map(Value::as_str).collect();
            if names.len() != list.len() {
                violations.push(wrong);
            }
            names
        }
        Some(_) => {
            violations.push(wrong);
            Vec::new()
        }
    }
}

fn is_valid_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

fn id_stem(text: &str) -> String {
    let mut stem = String::new();
    let mut in_gap = false;
    for c in text.trim().chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            stem.push(c);
            in_gap = false;
        } else if !in_gap {
            stem.push('_');
            in_gap = true;
        }
    }
    stem.truncate(GENERATED_ID_STEM);
    if stem.is_empty() {
        "item".to_string()
    } else {
        stem
    }
}
