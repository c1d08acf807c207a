//! Closed vocabularies consumed by the catalog and the engine.
//!
//! `ValidatorType`, `Hint` and `FlagColor` are fixed sets. `ItemType` is a
//! tag whose legal values come from the loaded catalog, so new item types
//! never require a code change.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;

/// Result of a case-insensitive vocabulary match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lenient<T> {
    pub value: T,
    /// `true` when the input only matched after case folding.
    pub corrected: bool,
}

fn lenient_match<T: Copy>(input: &str, all: &[T], name: impl Fn(T) -> &'static str) -> Option<Lenient<T>> {
    if let Some(v) = all.iter().copied().find(|v| name(*v) == input) {
        return Some(Lenient {
            value: v,
            corrected: false,
        });
    }
    all.iter()
        .copied()
        .find(|v| name(*v).eq_ignore_ascii_case(input))
        .map(|value| Lenient {
            value,
            corrected: true,
        })
}

/// Runtime validator kinds an item may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum ValidatorType {
    Email,
    Mandatory,
    Phone,
    PostalCode,
    RegExp,
    Script,
}

impl ValidatorType {
    pub const ALL: [ValidatorType; 6] = [
        Self::Email,
        Self::Mandatory,
        Self::Phone,
        Self::PostalCode,
        Self::RegExp,
        Self::Script,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "EMAIL",
            Self::Mandatory => "MANDATORY",
            Self::Phone => "PHONE",
            Self::PostalCode => "POSTAL_CODE",
            Self::RegExp => "REG_EXP",
            Self::Script => "SCRIPT",
        }
    }

    pub fn parse_lenient(input: &str) -> Option<Lenient<Self>> {
        lenient_match(input, &Self::ALL, Self::as_str)
    }
}

/// Rendering directives. Independent boolean toggles: no two hints conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum Hint {
    UseButtonsForMenu,
    UseSearchableMenu,
    UseDropdownMenu,
    MinAcuityWeeks,
    MinAcuityYears,
    SameLine,
    VerticalStacking,
    GreyBg,
    WhiteBg,
    Border,
    Expanded,
    JsMenuOption,
    IndividualMenuOption,
}

impl Hint {
    pub const ALL: [Hint; 13] = [
        Self::UseButtonsForMenu,
        Self::UseSearchableMenu,
        Self::UseDropdownMenu,
        Self::MinAcuityWeeks,
        Self::MinAcuityYears,
        Self::SameLine,
        Self::VerticalStacking,
        Self::GreyBg,
        Self::WhiteBg,
        Self::Border,
        Self::Expanded,
        Self::JsMenuOption,
        Self::IndividualMenuOption,
    ];

    /// Hints that pick the widget used for a choice list.
    pub const MENU_STYLES: [Hint; 3] = [
        Self::UseButtonsForMenu,
        Self::UseSearchableMenu,
        Self::UseDropdownMenu,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::UseButtonsForMenu => "USE_BUTTONS_FOR_MENU",
            Self::UseSearchableMenu => "USE_SEARCHABLE_MENU",
            Self::UseDropdownMenu => "USE_DROPDOWN_MENU",
            Self::MinAcuityWeeks => "MIN_ACUITY_WEEKS",
            Self::MinAcuityYears => "MIN_ACUITY_YEARS",
            Self::SameLine => "SAME_LINE",
            Self::VerticalStacking => "VERTICAL_STACKING",
            Self::GreyBg => "GREY_BG",
            Self::WhiteBg => "WHITE_BG",
            Self::Border => "BORDER",
            Self::Expanded => "EXPANDED",
            Self::JsMenuOption => "JS_MENU_OPTION",
            Self::IndividualMenuOption => "INDIVIDUAL_MENU_OPTION",
        }
    }

    pub fn parse_lenient(input: &str) -> Option<Lenient<Self>> {
        lenient_match(input, &Self::ALL, Self::as_str)
    }
}

/// Visual severity color attached to an item.
///
/// Variants are declared from most to least severe, so the derived `Ord`
/// is the effective-flag priority: `RED > RED_UNDERLINE > ORANGE > YELLOW >
/// PURPLE > BLUE > GREEN > NONE` (smaller ordinal wins).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum FlagColor {
    Red,
    RedUnderline,
    Orange,
    Yellow,
    Purple,
    Blue,
    Green,
    None,
}

impl FlagColor {
    pub const ALL: [FlagColor; 8] = [
        Self::Red,
        Self::RedUnderline,
        Self::Orange,
        Self::Yellow,
        Self::Purple,
        Self::Blue,
        Self::Green,
        Self::None,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Red => "RED",
            Self::RedUnderline => "RED_UNDERLINE",
            Self::Orange => "ORANGE",
            Self::Yellow => "YELLOW",
            Self::Purple => "PURPLE",
            Self::Blue => "BLUE",
            Self::Green => "GREEN",
            Self::None => "NONE",
        }
    }

    pub fn parse_lenient(input: &str) -> Option<Lenient<Self>> {
        lenient_match(input, &Self::ALL, Self::as_str)
    }
}

macro_rules! impl_strict_parse {
    ($ty:ty, $vocabulary:literal) => {
        impl FromStr for $ty {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match Self::parse_lenient(s) {
                    Some(Lenient {
                        value,
                        corrected: false,
                    }) => Ok(value),
                    _ => Err(CoreError::UnknownName {
                        vocabulary: $vocabulary,
                        name: s.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

impl_strict_parse!(ValidatorType, "validator type");
impl_strict_parse!(Hint, "hint");
impl_strict_parse!(FlagColor, "flag color");

/// Item type tag, e.g. `TEXT_FIELD` or `MENU`.
///
/// Legal values are whatever the active catalog declares. Stored upper-case.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct ItemType(String);

impl ItemType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The canonical (upper-case) spelling of `name`.
    pub fn canonical(name: &str) -> Self {
        Self(name.trim().to_ascii_uppercase())
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemType {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
