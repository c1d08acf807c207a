//! Built-in format predicates for the EMAIL, PHONE and POSTAL_CODE
//! validators. Fixed formats; not locale-configurable.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

/// # Panics
///
/// Panics if a pattern below is invalid; they are fixed at compile time.
fn builtin(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .unwrap_or_else(|e| panic!("built-in format pattern is invalid: {e}"))
}

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    builtin(r"^[a-z0-9._%+'-]+@[a-z0-9](?:[a-z0-9-]*[a-z0-9])?(?:\.[a-z0-9](?:[a-z0-9-]*[a-z0-9])?)*\.[a-z]{2,}$")
});

// North American numbering: optional +1, area code optionally in
// parentheses, optional extension.
static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    builtin(r"^(?:\+?1[ .-]?)?(?:\([0-9]{3}\)|[0-9]{3})[ .-]?[0-9]{3}[ .-]?[0-9]{4}(?: *(?:x|ext\.?) *[0-9]{1,6})?$")
});

// Canadian postal code, e.g. "K1A 0B1"; the space is optional.
static POSTAL_CODE: LazyLock<Regex> = LazyLock::new(|| {
    builtin(r"^[ABCEGHJ-NPRSTVXY][0-9][ABCEGHJ-NPRSTV-Z] ?[0-9][ABCEGHJ-NPRSTV-Z][0-9]$")
});

pub fn is_email(value: &str) -> bool {
    let value = value.trim();
    EMAIL.is_match(value) && !value.contains("..")
}

pub fn is_phone(value: &str) -> bool {
    PHONE.is_match(value.trim())
}

pub fn is_postal_code(value: &str) -> bool {
    POSTAL_CODE.is_match(value.trim())
}

/// Compile an author's REG_EXP pattern so that `is_match` means the whole
/// value matches. The pattern is checked on its own first so that wrapping
/// cannot balance a stray parenthesis.
pub fn compile_full_match(pattern: &str, size_limit: usize) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).size_limit(size_limit).build()?;
    RegexBuilder::new(&format!("^(?:{pattern})$"))
        .size_limit(size_limit)
        .build()
}
