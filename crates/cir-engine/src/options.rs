use serde::{Deserialize, Serialize};

use cir_script::{Limits, DEFAULT_MAX_STEPS};

/// Resource bounds for parsing and evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Node evaluations allowed per SCRIPT validator run.
    pub max_script_steps: u32,
    /// Longest accepted SCRIPT expression, in bytes.
    pub max_script_len: usize,
    /// Deepest accepted nesting of parentheses and `!` in a SCRIPT expression.
    pub max_script_depth: usize,
    /// Compiled size limit for REG_EXP patterns, in bytes.
    pub max_pattern_size: usize,
    /// Deepest accepted nesting of sections.
    pub max_section_depth: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        let limits = Limits::default();
        Self {
            max_script_steps: DEFAULT_MAX_STEPS,
            max_script_len: limits.max_len,
            max_script_depth: limits.max_depth,
            max_pattern_size: 1 << 20,
            max_section_depth: 16,
        }
    }
}

impl EngineOptions {
    pub fn script_limits(&self) -> Limits {
        Limits {
            max_len: self.max_script_len,
            max_depth: self.max_script_depth,
        }
    }
}
