use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::vocab::{FlagColor, Hint};

/// What a renderer needs to draw one item: every hint to apply and the
/// single flag color to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ResolvedHints {
    pub effective_hints: BTreeSet<Hint>,
    pub effective_flag: FlagColor,
}
