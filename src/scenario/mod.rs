pub mod curve;
pub mod export;

use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::data::roster::{EmployeeRecord, Roster};

pub use curve::{cost_curve, CurvePoint};
pub use export::{format_usd, selected_csv_string, write_selected_csv, ExportError};

/// Which end of the compensation range is selected first when truncating to a headcount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionDirection {
    /// Cheapest first (cost-minimizing). Ascending `comp_usd`.
    LowestFirst,
    /// Most expensive first. Descending `comp_usd`.
    HighestFirst,
}

impl Default for SelectionDirection {
    fn default() -> Self {
        Self::LowestFirst
    }
}

impl SelectionDirection {
    pub fn is_ascending(self) -> bool {
        matches!(self, Self::LowestFirst)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::LowestFirst => "Lowest compensation first (cost-minimizing)",
            Self::HighestFirst => "Highest compensation first",
        }
    }
}

impl From<bool> for SelectionDirection {
    fn from(ascending: bool) -> Self {
        if ascending {
            Self::LowestFirst
        } else {
            Self::HighestFirst
        }
    }
}

impl fmt::Display for SelectionDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LowestFirst => f.write_str("lowest"),
            Self::HighestFirst => f.write_str("highest"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown selection priority '{0}' (expected 'lowest' or 'highest')")]
pub struct UnknownDirection(pub String);

impl FromStr for SelectionDirection {
    type Err = UnknownDirection;

    /// Accepts short forms (`lowest`, `asc`, `highest`, `desc`, ...) and the full option
    /// labels, which start with "Lowest" or "Highest".
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let value = raw.trim().to_ascii_lowercase();
        match value.as_str() {
            "lowest" | "low" | "asc" | "ascending" | "cheapest" => Ok(Self::LowestFirst),
            "highest" | "high" | "desc" | "descending" => Ok(Self::HighestFirst),
            v if v.starts_with("lowest") => Ok(Self::LowestFirst),
            v if v.starts_with("highest") => Ok(Self::HighestFirst),
            _ => Err(UnknownDirection(raw.to_string())),
        }
    }
}

/// Outcome of one headcount scenario. Recomputed on every parameter change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioResult {
    pub direction: SelectionDirection,
    pub selected: Vec<EmployeeRecord>,
    pub total_compensation: i128,
    pub average_compensation: i64,
    pub total_employees: usize,
}

impl ScenarioResult {
    pub fn selected_headcount(&self) -> usize {
        self.selected.len()
    }

    /// "selected/total", e.g. `10/42`.
    pub fn headcount_label(&self) -> String {
        format!("{}/{}", self.selected.len(), self.total_employees)
    }
}

/// Select `target_headcount` people by compensation and total their cost.
///
/// Headcounts above the roster size select everyone. Ties on `comp_usd` keep roster order,
/// so results are reproducible for identical inputs.
pub fn evaluate(
    roster: &Roster,
    target_headcount: usize,
    direction: SelectionDirection,
) -> ScenarioResult {
    let selected: Vec<EmployeeRecord> = sorted_by_comp(roster, direction)
        .into_iter()
        .take(target_headcount)
        .cloned()
        .collect();
    let total_compensation = selected.iter().map(|r| i128::from(r.comp_usd)).sum();
    let average_compensation = average_comp(total_compensation, selected.len());

    ScenarioResult {
        direction,
        selected,
        total_compensation,
        average_compensation,
        total_employees: roster.len(),
    }
}

/// Clamp a signed, caller-supplied headcount into `[0, total_employees]`.
pub fn clamp_headcount(requested: i64, total_employees: usize) -> usize {
    if requested <= 0 {
        return 0;
    }
    usize::try_from(requested).map_or(total_employees, |h| h.min(total_employees))
}

/// Stable sort of roster references by compensation.
pub(crate) fn sorted_by_comp(
    roster: &Roster,
    direction: SelectionDirection,
) -> Vec<&EmployeeRecord> {
    let mut ordered: Vec<&EmployeeRecord> = roster.iter().collect();
    match direction {
        SelectionDirection::LowestFirst => ordered.sort_by_key(|r| r.comp_usd),
        SelectionDirection::HighestFirst => ordered.sort_by_key(|r| Reverse(r.comp_usd)),
    }
    ordered
}

/// `total / count` truncated toward zero, or 0 for an empty selection.
pub(crate) fn average_comp(total: i128, count: usize) -> i64 {
    if count == 0 {
        return 0;
    }
    // A mean of i64 values always fits in i64.
    (total / count as i128) as i64
}
