// 🧮 Derivation Engine - Labels, completion, progress and usage deltas
// Pure functions over a record or a (current, previous) pair.

use crate::model::{
    leading_integer, CommercialField, HouseholdField, HouseholdReading, InspectorRole,
    MonthlyRecord, Reading, HOUSEHOLD_COUNT, UNIT_SUFFIX,
};
use std::fmt;

/// Shown wherever a delta cannot be computed
pub const NO_DELTA: &str = "—";

/// ("2층", "1호") -> "201호", ("17층", "19호") -> "1719호".
/// Labels without a leading number fall back to plain concatenation.
pub fn room_label(floor: &str, unit: &str) -> String {
    match (leading_integer(floor), leading_integer(unit)) {
        (Some(f), Some(u)) => format!("{}{:02}{}", f, u, UNIT_SUFFIX),
        _ => format!("{}{}", floor, unit),
    }
}

/// A unit counts as done once any of its four utility readings is set.
/// Electric readings do not count.
pub fn is_unit_completed(record: &MonthlyRecord, floor: &str, unit: &str) -> bool {
    record
        .household(floor, unit)
        .map(has_utility_reading)
        .unwrap_or(false)
}

fn has_utility_reading(row: &HouseholdReading) -> bool {
    HouseholdField::UTILITY.iter().any(|f| row.get(*f).is_some())
}

/// Narrower predicate used only by the per-inspector statistic:
/// water or heating set. Differs from [`is_unit_completed`] on purpose.
fn counts_toward_progress(row: &HouseholdReading) -> bool {
    row.water.is_some() || row.heating.is_some()
}

// ============================================================================
// USAGE DELTA
// ============================================================================

/// Month-over-month difference; `None` when either side is unset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsageDelta(pub Option<f64>);

impl fmt::Display for UsageDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{:.2}", v),
            None => f.write_str(NO_DELTA),
        }
    }
}

pub fn usage_delta(current: Reading, previous: Reading) -> UsageDelta {
    match (current, previous) {
        (Some(c), Some(p)) => UsageDelta(Some(c - p)),
        _ => UsageDelta(None),
    }
}

/// Per-field comparison of one household row against last month's row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HouseholdDelta {
    pub outdoor_unit: UsageDelta,
    pub heating: UsageDelta,
    pub hot_water: UsageDelta,
    pub water: UsageDelta,
    pub elec_total: UsageDelta,
}

/// Sum of the electric readings that are set; unset if none are.
pub fn electric_total(row: &HouseholdReading) -> Reading {
    HouseholdField::ELECTRIC
        .iter()
        .filter_map(|f| row.get(*f))
        .fold(None, |acc, v| Some(acc.unwrap_or(0.0) + v))
}

pub fn household_delta(current: &HouseholdReading, previous: Option<&HouseholdReading>) -> HouseholdDelta {
    let prev = |field: HouseholdField| previous.and_then(|p| p.get(field));

    HouseholdDelta {
        outdoor_unit: usage_delta(current.outdoor_unit, prev(HouseholdField::OutdoorUnit)),
        heating: usage_delta(current.heating, prev(HouseholdField::Heating)),
        hot_water: usage_delta(current.hot_water, prev(HouseholdField::HotWater)),
        water: usage_delta(current.water, prev(HouseholdField::Water)),
        elec_total: usage_delta(electric_total(current), previous.and_then(electric_total)),
    }
}

/// Last month's reading for a commercial row, matched by position.
pub fn previous_commercial_water(previous: Option<&MonthlyRecord>, index: usize) -> Reading {
    previous
        .and_then(|p| p.commercials.get(index))
        .and_then(|c| c.get(CommercialField::Water))
}

// ============================================================================
// PROGRESS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InspectorProgress {
    pub household_count: usize,
    pub commercial_count: usize,
}

impl InspectorProgress {
    /// Share of all households, rounded to a whole percent
    pub fn household_percent(&self) -> u32 {
        ((self.household_count as f64 / HOUSEHOLD_COUNT as f64) * 100.0).round() as u32
    }
}

pub fn progress_by_inspector(record: &MonthlyRecord, role: InspectorRole) -> InspectorProgress {
    InspectorProgress {
        household_count: record
            .households
            .iter()
            .filter(|h| h.inspector == role && counts_toward_progress(h))
            .count(),
        commercial_count: record
            .commercials
            .iter()
            .filter(|c| c.inspector == role && c.water.is_some())
            .count(),
    }
}

/// Units on `floor` that pass [`is_unit_completed`]
pub fn completed_units_on_floor(record: &MonthlyRecord, floor: &str) -> usize {
    record
        .households
        .iter()
        .filter(|h| h.floor == floor && has_utility_reading(h))
        .count()
}
