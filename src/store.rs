// 🗂️ Record Store - Monthly records keyed by "YYYY-MM"
// Owns the collection and the current-record pointer. Every mutation is
// written straight back through the persistence adapter.

use crate::db::{load_records, save_records, KeyValueStore, LoadStatus};
use crate::error::MeterError;
use crate::model::{CommercialField, HouseholdField, InspectorRole, MonthlyRecord, Reading};
use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

fn month_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9]{4}-[0-9]{2}$").expect("month pattern compiles"))
}

/// Check a new-month input against the collection without touching it.
pub fn validate_month_input(input: &str, records: &[MonthlyRecord]) -> Result<(), MeterError> {
    if !month_pattern().is_match(input) {
        return Err(MeterError::Format(input.to_string()));
    }
    if records.iter().any(|r| r.id == input) {
        return Err(MeterError::Duplicate(input.to_string()));
    }
    Ok(())
}

/// Value the creation dialog starts with: the month containing `today`.
pub fn suggested_month_id(today: NaiveDate) -> String {
    format!("{}-{:02}", today.year(), today.month())
}

/// Sort by id; zero-padded "YYYY-MM" sorts chronologically.
pub fn sort_by_id(records: &mut [MonthlyRecord]) {
    records.sort_by(|a, b| a.id.cmp(&b.id));
}

/// Record with the nearest earlier id, or None if `current_id` is the
/// earliest or not present.
pub fn get_previous_record<'a>(
    records: &'a [MonthlyRecord],
    current_id: &str,
) -> Option<&'a MonthlyRecord> {
    let mut sorted: Vec<&MonthlyRecord> = records.iter().collect();
    sorted.sort_by(|a, b| a.id.cmp(&b.id));

    let index = sorted.iter().position(|r| r.id == current_id)?;
    if index > 0 {
        Some(sorted[index - 1])
    } else {
        None
    }
}

pub struct RecordStore<S: KeyValueStore> {
    storage: S,
    records: Vec<MonthlyRecord>,
    current_id: Option<String>,
}

impl<S: KeyValueStore> RecordStore<S> {
    /// Hydrate from storage. The latest month becomes current.
    pub fn open(storage: S) -> Result<(Self, LoadStatus)> {
        let hydrated = load_records(&storage)?;

        let current_id = hydrated.records.iter().map(|r| r.id.clone()).max();

        let store = Self {
            storage,
            records: hydrated.records,
            current_id,
        };

        Ok((store, hydrated.status))
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn records(&self) -> &[MonthlyRecord] {
        &self.records
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current_id.as_deref()
    }

    pub fn current_record(&self) -> Option<&MonthlyRecord> {
        let id = self.current_id.as_deref()?;
        self.records.iter().find(|r| r.id == id)
    }

    pub fn previous_record(&self) -> Option<&MonthlyRecord> {
        get_previous_record(&self.records, self.current_id.as_deref()?)
    }

    pub fn find_record(&self, id: &str) -> Option<&MonthlyRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Position of (floor, unit) in the current record's household rows
    pub fn find_household(&self, floor: &str, unit: &str) -> Option<usize> {
        self.current_record()?.household_index(floor, unit)
    }

    // ------------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------------

    /// Create a blank month from "YYYY-MM" input and make it current.
    pub fn create_month(&mut self, input: &str) -> Result<String, MeterError> {
        if let Err(e) = validate_month_input(input, &self.records) {
            debug!(input, error = %e, "month creation rejected");
            return Err(e);
        }

        let mut candidate = self.records.clone();
        candidate.push(MonthlyRecord::blank(input));
        sort_by_id(&mut candidate);

        // Memory only changes once the new collection is on disk
        save_records(&self.storage, &candidate)?;
        self.records = candidate;
        self.current_id = Some(input.to_string());

        info!(id = input, total = self.records.len(), "month created");
        Ok(input.to_string())
    }

    /// Point at `id` if it is loaded; unknown ids are ignored.
    pub fn select_current(&mut self, id: &str) {
        if self.records.iter().any(|r| r.id == id) {
            self.current_id = Some(id.to_string());
            debug!(id, "current month selected");
        } else {
            debug!(id, "select ignored: month not loaded");
        }
    }

    /// Move the pointer to the chronologically next (or previous) month.
    pub fn select_adjacent(&mut self, forward: bool) {
        let mut ids: Vec<&str> = self.records.iter().map(|r| r.id.as_str()).collect();
        ids.sort_unstable();

        let target = match self.current_id.as_deref().and_then(|c| ids.iter().position(|id| *id == c)) {
            Some(i) if forward => ids.get(i + 1),
            Some(i) => i.checked_sub(1).and_then(|p| ids.get(p)),
            None => ids.last(),
        };

        if let Some(id) = target.map(|id| id.to_string()) {
            self.select_current(&id);
        }
    }

    /// Set one household field on the current record. The whole row is
    /// re-attributed to `inspector` (last writer wins).
    pub fn update_household_field(
        &mut self,
        index: usize,
        field: HouseholdField,
        value: Reading,
        inspector: InspectorRole,
    ) -> Result<(), MeterError> {
        self.edit_current(|record| {
            let Some(row) = record.households.get_mut(index) else {
                warn!(index, "household index out of range");
                return false;
            };

            row.set(field, value);
            row.inspector = inspector;
            debug!(
                floor = %row.floor, unit = %row.unit, field = field.label(),
                value = ?value, inspector = inspector.label(), "household reading updated"
            );
            true
        })
    }

    /// Commercial counterpart of [`update_household_field`](Self::update_household_field).
    pub fn update_commercial_field(
        &mut self,
        index: usize,
        field: CommercialField,
        value: Reading,
        inspector: InspectorRole,
    ) -> Result<(), MeterError> {
        self.edit_current(|record| {
            let Some(row) = record.commercials.get_mut(index) else {
                warn!(index, "commercial index out of range");
                return false;
            };

            row.set(field, value);
            row.inspector = inspector;
            debug!(
                unit = %row.unit, field = field.label(),
                value = ?value, inspector = inspector.label(), "commercial reading updated"
            );
            true
        })
    }

    /// The main meter carries no inspector attribution.
    pub fn update_main_meter(&mut self, value: Reading) -> Result<(), MeterError> {
        self.edit_current(|record| {
            record.main_meter = value;
            debug!(id = %record.id, value = ?value, "main meter updated");
            true
        })
    }

    /// Apply `edit` to the current record and persist. If the save fails the
    /// record is restored, so memory never runs ahead of storage. `edit`
    /// returns false when it changed nothing.
    fn edit_current<F>(&mut self, edit: F) -> Result<(), MeterError>
    where
        F: FnOnce(&mut MonthlyRecord) -> bool,
    {
        let Some(id) = self.current_id.as_deref() else {
            return Ok(());
        };
        let Some(pos) = self.records.iter().position(|r| r.id == id) else {
            return Ok(());
        };

        let original = self.records[pos].clone();
        if !edit(&mut self.records[pos]) {
            return Ok(());
        }

        if let Err(e) = save_records(&self.storage, &self.records) {
            warn!(id = %original.id, error = %e, "save failed; edit rolled back");
            self.records[pos] = original;
            return Err(e.into());
        }
        Ok(())
    }
}
