use crate::calendar::{DayOfWeek, date_in_week};
use crate::error::{RosterError, RosterResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fixed column order of the assignment file.
pub const ASSIGNMENT_COLUMNS: [&str; 8] = [
    "AssignmentID",
    "WeekEndingSunday",
    "EmployeeID",
    "DayOfWeek",
    "EventName",
    "StartTime",
    "EndTime",
    "Notes",
];

const ID_PREFIX: char = 'A';

/// One worker booked on one day of a week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: String,
    pub week_ending: NaiveDate,
    /// Not checked against the worker table.
    pub worker_id: String,
    pub day: DayOfWeek,
    pub event_name: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub notes: Option<String>,
}

impl Assignment {
    /// Calendar date this assignment falls on.
    pub fn date(&self) -> NaiveDate {
        date_in_week(self.week_ending, self.day)
    }

    /// Grid label: `"<event>: <start>"`, either part omitted when blank.
    pub fn label(&self) -> Option<String> {
        let parts: Vec<&str> = [Some(self.event_name.as_str()), self.start_time.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(": "))
        }
    }

    /// Numeric suffix of a well-formed ID.
    pub fn id_number(&self) -> Option<u64> {
        parse_id_number(&self.id)
    }
}

/// Field values for a new assignment; the ID is allocated on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentDraft {
    pub week_ending: NaiveDate,
    pub worker_id: String,
    pub day: DayOfWeek,
    pub event_name: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub notes: Option<String>,
}

impl AssignmentDraft {
    fn into_assignment(self, id: String) -> Assignment {
        Assignment {
            id,
            week_ending: self.week_ending,
            worker_id: self.worker_id.trim().to_string(),
            day: self.day,
            event_name: self.event_name.trim().to_string(),
            start_time: clean_optional(self.start_time),
            end_time: clean_optional(self.end_time),
            notes: clean_optional(self.notes),
        }
    }
}

/// Partial update; `None` leaves a field untouched. The day is raw text so it
/// can be validated together with the rest of the update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentUpdate {
    pub day_of_week: Option<String>,
    pub event_name: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub notes: Option<String>,
}

impl AssignmentUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentTable {
    rows: Vec<Assignment>,
}

impl AssignmentTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<Assignment>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Assignment] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Assignment> {
        self.rows.iter()
    }

    pub fn find(&self, id: &str) -> Option<&Assignment> {
        self.rows.iter().find(|row| row.id == id)
    }

    pub fn next_id(&self) -> String {
        next_assignment_id(self.rows.iter().map(|row| row.id.as_str()))
    }

    /// Allocate an ID for `draft`, append it, and return the stored row.
    pub fn append(&mut self, draft: AssignmentDraft) -> Assignment {
        let assignment = draft.into_assignment(self.next_id());
        self.rows.push(assignment.clone());
        assignment
    }

    pub fn apply_update(&mut self, id: &str, update: &AssignmentUpdate) -> RosterResult<()> {
        let idx = self.position(id)?;
        let day = update
            .day_of_week
            .as_deref()
            .map(str::parse::<DayOfWeek>)
            .transpose()?;

        let row = &mut self.rows[idx];
        if let Some(day) = day {
            row.day = day;
        }
        if let Some(event_name) = &update.event_name {
            row.event_name = event_name.trim().to_string();
        }
        if let Some(start_time) = &update.start_time {
            row.start_time = clean_optional(Some(start_time.clone()));
        }
        if let Some(end_time) = &update.end_time {
            row.end_time = clean_optional(Some(end_time.clone()));
        }
        if let Some(notes) = &update.notes {
            row.notes = clean_optional(Some(notes.clone()));
        }
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> RosterResult<Assignment> {
        let idx = self.position(id)?;
        Ok(self.rows.remove(idx))
    }

    pub fn for_week(&self, week_ending: NaiveDate) -> Vec<&Assignment> {
        self.rows
            .iter()
            .filter(|row| row.week_ending == week_ending)
            .collect()
    }

    pub fn for_worker_week(&self, week_ending: NaiveDate, worker_id: &str) -> Vec<&Assignment> {
        self.rows
            .iter()
            .filter(|row| row.week_ending == week_ending && row.worker_id == worker_id)
            .collect()
    }

    /// Number of assignments held by each worker ID.
    pub fn shift_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for row in &self.rows {
            *counts.entry(row.worker_id.clone()).or_insert(0) += 1;
        }
        counts
    }

    fn position(&self, id: &str) -> RosterResult<usize> {
        self.rows
            .iter()
            .position(|row| row.id == id)
            .ok_or_else(|| RosterError::validation(format!("no assignment found with AssignmentID={id}")))
    }
}

/// Next ID after the highest well-formed `A####` ID; malformed IDs are ignored,
/// as are suffixes too large to increment.
pub fn next_assignment_id<I, S>(existing_ids: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let next = existing_ids
        .into_iter()
        .filter_map(|id| parse_id_number(id.as_ref()))
        .filter_map(|n| n.checked_add(1))
        .max()
        .unwrap_or(1);
    format!("{ID_PREFIX}{next:04}")
}

fn parse_id_number(id: &str) -> Option<u64> {
    let digits = id.trim().strip_prefix(ID_PREFIX)?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

pub(crate) fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
