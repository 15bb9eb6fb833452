use crate::assignment::{Assignment, AssignmentDraft, AssignmentUpdate};
use crate::calendar::{DayOfWeek, parse_week_ending};
use crate::error::RosterResult;
use crate::persistence::RosterStore;

/// Raw, user-supplied fields for a new assignment.
#[derive(Debug, Clone, Default)]
pub struct NewAssignment {
    /// ISO date, US slash/dash date, `today`, or blank (today).
    pub week_ending: String,
    pub worker_id: String,
    pub day_of_week: String,
    pub event_name: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub notes: Option<String>,
}

impl NewAssignment {
    pub fn new(
        week_ending: impl Into<String>,
        worker_id: impl Into<String>,
        day_of_week: impl Into<String>,
        event_name: impl Into<String>,
    ) -> Self {
        Self {
            week_ending: week_ending.into(),
            worker_id: worker_id.into(),
            day_of_week: day_of_week.into(),
            event_name: event_name.into(),
            ..Self::default()
        }
    }

    pub fn start_time(mut self, start_time: impl Into<String>) -> Self {
        self.start_time = Some(start_time.into());
        self
    }

    pub fn end_time(mut self, end_time: impl Into<String>) -> Self {
        self.end_time = Some(end_time.into());
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    fn into_draft(self) -> RosterResult<AssignmentDraft> {
        let week_ending = parse_week_ending(&self.week_ending)?;
        let day = self.day_of_week.parse::<DayOfWeek>()?;
        Ok(AssignmentDraft {
            week_ending,
            worker_id: self.worker_id,
            day,
            event_name: self.event_name,
            start_time: self.start_time,
            end_time: self.end_time,
            notes: self.notes,
        })
    }
}

/// Append one assignment and persist the table. The worker ID is not checked
/// against the worker table, nor is availability or qualification.
pub fn create_assignment<S>(store: &S, request: NewAssignment) -> RosterResult<Assignment>
where
    S: RosterStore + ?Sized,
{
    let draft = request.into_draft()?;
    let mut table = store.load_assignments()?;
    let assignment = table.append(draft);
    store.save_assignments(&table)?;
    tracing::info!(
        id = %assignment.id,
        worker = %assignment.worker_id,
        day = %assignment.day,
        "created assignment"
    );
    Ok(assignment)
}

/// Update the supplied fields of assignment `id`; a failed validation
/// writes nothing.
pub fn update_assignment<S>(store: &S, id: &str, update: &AssignmentUpdate) -> RosterResult<()>
where
    S: RosterStore + ?Sized,
{
    let mut table = store.load_assignments()?;
    table.apply_update(id, update)?;
    store.save_assignments(&table)?;
    tracing::info!(id, "updated assignment");
    Ok(())
}

pub fn delete_assignment<S>(store: &S, id: &str) -> RosterResult<()>
where
    S: RosterStore + ?Sized,
{
    let mut table = store.load_assignments()?;
    table.remove(id)?;
    store.save_assignments(&table)?;
    tracing::info!(id, "deleted assignment");
    Ok(())
}

pub fn list_assignments_for_week<S>(store: &S, week_ending: &str) -> RosterResult<Vec<Assignment>>
where
    S: RosterStore + ?Sized,
{
    let week = parse_week_ending(week_ending)?;
    let table = store.load_assignments()?;
    Ok(table.for_week(week).into_iter().cloned().collect())
}

pub fn list_assignments_for_worker_week<S>(
    store: &S,
    week_ending: &str,
    worker_id: &str,
) -> RosterResult<Vec<Assignment>>
where
    S: RosterStore + ?Sized,
{
    let week = parse_week_ending(week_ending)?;
    let table = store.load_assignments()?;
    Ok(table
        .for_worker_week(week, worker_id.trim())
        .into_iter()
        .cloned()
        .collect())
}
