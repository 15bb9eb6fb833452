use crate::assignment::{Assignment, AssignmentDraft};
use crate::calendar::{DayOfWeek, week_ending_for};
use crate::error::{RosterError, RosterResult};
use crate::persistence::RosterStore;
use crate::worker::WorkerTable;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How many workers holding `role` an event needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDemand {
    pub role: String,
    pub needed: usize,
}

impl RoleDemand {
    pub fn new(role: impl Into<String>, needed: usize) -> Self {
        Self {
            role: role.into(),
            needed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StaffingRequest {
    pub event_date: NaiveDate,
    pub event_name: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    /// Filled in request order.
    pub demand: Vec<RoleDemand>,
}

impl StaffingRequest {
    pub fn new(event_date: NaiveDate, event_name: impl Into<String>, demand: Vec<RoleDemand>) -> Self {
        Self {
            event_date,
            event_name: event_name.into(),
            start_time: None,
            end_time: None,
            demand,
        }
    }

    pub fn with_times(mut self, start_time: Option<String>, end_time: Option<String>) -> Self {
        self.start_time = start_time;
        self.end_time = end_time;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffMember {
    pub worker_id: String,
    pub name: String,
    pub contact: String,
}

/// Demand for one role next to the workers actually booked for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleStaffing {
    pub role: String,
    pub needed: usize,
    pub assigned: Vec<StaffMember>,
}

impl RoleStaffing {
    pub fn shortfall(&self) -> usize {
        self.needed.saturating_sub(self.assigned.len())
    }

    pub fn is_understaffed(&self) -> bool {
        self.shortfall() > 0
    }
}

/// Result of [`staff_event`]: the updated worker table plus what was booked.
#[derive(Debug, Clone)]
pub struct StaffingOutcome {
    pub workers: WorkerTable,
    pub assignments: Vec<Assignment>,
    pub roles: Vec<RoleStaffing>,
}

impl StaffingOutcome {
    pub fn understaffed(&self) -> impl Iterator<Item = &RoleStaffing> {
        self.roles.iter().filter(|role| role.is_understaffed())
    }

    pub fn is_fully_staffed(&self) -> bool {
        self.understaffed().next().is_none()
    }
}

/// Greedy first-fit staffing.
///
/// For each role, candidates are workers holding the role with an
/// availability entry for the event date who were not already picked for
/// this event. They are ordered by ascending total shifts (ties keep table
/// order) and the first `needed` are booked. Each booking appends one
/// assignment and adds one to the worker's total. A shortfall is recorded on
/// the role, never raised.
///
/// New assignments are persisted in one write. The returned worker table is
/// not saved; that is the caller's second, independent write.
pub fn staff_event<S>(
    store: &S,
    mut workers: WorkerTable,
    request: &StaffingRequest,
) -> RosterResult<StaffingOutcome>
where
    S: RosterStore + ?Sized,
{
    let week_ending = week_ending_for(request.event_date);
    let day = DayOfWeek::of(request.event_date);
    let mut table = store.load_assignments()?;
    let mut picked: HashSet<String> = HashSet::new();
    let mut created = Vec::new();
    let mut roles = Vec::with_capacity(request.demand.len());

    for demand in &request.demand {
        let mut candidates: Vec<(String, u32)> = workers
            .qualified_for(&demand.role, request.event_date)
            .into_iter()
            .filter(|w| !picked.contains(&w.id))
            .map(|w| (w.id.clone(), w.total_shifts))
            .collect();
        candidates.sort_by_key(|(_, shifts)| *shifts);
        tracing::debug!(
            role = %demand.role,
            needed = demand.needed,
            candidates = candidates.len(),
            "selecting staff"
        );

        let mut assigned = Vec::new();
        for (worker_id, _) in candidates.into_iter().take(demand.needed) {
            let assignment = table.append(AssignmentDraft {
                week_ending,
                worker_id: worker_id.clone(),
                day,
                event_name: request.event_name.clone(),
                start_time: request.start_time.clone(),
                end_time: request.end_time.clone(),
                notes: Some(format!("role: {}", demand.role)),
            });
            workers.record_shift(&worker_id)?;
            let worker = workers
                .get(&worker_id)
                .ok_or_else(|| RosterError::validation(format!("no worker found with ID={worker_id}")))?;
            assigned.push(StaffMember {
                worker_id: worker.id.clone(),
                name: worker.name.clone(),
                contact: worker.contact.clone(),
            });
            picked.insert(worker_id);
            created.push(assignment);
        }

        let staffing = RoleStaffing {
            role: demand.role.clone(),
            needed: demand.needed,
            assigned,
        };
        if staffing.is_understaffed() {
            tracing::warn!(
                role = %staffing.role,
                needed = staffing.needed,
                assigned = staffing.assigned.len(),
                "role understaffed"
            );
        }
        roles.push(staffing);
    }

    if !created.is_empty() {
        store.save_assignments(&table)?;
    }
    tracing::info!(
        event = %request.event_name,
        date = %request.event_date,
        booked = created.len(),
        "staffed event"
    );

    Ok(StaffingOutcome {
        workers,
        assignments: created,
        roles,
    })
}

/// Parse demand text such as `security:2, usher:1`.
pub fn parse_role_demand(input: &str) -> RosterResult<Vec<RoleDemand>> {
    let mut demand: Vec<RoleDemand> = Vec::new();
    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (role, count) = part
            .rsplit_once(':')
            .ok_or_else(|| RosterError::parse(format!("expected role:count, got '{part}'")))?;
        let role = role.trim();
        if role.is_empty() {
            return Err(RosterError::parse(format!("missing role name in '{part}'")));
        }
        let needed = count
            .trim()
            .parse::<usize>()
            .map_err(|e| RosterError::parse(format!("invalid count in '{part}': {e}")))?;
        match demand.iter_mut().find(|d| d.role == role) {
            Some(existing) => existing.needed += needed,
            None => demand.push(RoleDemand::new(role, needed)),
        }
    }
    Ok(demand)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demand_text_parses_and_merges_repeats() {
        let demand = parse_role_demand("security:2, usher:1,security:1").unwrap();
        assert_eq!(
            demand,
            vec![RoleDemand::new("security", 3), RoleDemand::new("usher", 1)]
        );
    }

    #[test]
    fn malformed_demand_is_parse_error() {
        assert!(matches!(parse_role_demand("security"), Err(RosterError::Parse(_))));
        assert!(matches!(parse_role_demand("security:-1"), Err(RosterError::Parse(_))));
        assert!(matches!(parse_role_demand(":2"), Err(RosterError::Parse(_))));
    }

    #[test]
    fn shortfall_saturates() {
        let staffing = RoleStaffing {
            role: "usher".into(),
            needed: 1,
            assigned: vec![
                StaffMember {
                    worker_id: "W1".into(),
                    name: "Ana".into(),
                    contact: String::new(),
                },
                StaffMember {
                    worker_id: "W2".into(),
                    name: "Bo".into(),
                    contact: String::new(),
                },
            ],
        };
        assert_eq!(staffing.shortfall(), 0);
        assert!(!staffing.is_understaffed());
    }
}
