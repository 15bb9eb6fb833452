use super::write_atomic;
use crate::RosterResult;
use crate::engine::RoleStaffing;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Staffing outcome of one event, as shown by the "view schedule" flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPlan {
    pub event_date: NaiveDate,
    pub event_name: String,
    pub roles: Vec<RoleStaffing>,
}

impl EventPlan {
    pub fn understaffed_roles(&self) -> impl Iterator<Item = &RoleStaffing> {
        self.roles.iter().filter(|role| role.is_understaffed())
    }
}

/// Event plans keyed by event date; a later plan for the same date replaces
/// the earlier one.
pub type EventPlans = BTreeMap<NaiveDate, EventPlan>;

pub fn load_event_plans<P: AsRef<Path>>(path: P) -> RosterResult<EventPlans> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(EventPlans::new());
    }
    let file = File::open(path)?;
    let plans: EventPlans = serde_json::from_reader(file)?;
    tracing::debug!(path = %path.display(), plans = plans.len(), "loaded event plans");
    Ok(plans)
}

pub fn save_event_plans<P: AsRef<Path>>(plans: &EventPlans, path: P) -> RosterResult<()> {
    let path = path.as_ref();
    write_atomic(path, |mut file| {
        serde_json::to_writer_pretty(&mut file, plans)?;
        file.write_all(b"\n")?;
        Ok(file)
    })?;
    tracing::info!(path = %path.display(), plans = plans.len(), "saved event plans");
    Ok(())
}
