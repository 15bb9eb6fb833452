pub mod assignment;
pub mod calendar;
pub mod config;
pub mod engine;
pub mod error;
#[cfg(feature = "cli")]
pub mod logging;
pub mod persistence;
pub mod report;
pub mod schedule;
pub mod worker;

pub use assignment::{
    Assignment, AssignmentDraft, AssignmentTable, AssignmentUpdate, next_assignment_id,
};
pub use calendar::{DayOfWeek, parse_week_ending, week_ending_for};
pub use config::RosterConfig;
pub use engine::{
    NewAssignment, RoleDemand, RoleStaffing, StaffMember, StaffingOutcome, StaffingRequest,
    create_assignment, delete_assignment, list_assignments_for_week,
    list_assignments_for_worker_week, parse_role_demand, staff_event, update_assignment,
};
pub use error::{RosterError, RosterResult};
pub use persistence::{
    CsvRosterStore, EventPlan, EventPlans, RosterStore, load_assignments, load_event_plans,
    load_workers, save_event_plans, save_workers, write_assignments,
};
pub use report::{
    FairnessReport, ShiftSummary, WorkerShiftCount, availability_outlook, role_distribution,
    shift_fairness, summarize_shifts,
};
pub use schedule::{ScheduleGrid, build_weekly_schedule, export_schedule, schedule_file_name};
pub use worker::{DayAvailability, Worker, WorkerTable, WorkerUpdate};
