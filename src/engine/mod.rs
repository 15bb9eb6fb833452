pub mod records;
pub mod staffing;

pub use records::{
    NewAssignment, create_assignment, delete_assignment, list_assignments_for_week,
    list_assignments_for_worker_week, update_assignment,
};
pub use staffing::{
    RoleDemand, RoleStaffing, StaffMember, StaffingOutcome, StaffingRequest, parse_role_demand,
    staff_event,
};
