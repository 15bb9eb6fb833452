use crate::persistence::CsvRosterStore;
use crate::report::DEFAULT_SHIFT_RATE;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_WORKERS_FILE: &str = "employee.csv";
pub const DEFAULT_ASSIGNMENTS_FILE: &str = "weekly_assignments.csv";
pub const DEFAULT_PLANS_FILE: &str = "schedule.json";

/// File locations and rates shared by every roster operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterConfig {
    pub workers_path: PathBuf,
    pub assignments_path: PathBuf,
    pub plans_path: PathBuf,
    /// Directory that exported schedules are written into.
    pub output_dir: PathBuf,
    pub shift_rate: f64,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            workers_path: PathBuf::from(DEFAULT_WORKERS_FILE),
            assignments_path: PathBuf::from(DEFAULT_ASSIGNMENTS_FILE),
            plans_path: PathBuf::from(DEFAULT_PLANS_FILE),
            output_dir: PathBuf::from("."),
            shift_rate: DEFAULT_SHIFT_RATE,
        }
    }
}

impl RosterConfig {
    pub fn store(&self) -> CsvRosterStore {
        CsvRosterStore::new(&self.workers_path, &self.assignments_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn defaults_point_at_working_directory_files() {
        let config = RosterConfig::default();
        assert_eq!(config.workers_path, Path::new("employee.csv"));
        assert_eq!(config.output_dir, Path::new("."));
        assert_eq!(config.shift_rate, 150.0);

        let store = config.store();
        assert_eq!(store.assignments_path(), Path::new("weekly_assignments.csv"));
    }
}
