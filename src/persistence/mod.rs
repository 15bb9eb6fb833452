use crate::{AssignmentTable, RosterError, RosterResult, WorkerTable};
use std::ffi::OsString;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

pub mod file;
pub mod plans;

pub use file::{load_assignments, load_workers, save_workers, write_assignments};
pub use plans::{EventPlan, EventPlans, load_event_plans, save_event_plans};

/// Whole-table access to worker and assignment records.
///
/// Every save replaces the previous contents as one unit; there is no
/// transaction spanning both tables.
pub trait RosterStore {
    fn load_workers(&self) -> RosterResult<WorkerTable>;
    fn save_workers(&self, workers: &WorkerTable) -> RosterResult<()>;
    fn load_assignments(&self) -> RosterResult<AssignmentTable>;
    fn save_assignments(&self, assignments: &AssignmentTable) -> RosterResult<()>;
}

/// CSV-backed store. The assignment file is created on first write.
#[derive(Debug, Clone)]
pub struct CsvRosterStore {
    workers_path: PathBuf,
    assignments_path: PathBuf,
}

impl CsvRosterStore {
    pub fn new(workers_path: impl Into<PathBuf>, assignments_path: impl Into<PathBuf>) -> Self {
        Self {
            workers_path: workers_path.into(),
            assignments_path: assignments_path.into(),
        }
    }

    pub fn workers_path(&self) -> &Path {
        &self.workers_path
    }

    pub fn assignments_path(&self) -> &Path {
        &self.assignments_path
    }
}

impl RosterStore for CsvRosterStore {
    fn load_workers(&self) -> RosterResult<WorkerTable> {
        load_workers(&self.workers_path)
    }

    fn save_workers(&self, workers: &WorkerTable) -> RosterResult<()> {
        save_workers(workers, &self.workers_path)
    }

    fn load_assignments(&self) -> RosterResult<AssignmentTable> {
        load_assignments(&self.assignments_path, true)
    }

    fn save_assignments(&self, assignments: &AssignmentTable) -> RosterResult<()> {
        write_assignments(assignments, &self.assignments_path)
    }
}

pub(crate) fn ensure_parent_dir(path: &Path) -> RosterResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// `<name>.tmp` next to `path`.
pub(crate) fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("roster"));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write through a temporary sibling and rename it over `path`, so readers
/// never observe a half-written file.
pub(crate) fn write_atomic<F>(path: &Path, write: F) -> RosterResult<()>
where
    F: FnOnce(File) -> RosterResult<File>,
{
    ensure_parent_dir(path)?;
    let temp_path = temp_sibling(path);
    let file = File::create(&temp_path)?;
    let result = write(file).and_then(|file| file.sync_all().map_err(RosterError::from));
    if let Err(err) = result {
        let _ = fs::remove_file(&temp_path);
        return Err(err);
    }
    fs::rename(&temp_path, path)?;
    Ok(())
}

/// [`write_atomic`] for CSV content.
pub(crate) fn write_csv_atomic<F>(path: &Path, write_rows: F) -> RosterResult<()>
where
    F: FnOnce(&mut csv::Writer<File>) -> RosterResult<()>,
{
    write_atomic(path, |file| {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(file);
        write_rows(&mut writer)?;
        writer.flush()?;
        writer
            .into_inner()
            .map_err(|err| RosterError::from(err.into_error()))
    })
}
