use super::write_csv_atomic;
use crate::{
    Assignment, AssignmentTable, DayOfWeek, RosterError, RosterResult, Worker, WorkerTable,
    assignment::{ASSIGNMENT_COLUMNS, clean_optional},
    calendar::{format_date, parse_calendar_date},
    worker::{parse_availability, parse_roles},
};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

const ID_COLUMN: &str = "ID";

/// Load the worker file, keyed by the `ID` column.
pub fn load_workers<P: AsRef<Path>>(path: P) -> RosterResult<WorkerTable> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(RosterError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let mut reader = csv::Reader::from_reader(File::open(path)?);
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let id_idx = headers
        .iter()
        .position(|h| h == ID_COLUMN)
        .ok_or_else(|| RosterError::schema(path, "worker file must contain an 'ID' column"))?;

    let mut table = WorkerTable::with_columns(headers.iter().cloned());
    for (row_idx, record) in reader.records().enumerate() {
        let record = record?;
        let field = |idx: usize| record.get(idx).unwrap_or("").trim();
        let id = field(id_idx).to_string();
        if id.is_empty() {
            return Err(RosterError::schema(
                path,
                format!("row {} has a blank ID", row_idx + 1),
            ));
        }
        if table.contains(&id) {
            return Err(RosterError::schema(path, format!("duplicate worker ID {id}")));
        }

        let mut worker = Worker::new(id, "");
        for (col_idx, column) in headers.iter().enumerate() {
            if col_idx == id_idx {
                continue;
            }
            let value = field(col_idx);
            match column.as_str() {
                "name" => worker.name = value.to_string(),
                "contact" => worker.contact = value.to_string(),
                "roles" => worker.set_roles(parse_roles(value)?),
                "total_shifts" => worker.total_shifts = parse_total_shifts(value)?,
                "availability" => worker.availability = parse_availability(value)?,
                other => {
                    worker.extra.insert(other.to_string(), value.to_string());
                }
            }
        }
        table.insert(worker)?;
    }

    tracing::debug!(path = %path.display(), workers = table.len(), "loaded worker table");
    Ok(table)
}

/// Write the worker table (`ID` then the table's columns) atomically.
pub fn save_workers<P: AsRef<Path>>(workers: &WorkerTable, path: P) -> RosterResult<()> {
    let path = path.as_ref();
    write_csv_atomic(path, |writer| {
        let mut header = vec![ID_COLUMN.to_string()];
        header.extend(workers.columns().iter().cloned());
        writer.write_record(&header)?;
        for worker in workers.iter() {
            let mut row = vec![worker.id.clone()];
            for column in workers.columns() {
                row.push(worker.attribute(column)?);
            }
            writer.write_record(&row)?;
        }
        Ok(())
    })?;
    tracing::info!(path = %path.display(), workers = workers.len(), "saved worker table");
    Ok(())
}

fn parse_total_shifts(input: &str) -> RosterResult<u32> {
    if input.is_empty() {
        return Ok(0);
    }
    input
        .parse::<u32>()
        .map_err(|e| RosterError::parse(format!("invalid total_shifts '{input}': {e}")))
}

/// Every column defaults to empty so files missing optional columns still load.
#[derive(Default, Serialize, Deserialize)]
struct AssignmentCsvRecord {
    #[serde(rename = "AssignmentID", default)]
    assignment_id: String,
    #[serde(rename = "WeekEndingSunday", default)]
    week_ending: String,
    #[serde(rename = "EmployeeID", default)]
    employee_id: String,
    #[serde(rename = "DayOfWeek", default)]
    day_of_week: String,
    #[serde(rename = "EventName", default)]
    event_name: String,
    #[serde(rename = "StartTime", default)]
    start_time: String,
    #[serde(rename = "EndTime", default)]
    end_time: String,
    #[serde(rename = "Notes", default)]
    notes: String,
}

impl From<&Assignment> for AssignmentCsvRecord {
    fn from(assignment: &Assignment) -> Self {
        Self {
            assignment_id: assignment.id.clone(),
            week_ending: format_date(assignment.week_ending),
            employee_id: assignment.worker_id.clone(),
            day_of_week: assignment.day.as_str().to_string(),
            event_name: assignment.event_name.clone(),
            start_time: assignment.start_time.clone().unwrap_or_default(),
            end_time: assignment.end_time.clone().unwrap_or_default(),
            notes: assignment.notes.clone().unwrap_or_default(),
        }
    }
}

impl AssignmentCsvRecord {
    fn into_assignment(self) -> RosterResult<Assignment> {
        let week_ending = parse_calendar_date(&self.week_ending).map_err(|_| {
            RosterError::parse(format!(
                "assignment {} has invalid WeekEndingSunday '{}'",
                self.assignment_id, self.week_ending
            ))
        })?;
        let day = self.day_of_week.parse::<DayOfWeek>()?;
        Ok(Assignment {
            id: self.assignment_id.trim().to_string(),
            week_ending,
            worker_id: self.employee_id.trim().to_string(),
            day,
            event_name: self.event_name.trim().to_string(),
            start_time: clean_optional(Some(self.start_time)),
            end_time: clean_optional(Some(self.end_time)),
            notes: clean_optional(Some(self.notes)),
        })
    }
}

/// Load the assignment file; an absent file is an empty table when
/// `create_if_missing` is set.
pub fn load_assignments<P: AsRef<Path>>(
    path: P,
    create_if_missing: bool,
) -> RosterResult<AssignmentTable> {
    let path = path.as_ref();
    if !path.exists() {
        if create_if_missing {
            tracing::debug!(path = %path.display(), "assignment file absent, starting empty");
            return Ok(AssignmentTable::new());
        }
        return Err(RosterError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let mut reader = csv::Reader::from_reader(File::open(path)?);
    let mut rows = Vec::new();
    for record in reader.deserialize::<AssignmentCsvRecord>() {
        rows.push(record?.into_assignment()?);
    }

    tracing::debug!(path = %path.display(), assignments = rows.len(), "loaded assignment table");
    Ok(AssignmentTable::from_rows(rows))
}

/// Serialize the full table through a temporary sibling and rename it into place.
pub fn write_assignments<P: AsRef<Path>>(table: &AssignmentTable, path: P) -> RosterResult<()> {
    let path = path.as_ref();
    write_csv_atomic(path, |writer| {
        if table.is_empty() {
            // serialize() only emits a header alongside the first row.
            writer.write_record(ASSIGNMENT_COLUMNS)?;
        }
        for assignment in table.iter() {
            writer.serialize(AssignmentCsvRecord::from(assignment))?;
        }
        Ok(())
    })?;
    tracing::info!(path = %path.display(), assignments = table.len(), "saved assignment table");
    Ok(())
}
