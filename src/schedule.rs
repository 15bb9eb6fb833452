use crate::assignment::{Assignment, AssignmentTable};
use crate::calendar::DayOfWeek;
use crate::error::RosterResult;
use crate::persistence::write_csv_atomic;
use crate::worker::WorkerTable;
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Cell value for a worker with nothing booked that day.
pub const OFF: &str = "Off";

const ID_COLUMN: &str = "ID";

/// One week projected into rows of workers and columns of days, followed by
/// the worker attribute columns. Every column is a string column.
#[derive(Debug, Clone)]
pub struct ScheduleGrid {
    week_ending: NaiveDate,
    df: DataFrame,
}

impl ScheduleGrid {
    pub fn week_ending(&self) -> NaiveDate {
        self.week_ending
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect()
    }

    pub fn worker_ids(&self) -> RosterResult<Vec<String>> {
        Ok(self
            .df
            .column(ID_COLUMN)?
            .str()?
            .into_iter()
            .map(|id| id.unwrap_or_default().to_string())
            .collect())
    }

    /// Cell for `worker_id` on `day`, or `None` when the worker has no row.
    pub fn cell(&self, worker_id: &str, day: DayOfWeek) -> RosterResult<Option<String>> {
        let Some(row_idx) = self
            .df
            .column(ID_COLUMN)?
            .str()?
            .into_iter()
            .position(|id| id == Some(worker_id))
        else {
            return Ok(None);
        };
        Ok(self
            .df
            .column(day.as_str())?
            .str()?
            .get(row_idx)
            .map(str::to_string))
    }

    /// Rows as plain strings, in column order.
    pub fn rows(&self) -> RosterResult<Vec<Vec<String>>> {
        let mut columns = Vec::with_capacity(self.df.width());
        for name in self.column_names() {
            let values: Vec<String> = self
                .df
                .column(&name)?
                .str()?
                .into_iter()
                .map(|v| v.unwrap_or_default().to_string())
                .collect();
            columns.push(values);
        }
        Ok((0..self.df.height())
            .map(|row_idx| columns.iter().map(|col| col[row_idx].clone()).collect())
            .collect())
    }
}

/// Project the assignments of one week onto every worker and day.
///
/// When several assignments land on the same worker and day, the one with
/// the greatest assignment ID wins, so the grid does not depend on the row
/// order of `assignments`. Assignments for unknown worker IDs are ignored.
pub fn build_weekly_schedule(
    week_ending: NaiveDate,
    workers: &WorkerTable,
    assignments: &AssignmentTable,
) -> RosterResult<ScheduleGrid> {
    let mut week: Vec<&Assignment> = assignments.for_week(week_ending);
    week.sort_by(|a, b| {
        (a.id_number(), &a.id, a.label())
            .cmp(&(b.id_number(), &b.id, b.label()))
    });

    let mut labels: HashMap<(&str, DayOfWeek), String> = HashMap::new();
    for assignment in week {
        if let Some(label) = assignment.label() {
            labels.insert((assignment.worker_id.as_str(), assignment.day), label);
        }
    }

    let ids: Vec<String> = workers.iter().map(|w| w.id.clone()).collect();
    let mut series = Vec::with_capacity(1 + DayOfWeek::ALL.len() + workers.columns().len());
    series.push(Series::new(ID_COLUMN.into(), ids));

    for day in DayOfWeek::ALL {
        let cells: Vec<String> = workers
            .iter()
            .map(|w| {
                labels
                    .get(&(w.id.as_str(), day))
                    .cloned()
                    .unwrap_or_else(|| OFF.to_string())
            })
            .collect();
        series.push(Series::new(day.as_str().into(), cells));
    }

    for column in workers.columns() {
        if DayOfWeek::ALL.iter().any(|day| day.as_str() == column) {
            continue;
        }
        let values = workers
            .iter()
            .map(|w| w.attribute(column))
            .collect::<RosterResult<Vec<String>>>()?;
        series.push(Series::new(column.as_str().into(), values));
    }

    let df = DataFrame::new(series.into_iter().map(Into::into).collect())?;
    tracing::debug!(week = %week_ending, rows = df.height(), "built weekly schedule");
    Ok(ScheduleGrid { week_ending, df })
}

/// `{month}_{day}_{year}_Week_Ending_Schedule.csv`, no zero padding.
pub fn schedule_file_name(week_ending: NaiveDate) -> String {
    format!(
        "{}_{}_{}_Week_Ending_Schedule.csv",
        week_ending.month(),
        week_ending.day(),
        week_ending.year()
    )
}

/// Write the grid under `output_dir`, replacing any earlier export of the
/// same week.
pub fn export_schedule<P: AsRef<Path>>(
    grid: &ScheduleGrid,
    week_ending: NaiveDate,
    output_dir: P,
) -> RosterResult<PathBuf> {
    let path = output_dir.as_ref().join(schedule_file_name(week_ending));
    let header = grid.column_names();
    let rows = grid.rows()?;
    write_csv_atomic(&path, |writer| {
        writer.write_record(&header)?;
        for row in &rows {
            writer.write_record(row)?;
        }
        Ok(())
    })?;
    tracing::info!(path = %path.display(), rows = rows.len(), "exported weekly schedule");
    Ok(path)
}
