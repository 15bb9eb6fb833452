use crate::assignment::AssignmentTable;
use crate::error::RosterResult;
use crate::worker::WorkerTable;
use chrono::{Duration, NaiveDate};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Estimated cost of one shift when no rate is configured.
pub const DEFAULT_SHIFT_RATE: f64 = 150.0;

/// Tallies above the mean by more than this are flagged.
pub const OUTLIER_THRESHOLD: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftSummary {
    pub worker_count: usize,
    pub total_shifts: i64,
    /// `None` when there are no workers to average over.
    pub average_shifts: Option<f64>,
    pub labor_cost: f64,
}

impl ShiftSummary {
    pub fn to_cli_summary(&self) -> String {
        let average = self
            .average_shifts
            .map(|avg| format!("{avg:.2}"))
            .unwrap_or_else(|| "undefined".to_string());
        format!(
            "Total shifts: {}, Average shifts: {}, Estimated labor cost: ${:.2}",
            self.total_shifts, average, self.labor_cost
        )
    }
}

/// Totals over the workers' running shift counters.
pub fn summarize_shifts(workers: &WorkerTable, shift_rate: f64) -> RosterResult<ShiftSummary> {
    let totals: Vec<i64> = workers.iter().map(|w| i64::from(w.total_shifts)).collect();
    let series = Series::new("total_shifts".into(), totals);
    let shifts = series.i64()?;
    let total_shifts = shifts.sum().unwrap_or(0);
    let average_shifts = if shifts.is_empty() {
        None
    } else {
        shifts.mean()
    };
    Ok(ShiftSummary {
        worker_count: workers.len(),
        total_shifts,
        average_shifts,
        labor_cost: total_shifts as f64 * shift_rate,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerShiftCount {
    pub worker_id: String,
    pub shifts: usize,
    pub is_outlier: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FairnessReport {
    /// Highest tally first, ties by worker ID.
    pub counts: Vec<WorkerShiftCount>,
    pub average: Option<f64>,
}

impl FairnessReport {
    pub fn outliers(&self) -> impl Iterator<Item = &WorkerShiftCount> {
        self.counts.iter().filter(|c| c.is_outlier)
    }
}

/// Assignments per worker ID, flagging tallies above mean + 2.
pub fn shift_fairness(assignments: &AssignmentTable) -> FairnessReport {
    let tallies = assignments.shift_counts();
    let average = if tallies.is_empty() {
        None
    } else {
        Some(tallies.values().sum::<usize>() as f64 / tallies.len() as f64)
    };

    let mut counts: Vec<WorkerShiftCount> = tallies
        .into_iter()
        .map(|(worker_id, shifts)| WorkerShiftCount {
            is_outlier: average.is_some_and(|avg| shifts as f64 > avg + OUTLIER_THRESHOLD),
            worker_id,
            shifts,
        })
        .collect();
    counts.sort_by(|a, b| b.shifts.cmp(&a.shifts).then_with(|| a.worker_id.cmp(&b.worker_id)));

    FairnessReport { counts, average }
}

/// Qualified workers per role, most common first.
pub fn role_distribution(workers: &WorkerTable) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for worker in workers.iter() {
        for role in &worker.roles {
            *counts.entry(role.as_str()).or_insert(0) += 1;
        }
    }
    let mut distribution: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(role, count)| (role.to_string(), count))
        .collect();
    distribution.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    distribution
}

/// Workers with an open availability entry on each of `days` dates from `start`.
pub fn availability_outlook(
    workers: &WorkerTable,
    start: NaiveDate,
    days: u32,
) -> Vec<(NaiveDate, usize)> {
    (0..days)
        .map(|offset| {
            let date = start + Duration::days(i64::from(offset));
            (date, workers.available_on(date).len())
        })
        .collect()
}
