use chrono::NaiveDate;
use staff_roster::schedule::OFF;
use staff_roster::{
    Assignment, AssignmentTable, DayOfWeek, Worker, WorkerTable, build_weekly_schedule,
    export_schedule, schedule_file_name,
};
use std::fs;
use tempfile::tempdir;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn booking(id: &str, worker_id: &str, day: DayOfWeek, event: &str, start: Option<&str>) -> Assignment {
    Assignment {
        id: id.into(),
        week_ending: d(2024, 6, 16),
        worker_id: worker_id.into(),
        day,
        event_name: event.into(),
        start_time: start.map(str::to_string),
        end_time: None,
        notes: None,
    }
}

fn sample_workers() -> WorkerTable {
    let mut workers = WorkerTable::new();
    workers
        .insert(Worker::new("W1", "Ana").with_contact("ana@example.com").with_roles(["security"]))
        .unwrap();
    workers.insert(Worker::new("W2", "Bo").with_roles(["usher"])).unwrap();
    workers
}

#[test]
fn week_without_assignments_is_all_off() {
    let workers = sample_workers();
    let other_week = AssignmentTable::from_rows(vec![Assignment {
        week_ending: d(2024, 6, 23),
        ..booking("A0001", "W1", DayOfWeek::Monday, "Gala", None)
    }]);

    let grid = build_weekly_schedule(d(2024, 6, 16), &workers, &other_week).unwrap();
    assert_eq!(grid.height(), 2);
    for id in ["W1", "W2"] {
        for day in DayOfWeek::ALL {
            assert_eq!(grid.cell(id, day).unwrap().as_deref(), Some(OFF));
        }
    }
}

#[test]
fn columns_are_id_then_days_then_worker_attributes() {
    let grid = build_weekly_schedule(d(2024, 6, 16), &sample_workers(), &AssignmentTable::new())
        .unwrap();
    assert_eq!(
        grid.column_names(),
        vec![
            "ID",
            "Monday",
            "Tuesday",
            "Wednesday",
            "Thursday",
            "Friday",
            "Saturday",
            "Sunday",
            "name",
            "contact",
            "roles",
            "total_shifts",
            "availability",
        ]
    );
    assert_eq!(grid.worker_ids().unwrap(), vec!["W1", "W2"]);
}

#[test]
fn labels_join_event_and_start_time() {
    let table = AssignmentTable::from_rows(vec![
        booking("A0001", "W1", DayOfWeek::Monday, "Gala", Some("18:00")),
        booking("A0002", "W1", DayOfWeek::Tuesday, "Setup", None),
        booking("A0003", "W2", DayOfWeek::Wednesday, "", Some("09:00")),
        booking("A0004", "W2", DayOfWeek::Thursday, " ", Some(" ")),
        booking("A0005", "W9", DayOfWeek::Friday, "Ghost", None),
    ]);

    let grid = build_weekly_schedule(d(2024, 6, 16), &sample_workers(), &table).unwrap();
    assert_eq!(grid.cell("W1", DayOfWeek::Monday).unwrap().as_deref(), Some("Gala: 18:00"));
    assert_eq!(grid.cell("W1", DayOfWeek::Tuesday).unwrap().as_deref(), Some("Setup"));
    assert_eq!(grid.cell("W2", DayOfWeek::Wednesday).unwrap().as_deref(), Some("09:00"));
    assert_eq!(grid.cell("W2", DayOfWeek::Thursday).unwrap().as_deref(), Some(OFF));
    assert_eq!(grid.cell("W9", DayOfWeek::Friday).unwrap(), None);
    assert_eq!(grid.height(), 2);
}

#[test]
fn collisions_resolve_to_greatest_id_regardless_of_row_order() {
    let rows = vec![
        booking("A0007", "W1", DayOfWeek::Saturday, "Late show", Some("21:00")),
        booking("A0002", "W1", DayOfWeek::Saturday, "Matinee", Some("14:00")),
        booking("A0010", "W2", DayOfWeek::Sunday, "Brunch", None),
        booking("A0009", "W2", DayOfWeek::Sunday, "Cleanup", None),
    ];
    let mut reversed = rows.clone();
    reversed.reverse();

    let workers = sample_workers();
    let forward = build_weekly_schedule(d(2024, 6, 16), &workers, &AssignmentTable::from_rows(rows))
        .unwrap();
    let backward =
        build_weekly_schedule(d(2024, 6, 16), &workers, &AssignmentTable::from_rows(reversed))
            .unwrap();

    assert_eq!(forward.rows().unwrap(), backward.rows().unwrap());
    assert_eq!(
        forward.cell("W1", DayOfWeek::Saturday).unwrap().as_deref(),
        Some("Late show: 21:00")
    );
    assert_eq!(forward.cell("W2", DayOfWeek::Sunday).unwrap().as_deref(), Some("Brunch"));
}

#[test]
fn building_twice_gives_the_same_grid() {
    let workers = sample_workers();
    let table = AssignmentTable::from_rows(vec![booking("A0001", "W1", DayOfWeek::Monday, "Gala", None)]);
    let first = build_weekly_schedule(d(2024, 6, 16), &workers, &table).unwrap();
    let second = build_weekly_schedule(d(2024, 6, 16), &workers, &table).unwrap();
    assert!(first.dataframe().equals(second.dataframe()));
}

#[test]
fn export_file_name_has_no_zero_padding() {
    assert_eq!(schedule_file_name(d(2024, 6, 16)), "6_16_2024_Week_Ending_Schedule.csv");
    assert_eq!(schedule_file_name(d(2025, 1, 5)), "1_5_2025_Week_Ending_Schedule.csv");
}

#[test]
fn export_writes_grid_and_overwrites_previous_file() {
    let dir = tempdir().unwrap();
    let out_dir = dir.path().join("exports");
    let week = d(2024, 6, 16);
    let workers = sample_workers();

    let first = AssignmentTable::from_rows(vec![booking("A0001", "W1", DayOfWeek::Monday, "Gala", None)]);
    let grid = build_weekly_schedule(week, &workers, &first).unwrap();
    let path = export_schedule(&grid, week, &out_dir).unwrap();
    assert_eq!(path, out_dir.join("6_16_2024_Week_Ending_Schedule.csv"));

    let contents = fs::read_to_string(&path).unwrap();
    let mut lines = contents.lines();
    assert_eq!(
        lines.next(),
        Some("ID,Monday,Tuesday,Wednesday,Thursday,Friday,Saturday,Sunday,name,contact,roles,total_shifts,availability")
    );
    assert_eq!(
        lines.next(),
        Some("W1,Gala,Off,Off,Off,Off,Off,Off,Ana,ana@example.com,security,0,")
    );

    let second = AssignmentTable::from_rows(vec![booking("A0001", "W1", DayOfWeek::Monday, "Rehearsal", None)]);
    let grid = build_weekly_schedule(week, &workers, &second).unwrap();
    export_schedule(&grid, week, &out_dir).unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.contains("W1,Rehearsal,Off"));
    assert!(!contents.contains("Gala"));
}
