use chrono::NaiveDate;
use staff_roster::{
    Assignment, AssignmentTable, CsvRosterStore, DayAvailability, DayOfWeek, RosterError,
    RosterStore, Worker, WorkerTable, load_assignments, load_workers, next_assignment_id,
    save_workers, write_assignments,
};
use std::fs;
use tempfile::{NamedTempFile, tempdir};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample_assignment(id: &str, worker_id: &str, day: DayOfWeek) -> Assignment {
    Assignment {
        id: id.into(),
        week_ending: d(2024, 6, 16),
        worker_id: worker_id.into(),
        day,
        event_name: "Gala".into(),
        start_time: Some("18:00".into()),
        end_time: Some("23:00".into()),
        notes: None,
    }
}

#[test]
fn missing_worker_file_is_not_found() {
    let dir = tempdir().unwrap();
    let err = load_workers(dir.path().join("employee.csv")).unwrap_err();
    assert!(matches!(err, RosterError::NotFound { .. }));
}

#[test]
fn worker_file_without_id_column_is_schema_error() {
    let tmp = NamedTempFile::new().unwrap();
    fs::write(tmp.path(), "name,contact\nAna,ana@example.com\n").unwrap();
    let err = load_workers(tmp.path()).unwrap_err();
    assert!(matches!(err, RosterError::Schema { .. }));
}

#[test]
fn duplicate_worker_ids_are_schema_error() {
    let tmp = NamedTempFile::new().unwrap();
    fs::write(tmp.path(), "ID,name\nW1,Ana\nW1,Bo\n").unwrap();
    let err = load_workers(tmp.path()).unwrap_err();
    assert!(matches!(err, RosterError::Schema { .. }));
}

#[test]
fn malformed_total_shifts_is_parse_error() {
    let tmp = NamedTempFile::new().unwrap();
    fs::write(tmp.path(), "ID,name,total_shifts\nW1,Ana,lots\n").unwrap();
    let err = load_workers(tmp.path()).unwrap_err();
    assert!(matches!(err, RosterError::Parse(_)));
}

#[test]
fn worker_file_reads_roles_availability_and_extra_columns() {
    let tmp = NamedTempFile::new().unwrap();
    fs::write(
        tmp.path(),
        "ID,name,contact,roles,total_shifts,availability,badge\n\
         W1,Ana,ana@example.com,\"security, usher\",3,\"{'2024-06-10': True}\",B-17\n\
         W2,Bo,,\"[\"\"usher\"\"]\",,,\n",
    )
    .unwrap();

    let workers = load_workers(tmp.path()).unwrap();
    assert_eq!(workers.len(), 2);

    let ana = workers.get("W1").unwrap();
    assert_eq!(ana.roles, vec!["security", "usher"]);
    assert_eq!(ana.total_shifts, 3);
    assert_eq!(
        ana.availability_on(d(2024, 6, 10)),
        Some(&DayAvailability::Flag(true))
    );
    assert_eq!(ana.extra.get("badge").map(String::as_str), Some("B-17"));

    let bo = workers.get("W2").unwrap();
    assert_eq!(bo.roles, vec!["usher"]);
    assert_eq!(bo.total_shifts, 0);
    assert!(bo.availability.is_empty());
    assert!(workers.columns().iter().any(|c| c == "badge"));
}

#[test]
fn workers_round_trip_through_csv() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("employee.csv");

    let mut workers = WorkerTable::new();
    workers
        .insert(
            Worker::new("W1", "Ana")
                .with_contact("ana@example.com")
                .with_roles(["security"])
                .with_availability(
                    d(2024, 6, 10),
                    DayAvailability::Ranges(vec!["08:00-16:00".into()]),
                ),
        )
        .unwrap();
    workers.insert(Worker::new("W2", "Bo").with_roles(["usher", "bar"])).unwrap();

    save_workers(&workers, &path).unwrap();
    let reloaded = load_workers(&path).unwrap();
    assert_eq!(reloaded, workers);
}

#[test]
fn absent_assignment_file_is_empty_when_create_requested() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("weekly_assignments.csv");

    let table = load_assignments(&path, true).unwrap();
    assert!(table.is_empty());

    let err = load_assignments(&path, false).unwrap_err();
    assert!(matches!(err, RosterError::NotFound { .. }));
}

#[test]
fn assignments_round_trip_and_leave_no_temp_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("weekly_assignments.csv");

    let table = AssignmentTable::from_rows(vec![
        sample_assignment("A0001", "W1", DayOfWeek::Monday),
        Assignment {
            start_time: None,
            end_time: None,
            notes: Some("role: usher".into()),
            ..sample_assignment("A0002", "W2", DayOfWeek::Sunday)
        },
    ]);
    write_assignments(&table, &path).unwrap();

    let reloaded = load_assignments(&path, false).unwrap();
    assert_eq!(reloaded, table);

    let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn assignment_header_uses_record_column_names() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("weekly_assignments.csv");
    write_assignments(&AssignmentTable::new(), &path).unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    assert_eq!(
        contents.lines().next(),
        Some("AssignmentID,WeekEndingSunday,EmployeeID,DayOfWeek,EventName,StartTime,EndTime,Notes")
    );
}

#[test]
fn assignment_rows_missing_optional_columns_load() {
    let tmp = NamedTempFile::new().unwrap();
    fs::write(
        tmp.path(),
        "AssignmentID,WeekEndingSunday,EmployeeID,DayOfWeek,EventName\n\
         A0001,2024-06-16,W1,Friday,Concert\n",
    )
    .unwrap();

    let table = load_assignments(tmp.path(), false).unwrap();
    let row = table.find("A0001").unwrap();
    assert_eq!(row.day, DayOfWeek::Friday);
    assert_eq!(row.start_time, None);
    assert_eq!(row.date(), d(2024, 6, 14));
}

#[test]
fn stored_bad_date_and_day_are_rejected() {
    let tmp = NamedTempFile::new().unwrap();
    fs::write(
        tmp.path(),
        "AssignmentID,WeekEndingSunday,EmployeeID,DayOfWeek,EventName\n\
         A0001,someday,W1,Friday,Concert\n",
    )
    .unwrap();
    assert!(matches!(
        load_assignments(tmp.path(), false),
        Err(RosterError::Parse(_))
    ));

    fs::write(
        tmp.path(),
        "AssignmentID,WeekEndingSunday,EmployeeID,DayOfWeek,EventName\n\
         A0001,2024-06-16,W1,Funday,Concert\n",
    )
    .unwrap();
    assert!(matches!(
        load_assignments(tmp.path(), false),
        Err(RosterError::Validation(_))
    ));
}

#[test]
fn next_id_is_above_every_well_formed_id() {
    assert_eq!(next_assignment_id(Vec::<String>::new()), "A0001");
    let existing = ["A0003", "A0010", "B0099", "A12x", "A", "A0007"];
    let next = next_assignment_id(existing);
    assert_eq!(next, "A0011");
    assert!(!existing.contains(&next.as_str()));
    assert_eq!(next_assignment_id(["A9999"]), "A10000");
}

#[test]
fn csv_store_creates_assignment_file_on_first_save() {
    let dir = tempdir().unwrap();
    let store = CsvRosterStore::new(
        dir.path().join("employee.csv"),
        dir.path().join("weekly_assignments.csv"),
    );
    assert!(store.load_assignments().unwrap().is_empty());

    let table = AssignmentTable::from_rows(vec![sample_assignment("A0001", "W1", DayOfWeek::Tuesday)]);
    store.save_assignments(&table).unwrap();
    assert!(store.assignments_path().exists());
    assert_eq!(store.load_assignments().unwrap(), table);
}

#[test]
fn stored_id_at_integer_limit_does_not_break_allocation() {
    let tmp = NamedTempFile::new().unwrap();
    fs::write(
        tmp.path(),
        format!(
            "AssignmentID,WeekEndingSunday,EmployeeID,DayOfWeek,EventName\n\
             A{},2024-06-16,W1,Friday,Concert\n\
             A0005,2024-06-16,W2,Friday,Concert\n",
            u64::MAX
        ),
    )
    .unwrap();

    let table = load_assignments(tmp.path(), false).unwrap();
    let next = table.next_id();
    assert_eq!(next, "A0006");
    assert!(table.find(&next).is_none());
}

#[test]
fn roles_with_apostrophes_and_commas_survive_save_and_reload() {
    let tmp = NamedTempFile::new().unwrap();
    fs::write(
        tmp.path(),
        "ID,name,roles\nW1,Ana,\"[\"\"usher's aide\"\", \"\"front of house, left\"\"]\"\n",
    )
    .unwrap();

    let workers = load_workers(tmp.path()).unwrap();
    assert_eq!(
        workers.get("W1").unwrap().roles,
        vec!["usher's aide", "front of house, left"]
    );

    save_workers(&workers, tmp.path()).unwrap();
    let reloaded = load_workers(tmp.path()).unwrap();
    assert_eq!(reloaded.get("W1").unwrap().roles, workers.get("W1").unwrap().roles);
}
