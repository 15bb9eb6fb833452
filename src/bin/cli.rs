use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Local;
use clap::{Parser, Subcommand};
use staff_roster::calendar::{format_date, parse_calendar_date};
use staff_roster::config::{DEFAULT_ASSIGNMENTS_FILE, DEFAULT_PLANS_FILE, DEFAULT_WORKERS_FILE};
use staff_roster::logging::{DEFAULT_LOG_LEVEL, init_logging};
use staff_roster::report::DEFAULT_SHIFT_RATE;
use staff_roster::{
    Assignment, AssignmentUpdate, DayAvailability, EventPlan, NewAssignment, RosterConfig,
    RosterError, RosterResult, RosterStore, ScheduleGrid, StaffingRequest, Worker, WorkerTable,
    WorkerUpdate, availability_outlook, build_weekly_schedule, create_assignment,
    delete_assignment, export_schedule, list_assignments_for_week,
    list_assignments_for_worker_week, load_event_plans, parse_role_demand, parse_week_ending,
    role_distribution, save_event_plans, shift_fairness, staff_event, summarize_shifts,
    update_assignment,
};

#[derive(Debug, Parser)]
#[command(name = "roster", version, about = "Staff roster and weekly schedule tool")]
struct Cli {
    /// Worker records (CSV keyed by ID)
    #[arg(long, env = "ROSTER_WORKERS", default_value = DEFAULT_WORKERS_FILE)]
    workers: PathBuf,

    /// Assignment records (CSV), created on first write
    #[arg(long, env = "ROSTER_ASSIGNMENTS", default_value = DEFAULT_ASSIGNMENTS_FILE)]
    assignments: PathBuf,

    /// Event staffing plans (JSON)
    #[arg(long, env = "ROSTER_PLANS", default_value = DEFAULT_PLANS_FILE)]
    plans: PathBuf,

    /// Directory for exported weekly schedules
    #[arg(long, env = "ROSTER_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Estimated cost of one shift
    #[arg(long, env = "ROSTER_SHIFT_RATE", default_value_t = DEFAULT_SHIFT_RATE)]
    shift_rate: f64,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build and export the schedule for a week ending date
    Export { week: String },
    /// Print shift, fairness, role and availability reports
    Report,
}

impl Cli {
    fn config(&self) -> RosterConfig {
        RosterConfig {
            workers_path: self.workers.clone(),
            assignments_path: self.assignments.clone(),
            plans_path: self.plans.clone(),
            output_dir: self.output_dir.clone(),
            shift_rate: self.shift_rate,
        }
    }
}

fn render_text_table(header: &[String], rows: &[Vec<String>]) -> String {
    // Compute column widths
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (ci, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(ci) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    // Build horizontal separator
    let mut sep = String::new();
    sep.push('+');
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let render_row = |cells: &[String], out: &mut String| {
        out.push('|');
        for (ci, width) in widths.iter().enumerate() {
            let cell = cells.get(ci).map(String::as_str).unwrap_or("");
            out.push(' ');
            out.push_str(cell);
            let pad = width.saturating_sub(cell.chars().count());
            if pad > 0 {
                out.push_str(&" ".repeat(pad));
            }
            out.push(' ');
            out.push('|');
        }
        out.push('\n');
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    render_row(header, &mut out);
    out.push_str(&sep);
    out.push('\n');
    for row in rows {
        render_row(row.as_slice(), &mut out);
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn render_grid(grid: &ScheduleGrid) -> RosterResult<String> {
    Ok(render_text_table(&grid.column_names(), &grid.rows()?))
}

fn render_workers(workers: &WorkerTable) -> String {
    let rows: Vec<Vec<String>> = workers
        .iter()
        .map(|w| {
            vec![
                w.id.clone(),
                w.name.clone(),
                w.contact.clone(),
                w.roles.join(", "),
                w.total_shifts.to_string(),
                w.availability.len().to_string(),
            ]
        })
        .collect();
    render_text_table(
        &headers(&["ID", "name", "contact", "roles", "total_shifts", "availability_days"]),
        &rows,
    )
}

fn render_assignments(assignments: &[Assignment]) -> String {
    let rows: Vec<Vec<String>> = assignments
        .iter()
        .map(|a| {
            vec![
                a.id.clone(),
                format_date(a.week_ending),
                a.worker_id.clone(),
                a.day.to_string(),
                a.event_name.clone(),
                a.start_time.clone().unwrap_or_default(),
                a.end_time.clone().unwrap_or_default(),
                a.notes.clone().unwrap_or_default(),
            ]
        })
        .collect();
    render_text_table(
        &headers(&["ID", "week_ending", "worker", "day", "event", "start", "end", "notes"]),
        &rows,
    )
}

/// Start from an empty table when no worker file exists yet.
fn load_workers_or_empty(store: &impl RosterStore) -> RosterResult<WorkerTable> {
    match store.load_workers() {
        Err(RosterError::NotFound { .. }) => Ok(WorkerTable::new()),
        other => other,
    }
}

fn optional_arg(value: Option<&&str>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty() && *v != "-")
        .map(str::to_string)
}

fn print_help() {
    println!(
        "Commands:\n  help                                          Show this help\n  workers                                       List workers\n  worker add <id> <name> <contact> [roles_csv]   Add a worker\n  worker update <id> <name|contact|roles> <value...>\n                                                Update one worker field\n  worker delete <id>                            Remove a worker\n  avail set <id> <date> [ranges_csv]            Record availability (blank = all day)\n  avail clear <id> <date>                       Remove availability for a date\n  available <date>                              Workers available on a date\n  assign new <week> <worker> <day> <event> [start] [end] [notes...]\n                                                Create an assignment ('-' skips a field)\n  assign update <id> <day|event|start|end|notes> <value...>\n                                                Update one assignment field\n  assign delete <id>                            Delete an assignment\n  assign list <week> [worker]                   List assignments for a week\n  staff <date> <event> <role:count,...> [start] [end]\n                                                Staff an event by fewest shifts first\n  plans                                         Show staffed events\n  grid <week>                                   Show the weekly schedule\n  export <week>                                 Export the weekly schedule to CSV\n  report                                        Shift, fairness and coverage reports\n  quit|exit                                     Exit\n\nWeeks accept YYYY-MM-DD, MM/DD/YYYY, MM-DD-YYYY or 'today'."
    );
}

fn worker_command(config: &RosterConfig, args: &[&str]) -> RosterResult<()> {
    let store = config.store();
    match args {
        ["add", id, name, contact, rest @ ..] => {
            let mut workers = load_workers_or_empty(&store)?;
            let roles = rest.join(" ");
            let worker = Worker::new(*id, *name)
                .with_contact(*contact)
                .with_roles(roles.split(','));
            workers.insert(worker)?;
            store.save_workers(&workers)?;
            println!("Worker {} added.", id);
        }
        ["update", id, field, value @ ..] if !value.is_empty() => {
            let value = value.join(" ");
            let update = match *field {
                "name" => WorkerUpdate {
                    name: Some(value),
                    ..WorkerUpdate::default()
                },
                "contact" => WorkerUpdate {
                    contact: Some(value),
                    ..WorkerUpdate::default()
                },
                "roles" => WorkerUpdate {
                    roles: Some(value.split(',').map(|r| r.trim().to_string()).collect()),
                    ..WorkerUpdate::default()
                },
                other => {
                    return Err(RosterError::validation(format!(
                        "unknown worker field '{other}'"
                    )));
                }
            };
            let mut workers = store.load_workers()?;
            workers.update(id, update)?;
            store.save_workers(&workers)?;
            println!("Worker {} updated.", id);
        }
        ["delete", id] => {
            let mut workers = store.load_workers()?;
            let removed = workers.remove(id)?;
            store.save_workers(&workers)?;
            println!("Deleted worker {} ({}).", removed.id, removed.name);
        }
        _ => println!(
            "Usage: worker add <id> <name> <contact> [roles_csv] | worker update <id> <field> <value...> | worker delete <id>"
        ),
    }
    Ok(())
}

fn avail_command(config: &RosterConfig, args: &[&str]) -> RosterResult<()> {
    let store = config.store();
    match args {
        ["set", id, date, rest @ ..] => {
            let date = parse_calendar_date(date)?;
            let availability = DayAvailability::from_ranges_text(&rest.join(" "));
            let mut workers = store.load_workers()?;
            workers.set_availability(id, date, availability.clone())?;
            store.save_workers(&workers)?;
            println!(
                "Worker {} on {}: {}",
                id,
                format_date(date),
                availability.describe()
            );
        }
        ["clear", id, date] => {
            let date = parse_calendar_date(date)?;
            let mut workers = store.load_workers()?;
            if workers.clear_availability(id, date)? {
                store.save_workers(&workers)?;
                println!("Cleared availability for {} on {}.", id, format_date(date));
            } else {
                println!("Worker {} had no availability on {}.", id, format_date(date));
            }
        }
        _ => println!("Usage: avail set <id> <date> [ranges_csv] | avail clear <id> <date>"),
    }
    Ok(())
}

fn available_command(config: &RosterConfig, date: &str) -> RosterResult<()> {
    let date = parse_calendar_date(date)?;
    let workers = config.store().load_workers()?;
    let rows: Vec<Vec<String>> = workers
        .available_on(date)
        .into_iter()
        .map(|w| {
            vec![
                w.id.clone(),
                w.name.clone(),
                w.roles.join(", "),
                w.availability_on(date)
                    .map(DayAvailability::describe)
                    .unwrap_or_default(),
            ]
        })
        .collect();
    if rows.is_empty() {
        println!("No workers available on {}.", format_date(date));
    } else {
        println!(
            "{}",
            render_text_table(&headers(&["ID", "name", "roles", "hours"]), &rows)
        );
    }
    Ok(())
}

fn assign_command(config: &RosterConfig, args: &[&str]) -> RosterResult<()> {
    let store = config.store();
    match args {
        ["new", week, worker, day, event, rest @ ..] => {
            let notes = rest.get(2..).map(|n| n.join(" "));
            let request = NewAssignment {
                start_time: optional_arg(rest.first()),
                end_time: optional_arg(rest.get(1)),
                notes: notes.filter(|n| !n.trim().is_empty()),
                ..NewAssignment::new(*week, *worker, *day, *event)
            };
            let assignment = create_assignment(&store, request)?;
            println!(
                "Created {} for {} on {} (week ending {}).",
                assignment.id,
                assignment.worker_id,
                assignment.day,
                format_date(assignment.week_ending)
            );
        }
        ["update", id, field, value @ ..] if !value.is_empty() => {
            let value = Some(value.join(" "));
            let update = match *field {
                "day" => AssignmentUpdate {
                    day_of_week: value,
                    ..AssignmentUpdate::default()
                },
                "event" => AssignmentUpdate {
                    event_name: value,
                    ..AssignmentUpdate::default()
                },
                "start" => AssignmentUpdate {
                    start_time: value,
                    ..AssignmentUpdate::default()
                },
                "end" => AssignmentUpdate {
                    end_time: value,
                    ..AssignmentUpdate::default()
                },
                "notes" => AssignmentUpdate {
                    notes: value,
                    ..AssignmentUpdate::default()
                },
                other => {
                    return Err(RosterError::validation(format!(
                        "unknown assignment field '{other}'"
                    )));
                }
            };
            update_assignment(&store, id, &update)?;
            println!("Assignment {} updated.", id);
        }
        ["delete", id] => {
            delete_assignment(&store, id)?;
            println!("Deleted assignment {}.", id);
        }
        ["list", week] => {
            let rows = list_assignments_for_week(&store, week)?;
            println!("{}", render_assignments(&rows));
        }
        ["list", week, worker] => {
            let rows = list_assignments_for_worker_week(&store, week, worker)?;
            println!("{}", render_assignments(&rows));
        }
        _ => println!(
            "Usage: assign new <week> <worker> <day> <event> [start] [end] [notes...] | assign update <id> <field> <value...> | assign delete <id> | assign list <week> [worker]"
        ),
    }
    Ok(())
}

fn staff_command(config: &RosterConfig, args: &[&str]) -> RosterResult<()> {
    let [date, event, demand, times @ ..] = args else {
        println!("Usage: staff <date> <event> <role:count,...> [start] [end]");
        return Ok(());
    };
    let event_date = parse_calendar_date(date)?;
    let demand = parse_role_demand(demand)?;
    let request = StaffingRequest::new(event_date, *event, demand)
        .with_times(optional_arg(times.first()), optional_arg(times.get(1)));

    let store = config.store();
    let workers = store.load_workers()?;
    let outcome = staff_event(&store, workers, &request)?;
    store.save_workers(&outcome.workers)?;

    let mut plans = load_event_plans(&config.plans_path)?;
    plans.insert(
        event_date,
        EventPlan {
            event_date,
            event_name: request.event_name.clone(),
            roles: outcome.roles.clone(),
        },
    );
    save_event_plans(&plans, &config.plans_path)?;

    for role in &outcome.roles {
        let names: Vec<&str> = role.assigned.iter().map(|m| m.name.as_str()).collect();
        println!(
            "{}: {}/{} [{}]",
            role.role,
            role.assigned.len(),
            role.needed,
            names.join(", ")
        );
        if role.is_understaffed() {
            println!("  Understaffed: short by {}", role.shortfall());
        }
    }
    println!(
        "Staffed {} on {} with {} assignment(s).",
        request.event_name,
        format_date(event_date),
        outcome.assignments.len()
    );
    Ok(())
}

fn plans_command(config: &RosterConfig) -> RosterResult<()> {
    let plans = load_event_plans(&config.plans_path)?;
    if plans.is_empty() {
        println!("No events staffed yet.");
        return Ok(());
    }
    for plan in plans.values() {
        println!("{} {}", format_date(plan.event_date), plan.event_name);
        for role in &plan.roles {
            let names: Vec<&str> = role.assigned.iter().map(|m| m.name.as_str()).collect();
            println!(
                "  {}: {}/{} [{}]",
                role.role,
                role.assigned.len(),
                role.needed,
                names.join(", ")
            );
        }
        for role in plan.understaffed_roles() {
            println!("  Understaffed: {} (short by {})", role.role, role.shortfall());
        }
    }
    Ok(())
}

fn build_grid(config: &RosterConfig, week: &str) -> RosterResult<ScheduleGrid> {
    let week_ending = parse_week_ending(week)?;
    let store = config.store();
    let workers = store.load_workers()?;
    let assignments = store.load_assignments()?;
    build_weekly_schedule(week_ending, &workers, &assignments)
}

fn export_command(config: &RosterConfig, week: &str) -> RosterResult<()> {
    let grid = build_grid(config, week)?;
    let path = export_schedule(&grid, grid.week_ending(), &config.output_dir)?;
    println!("Schedule exported to {}", path.display());
    Ok(())
}

fn report_command(config: &RosterConfig) -> RosterResult<()> {
    let store = config.store();
    let workers = store.load_workers()?;
    let assignments = store.load_assignments()?;

    let summary = summarize_shifts(&workers, config.shift_rate)?;
    println!("{}", summary.to_cli_summary());

    let fairness = shift_fairness(&assignments);
    let rows: Vec<Vec<String>> = fairness
        .counts
        .iter()
        .map(|c| {
            vec![
                c.worker_id.clone(),
                c.shifts.to_string(),
                if c.is_outlier { "yes".into() } else { String::new() },
            ]
        })
        .collect();
    println!("\nShift distribution");
    println!(
        "{}",
        render_text_table(&headers(&["worker", "shifts", "outlier"]), &rows)
    );

    let rows: Vec<Vec<String>> = role_distribution(&workers)
        .into_iter()
        .map(|(role, count)| vec![role, count.to_string()])
        .collect();
    println!("Role coverage");
    println!("{}", render_text_table(&headers(&["role", "workers"]), &rows));

    let today = Local::now().date_naive();
    let rows: Vec<Vec<String>> = availability_outlook(&workers, today, 7)
        .into_iter()
        .map(|(date, count)| vec![format_date(date), count.to_string()])
        .collect();
    println!("Availability (next 7 days)");
    println!("{}", render_text_table(&headers(&["date", "available"]), &rows));
    Ok(())
}

fn run_line(config: &RosterConfig, cmd: &str, args: &[&str]) -> RosterResult<()> {
    match (cmd, args) {
        ("help", _) => print_help(),
        ("workers", _) => {
            let workers = load_workers_or_empty(&config.store())?;
            println!("{}", render_workers(&workers));
        }
        ("worker", _) => worker_command(config, args)?,
        ("avail", _) => avail_command(config, args)?,
        ("available", [date]) => available_command(config, date)?,
        ("assign", _) => assign_command(config, args)?,
        ("staff", _) => staff_command(config, args)?,
        ("plans", _) => plans_command(config)?,
        ("grid", [week]) => println!("{}", render_grid(&build_grid(config, week)?)?),
        ("export", [week]) => export_command(config, week)?,
        ("report", _) => report_command(config)?,
        ("available" | "grid" | "export", _) => println!("Usage: {} <date>", cmd),
        _ => println!("Unknown command '{}'. Type 'help' for commands.", cmd),
    }
    Ok(())
}

fn interactive(config: &RosterConfig) {
    println!("Staff Roster (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let parts: Vec<&str> = input.split_whitespace().collect();
        let (cmd, args) = match parts.split_first() {
            Some((cmd, args)) => (*cmd, args),
            None => continue,
        };
        if matches!(cmd, "quit" | "exit") {
            break;
        }
        if let Err(e) = run_line(config, cmd, args) {
            println!("Error: {}", e);
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_logging(&cli.log_level) {
        eprintln!("{}", e);
    }
    let config = cli.config();

    let result = match &cli.command {
        Some(Command::Export { week }) => export_command(&config, week),
        Some(Command::Report) => report_command(&config),
        None => {
            interactive(&config);
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
