use crate::calendar::{format_date, parse_calendar_date};
use crate::error::{RosterError, RosterResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute columns written after `ID` when a table is created from scratch.
pub const DEFAULT_WORKER_COLUMNS: [&str; 5] =
    ["name", "contact", "roles", "total_shifts", "availability"];

/// What a worker declared for a single date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DayAvailability {
    Flag(bool),
    /// Free-text time ranges such as `08:00-16:00`.
    Ranges(Vec<String>),
    /// Named time slots, e.g. `{"morning": true}`.
    Slots(BTreeMap<String, bool>),
}

impl DayAvailability {
    pub fn is_open(&self) -> bool {
        match self {
            DayAvailability::Flag(flag) => *flag,
            DayAvailability::Ranges(ranges) => !ranges.is_empty(),
            DayAvailability::Slots(slots) => slots.values().any(|open| *open),
        }
    }

    /// Build from comma-separated range text; blank text means "available".
    pub fn from_ranges_text(text: &str) -> Self {
        let ranges = split_list(text);
        if ranges.is_empty() {
            DayAvailability::Flag(true)
        } else {
            DayAvailability::Ranges(ranges)
        }
    }

    pub fn describe(&self) -> String {
        match self {
            DayAvailability::Flag(true) => "available".to_string(),
            DayAvailability::Flag(false) => "unavailable".to_string(),
            DayAvailability::Ranges(ranges) => ranges.join(", "),
            DayAvailability::Slots(slots) => slots
                .iter()
                .filter(|(_, open)| **open)
                .map(|(slot, _)| slot.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    pub id: String,
    pub name: String,
    pub contact: String,
    pub roles: Vec<String>,
    pub availability: BTreeMap<NaiveDate, DayAvailability>,
    pub total_shifts: u32,
    /// Columns this crate does not interpret, kept so they survive a rewrite.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl Worker {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            contact: String::new(),
            roles: Vec::new(),
            availability: BTreeMap::new(),
            total_shifts: 0,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_contact(mut self, contact: impl Into<String>) -> Self {
        self.contact = contact.into();
        self
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_roles(roles);
        self
    }

    pub fn with_availability(mut self, date: NaiveDate, availability: DayAvailability) -> Self {
        self.availability.insert(date, availability);
        self
    }

    /// Replace the role set; blanks are dropped and the first occurrence of a
    /// duplicate wins.
    pub fn set_roles<I, S>(&mut self, roles: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for role in roles {
            let role = role.into().trim().to_string();
            if !role.is_empty() && !unique.contains(&role) {
                unique.push(role);
            }
        }
        self.roles = unique;
    }

    pub fn has_role(&self, role: &str) -> bool {
        let role = role.trim();
        self.roles.iter().any(|r| r == role)
    }

    pub fn availability_on(&self, date: NaiveDate) -> Option<&DayAvailability> {
        self.availability.get(&date)
    }

    /// True when the worker declared anything at all for `date`.
    pub fn has_availability_entry(&self, date: NaiveDate) -> bool {
        self.availability.contains_key(&date)
    }

    pub fn is_open_on(&self, date: NaiveDate) -> bool {
        self.availability_on(date).is_some_and(DayAvailability::is_open)
    }

    /// Text value of a worker attribute column as written to CSV.
    pub fn attribute(&self, column: &str) -> RosterResult<String> {
        Ok(match column {
            "name" => self.name.clone(),
            "contact" => self.contact.clone(),
            "roles" if self.roles.iter().any(|r| r.contains(',')) => {
                serde_json::to_string(&self.roles)?
            }
            "roles" => self.roles.join(","),
            "total_shifts" => self.total_shifts.to_string(),
            "availability" => format_availability(&self.availability)?,
            other => self.extra.get(other).cloned().unwrap_or_default(),
        })
    }
}

/// Partial update for a worker; `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct WorkerUpdate {
    pub name: Option<String>,
    pub contact: Option<String>,
    pub roles: Option<Vec<String>>,
}

/// Worker records keyed by string ID, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerTable {
    columns: Vec<String>,
    workers: Vec<Worker>,
}

impl Default for WorkerTable {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkerTable {
    pub fn new() -> Self {
        Self {
            columns: DEFAULT_WORKER_COLUMNS.iter().map(|c| c.to_string()).collect(),
            workers: Vec::new(),
        }
    }

    /// Build a table with the given attribute column order. Recognised columns
    /// missing from `columns` are appended so nothing is lost on write.
    pub fn with_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut columns: Vec<String> = columns
            .into_iter()
            .map(Into::into)
            .filter(|c| c != "ID")
            .collect();
        for default in DEFAULT_WORKER_COLUMNS {
            if !columns.iter().any(|c| c == default) {
                columns.push(default.to_string());
            }
        }
        Self {
            columns,
            workers: Vec::new(),
        }
    }

    /// Attribute columns in output order (excluding `ID`).
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Worker> {
        self.workers.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Worker> {
        self.workers.iter().find(|w| w.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    fn get_mut(&mut self, id: &str) -> RosterResult<&mut Worker> {
        self.workers
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| RosterError::validation(format!("no worker found with ID={id}")))
    }

    pub fn insert(&mut self, mut worker: Worker) -> RosterResult<()> {
        worker.id = worker.id.trim().to_string();
        if worker.id.is_empty() {
            return Err(RosterError::validation("worker ID must not be blank"));
        }
        if self.contains(&worker.id) {
            return Err(RosterError::validation(format!(
                "worker {} already exists",
                worker.id
            )));
        }
        for key in worker.extra.keys() {
            if !self.columns.contains(key) {
                self.columns.push(key.clone());
            }
        }
        self.workers.push(worker);
        Ok(())
    }

    pub fn update(&mut self, id: &str, update: WorkerUpdate) -> RosterResult<()> {
        let worker = self.get_mut(id)?;
        if let Some(name) = update.name.filter(|n| !n.trim().is_empty()) {
            worker.name = name.trim().to_string();
        }
        if let Some(contact) = update.contact.filter(|c| !c.trim().is_empty()) {
            worker.contact = contact.trim().to_string();
        }
        if let Some(roles) = update.roles.filter(|r| !r.is_empty()) {
            worker.set_roles(roles);
        }
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> RosterResult<Worker> {
        let idx = self
            .workers
            .iter()
            .position(|w| w.id == id)
            .ok_or_else(|| RosterError::validation(format!("no worker found with ID={id}")))?;
        Ok(self.workers.remove(idx))
    }

    pub fn set_availability(
        &mut self,
        id: &str,
        date: NaiveDate,
        availability: DayAvailability,
    ) -> RosterResult<()> {
        self.get_mut(id)?.availability.insert(date, availability);
        Ok(())
    }

    pub fn clear_availability(&mut self, id: &str, date: NaiveDate) -> RosterResult<bool> {
        Ok(self.get_mut(id)?.availability.remove(&date).is_some())
    }

    /// Bump a worker's running shift total. Only the staffing engine calls this.
    pub(crate) fn record_shift(&mut self, id: &str) -> RosterResult<u32> {
        let worker = self.get_mut(id)?;
        worker.total_shifts += 1;
        Ok(worker.total_shifts)
    }

    /// Workers with an open availability entry for `date`.
    pub fn available_on(&self, date: NaiveDate) -> Vec<&Worker> {
        self.workers.iter().filter(|w| w.is_open_on(date)).collect()
    }

    /// Workers holding `role` with any availability entry for `date`.
    pub fn qualified_for(&self, role: &str, date: NaiveDate) -> Vec<&Worker> {
        self.workers
            .iter()
            .filter(|w| w.has_role(role) && w.has_availability_entry(date))
            .collect()
    }
}

pub(crate) fn split_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

/// Roles are stored either as comma-joined text or as a JSON list.
pub(crate) fn parse_roles(input: &str) -> RosterResult<Vec<String>> {
    let trimmed = input.trim();
    if trimmed.starts_with('[') {
        return serde_json::from_str::<Vec<String>>(trimmed)
            .or_else(|_| serde_json::from_str(&normalize_python_literal(trimmed)))
            .map_err(|err| RosterError::parse(format!("invalid roles list '{trimmed}': {err}")));
    }
    Ok(split_list(trimmed))
}

pub(crate) fn parse_availability(
    input: &str,
) -> RosterResult<BTreeMap<NaiveDate, DayAvailability>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(BTreeMap::new());
    }
    let raw: BTreeMap<String, DayAvailability> = serde_json::from_str(trimmed)
        .or_else(|_| serde_json::from_str(&normalize_python_literal(trimmed)))
        .map_err(|err| RosterError::parse(format!("invalid availability '{trimmed}': {err}")))?;

    let mut availability = BTreeMap::new();
    for (date, value) in raw {
        availability.insert(parse_calendar_date(&date)?, value);
    }
    Ok(availability)
}

pub(crate) fn format_availability(
    availability: &BTreeMap<NaiveDate, DayAvailability>,
) -> RosterResult<String> {
    if availability.is_empty() {
        return Ok(String::new());
    }
    let keyed: BTreeMap<String, &DayAvailability> = availability
        .iter()
        .map(|(date, value)| (format_date(*date), value))
        .collect();
    Ok(serde_json::to_string(&keyed)?)
}

/// Python `repr` output (single quotes, `True`/`False`) into JSON text.
///
/// Quoted text is copied through untouched apart from re-quoting; only bare
/// `True`/`False` tokens are rewritten.
fn normalize_python_literal(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' => {
                out.push('"');
                while let Some(inner) = chars.next() {
                    match inner {
                        '\\' => match chars.next() {
                            Some('\'') => out.push('\''),
                            Some(escaped) => {
                                out.push('\\');
                                out.push(escaped);
                            }
                            None => out.push('\\'),
                        },
                        quote if quote == c => break,
                        '"' => out.push_str("\\\""),
                        other => out.push(other),
                    }
                }
                out.push('"');
            }
            c if c.is_alphanumeric() || c == '_' => {
                let mut word = String::from(c);
                while let Some(&next) = chars.peek() {
                    if !(next.is_alphanumeric() || next == '_') {
                        break;
                    }
                    word.push(next);
                    chars.next();
                }
                match word.as_str() {
                    "True" => out.push_str("true"),
                    "False" => out.push_str("false"),
                    _ => out.push_str(&word),
                }
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn roles_are_deduplicated_in_order() {
        let worker = Worker::new("W1", "Ana").with_roles(["usher", " security", "usher", ""]);
        assert_eq!(worker.roles, vec!["usher", "security"]);
        assert!(worker.has_role("security"));
        assert!(!worker.has_role("Security"));
    }

    #[test]
    fn availability_accepts_python_style_text() {
        let parsed = parse_availability("{'2024-06-10': ['8:00-16:00'], '2024-06-11': True}")
            .unwrap();
        assert_eq!(
            parsed.get(&d(2024, 6, 10)),
            Some(&DayAvailability::Ranges(vec!["8:00-16:00".into()]))
        );
        assert_eq!(parsed.get(&d(2024, 6, 11)), Some(&DayAvailability::Flag(true)));
    }

    #[test]
    fn availability_accepts_slot_maps() {
        let parsed =
            parse_availability(r#"{"2024-06-10": {"morning": false, "evening": true}}"#).unwrap();
        let day = parsed.get(&d(2024, 6, 10)).unwrap();
        assert!(day.is_open());
        assert_eq!(day.describe(), "evening");
    }

    #[test]
    fn malformed_availability_is_parse_error() {
        assert!(matches!(
            parse_availability("{not json"),
            Err(RosterError::Parse(_))
        ));
        assert!(matches!(
            parse_availability(r#"{"someday": true}"#),
            Err(RosterError::Parse(_))
        ));
    }

    #[test]
    fn availability_text_round_trips() {
        let mut availability = BTreeMap::new();
        availability.insert(d(2024, 6, 10), DayAvailability::Ranges(vec!["09:00-17:00".into()]));
        availability.insert(d(2024, 6, 12), DayAvailability::Flag(false));
        let text = format_availability(&availability).unwrap();
        assert_eq!(parse_availability(&text).unwrap(), availability);
    }

    #[test]
    fn python_literals_only_rewrite_bare_tokens() {
        let parsed = parse_availability("{'2024-06-10': {'TrueNorth': True, 'Falsetto': False}}")
            .unwrap();
        let day = parsed.get(&d(2024, 6, 10)).unwrap();
        assert_eq!(day.describe(), "TrueNorth");
        assert_eq!(
            normalize_python_literal(r#"['it\'s', 'say "hi"']"#),
            r#"["it's", "say \"hi\""]"#
        );
    }

    #[test]
    fn json_roles_keep_apostrophes() {
        assert_eq!(parse_roles(r#"["usher's aide"]"#).unwrap(), vec!["usher's aide"]);
        assert_eq!(parse_roles("['usher', 'bar']").unwrap(), vec!["usher", "bar"]);
    }

    #[test]
    fn roles_with_commas_are_written_as_json() {
        let worker = Worker::new("W1", "Ana").with_roles(["front of house, left", "usher"]);
        let text = worker.attribute("roles").unwrap();
        assert_eq!(text, r#"["front of house, left","usher"]"#);
        assert_eq!(parse_roles(&text).unwrap(), worker.roles);

        let plain = Worker::new("W2", "Bo").with_roles(["usher", "bar"]);
        assert_eq!(plain.attribute("roles").unwrap(), "usher,bar");
    }

    #[test]
    fn roles_accept_json_lists() {
        assert_eq!(
            parse_roles(r#"["usher", "security"]"#).unwrap(),
            vec!["usher", "security"]
        );
        assert_eq!(parse_roles("usher, security").unwrap(), vec!["usher", "security"]);
    }

    #[test]
    fn table_rejects_duplicate_ids_and_reports_unknown_workers() {
        let mut table = WorkerTable::new();
        table.insert(Worker::new("W1", "Ana")).unwrap();
        assert!(matches!(
            table.insert(Worker::new("W1", "Bo")),
            Err(RosterError::Validation(_))
        ));
        assert!(matches!(table.remove("W9"), Err(RosterError::Validation(_))));
    }

    #[test]
    fn update_keeps_values_for_blank_fields() {
        let mut table = WorkerTable::new();
        table
            .insert(Worker::new("W1", "Ana").with_contact("ana@example.com"))
            .unwrap();
        table
            .update(
                "W1",
                WorkerUpdate {
                    name: Some("  ".into()),
                    contact: Some("555-0100".into()),
                    roles: Some(vec!["usher".into()]),
                },
            )
            .unwrap();
        let worker = table.get("W1").unwrap();
        assert_eq!(worker.name, "Ana");
        assert_eq!(worker.contact, "555-0100");
        assert_eq!(worker.roles, vec!["usher"]);
    }
}
