use crate::error::{RosterError, RosterResult};
use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%m-%d-%Y"];

/// The seven fixed day columns of a scheduling week, Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        }
    }

    /// Position within the week, Monday = 0.
    pub fn index(self) -> usize {
        match self {
            DayOfWeek::Monday => 0,
            DayOfWeek::Tuesday => 1,
            DayOfWeek::Wednesday => 2,
            DayOfWeek::Thursday => 3,
            DayOfWeek::Friday => 4,
            DayOfWeek::Saturday => 5,
            DayOfWeek::Sunday => 6,
        }
    }

    pub fn from_weekday(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self::from_weekday(date.weekday())
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(value: Weekday) -> Self {
        Self::from_weekday(value)
    }
}

impl FromStr for DayOfWeek {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        DayOfWeek::ALL
            .into_iter()
            .find(|day| day.as_str() == trimmed)
            .ok_or_else(|| {
                RosterError::validation(format!(
                    "invalid day of week '{trimmed}' (expected one of {})",
                    DayOfWeek::ALL.map(DayOfWeek::as_str).join(", ")
                ))
            })
    }
}

/// Parse a week-ending date from user input, treating blank input and the
/// keyword `today` as the current local date.
pub fn parse_week_ending(input: &str) -> RosterResult<NaiveDate> {
    parse_week_ending_from(input, Local::now().date_naive())
}

/// Same as [`parse_week_ending`] with an explicit notion of "today".
pub fn parse_week_ending_from(input: &str, today: NaiveDate) -> RosterResult<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("today") {
        return Ok(today);
    }
    parse_calendar_date(trimmed).map_err(|_| {
        RosterError::parse(format!(
            "could not parse week ending '{trimmed}'; use YYYY-MM-DD, MM/DD/YYYY, or 'today'"
        ))
    })
}

/// Strict date parsing for stored records: no keyword, no blank default.
pub fn parse_calendar_date(input: &str) -> RosterResult<NaiveDate> {
    let trimmed = input.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| RosterError::parse(format!("invalid date '{trimmed}'")))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// The Sunday on or after `date`.
pub fn week_ending_for(date: NaiveDate) -> NaiveDate {
    let days_to_sunday = 6 - i64::from(date.weekday().num_days_from_monday());
    date + Duration::days(days_to_sunday)
}

/// Concrete date of `day` inside the week that closes on `week_ending`.
pub fn date_in_week(week_ending: NaiveDate, day: DayOfWeek) -> NaiveDate {
    week_ending - Duration::days(6 - day.index() as i64)
}
