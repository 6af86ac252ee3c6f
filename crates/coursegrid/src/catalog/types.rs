/// Types for normalized catalog data
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Reserved term value for courses that run across every concrete term.
pub const TERM_YEARLY: i32 = 0;

/// A day on the fixed five-day teaching week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
}

impl Weekday {
    /// The teaching week, in grid-column order.
    pub const ALL: [Weekday; 5] = [
        Weekday::Sunday,
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
    ];

    /// Parses a day name, case-insensitively. Friday/Saturday are not
    /// teaching days and fail to parse like any other unknown name.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "sunday" => Some(Weekday::Sunday),
            "monday" => Some(Weekday::Monday),
            "tuesday" => Some(Weekday::Tuesday),
            "wednesday" => Some(Weekday::Wednesday),
            "thursday" => Some(Weekday::Thursday),
            _ => None,
        }
    }

    /// 1-based grid column (Sunday = 1 .. Thursday = 5).
    pub fn column(self) -> u8 {
        match self {
            Weekday::Sunday => 1,
            Weekday::Monday => 2,
            Weekday::Tuesday => 3,
            Weekday::Wednesday => 4,
            Weekday::Thursday => 5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Weekday::Sunday => "Sunday",
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
        }
    }

    /// Two-letter iCalendar BYDAY code.
    pub fn byday_code(self) -> &'static str {
        match self {
            Weekday::Sunday => "SU",
            Weekday::Monday => "MO",
            Weekday::Tuesday => "TU",
            Weekday::Wednesday => "WE",
            Weekday::Thursday => "TH",
        }
    }

    pub fn from_byday_code(code: &str) -> Option<Self> {
        match code {
            "SU" => Some(Weekday::Sunday),
            "MO" => Some(Weekday::Monday),
            "TU" => Some(Weekday::Tuesday),
            "WE" => Some(Weekday::Wednesday),
            "TH" => Some(Weekday::Thursday),
            _ => None,
        }
    }

    /// Days since Sunday (0..=4), for aligning recurrence start dates.
    pub fn days_from_sunday(self) -> u32 {
        self.column() as u32 - 1
    }
}

impl std::fmt::Display for Weekday {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A wall-clock time, stored as an hour/minute pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClockTime {
    pub hour: u8,
    pub minute: u8,
}

impl ClockTime {
    /// Builds a clock time, rejecting out-of-range components.
    pub fn from_hm(hour: u8, minute: u8) -> Option<Self> {
        if hour <= 23 && minute <= 59 {
            Some(Self { hour, minute })
        } else {
            None
        }
    }

    /// Parses a `HH:MM` string (a lone hour digit is accepted, `9:30`).
    pub fn parse(text: &str) -> Option<Self> {
        let (h, m) = text.trim().split_once(':')?;
        if m.len() != 2 || h.is_empty() || h.len() > 2 {
            return None;
        }
        Self::from_hm(h.parse().ok()?, m.parse().ok()?)
    }

    /// Minutes since midnight.
    pub fn minutes(self) -> u16 {
        self.hour as u16 * 60 + self.minute as u16
    }
}

impl std::fmt::Display for ClockTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// One weekly recurring meeting of a course.
///
/// Invariant: `from_time < to_time`. The normalizer never emits a slot
/// violating this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub day: Weekday,
    pub from_time: ClockTime,
    pub to_time: ClockTime,
    pub location: String,
}

/// A pickable course section, after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRecord {
    pub id: String,
    pub title: String,
    /// Term the course belongs to; `TERM_YEARLY` (0) means active in every
    /// concrete term simultaneously.
    pub term: i32,
    pub fields: BTreeSet<String>,
    /// Empty for async/no-meeting courses and for records that failed
    /// structural validation.
    pub schedule: Vec<TimeSlot>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub url: Option<String>,
}

/// The normalized catalog: records sorted by title, an id index, and the
/// derived field-of-study vocabulary.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<CourseRecord>,
    index: HashMap<String, usize>,
    fields: Vec<String>,
}

impl Catalog {
    pub fn new(records: Vec<CourseRecord>, fields: Vec<String>) -> Self {
        let index = records
            .iter()
            .enumerate()
            .map(|(i, record)| (record.id.clone(), i))
            .collect();
        Self {
            records,
            index,
            fields,
        }
    }

    /// An empty catalog, used when the initial load fails.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[CourseRecord] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&CourseRecord> {
        self.index.get(id).map(|&i| &self.records[i])
    }

    /// Distinct field-of-study labels, priority prefix first.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_parse_case_insensitive() {
        assert_eq!(Weekday::parse("sunday"), Some(Weekday::Sunday));
        assert_eq!(Weekday::parse("THURSDAY"), Some(Weekday::Thursday));
        assert_eq!(Weekday::parse(" Monday "), Some(Weekday::Monday));
        assert_eq!(Weekday::parse("Friday"), None);
        assert_eq!(Weekday::parse(""), None);
    }

    #[test]
    fn test_weekday_columns_cover_grid() {
        let columns: Vec<u8> = Weekday::ALL.iter().map(|d| d.column()).collect();
        assert_eq!(columns, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_byday_roundtrip() {
        for day in Weekday::ALL {
            assert_eq!(Weekday::from_byday_code(day.byday_code()), Some(day));
        }
    }

    #[test]
    fn test_clock_time_parse() {
        assert_eq!(ClockTime::parse("09:30"), ClockTime::from_hm(9, 30));
        assert_eq!(ClockTime::parse("9:30"), ClockTime::from_hm(9, 30));
        assert_eq!(ClockTime::parse("23:59"), ClockTime::from_hm(23, 59));
        assert_eq!(ClockTime::parse("24:00"), None);
        assert_eq!(ClockTime::parse("12:60"), None);
        assert_eq!(ClockTime::parse("12:5"), None);
        assert_eq!(ClockTime::parse("noon"), None);
    }

    #[test]
    fn test_clock_time_ordering() {
        let a = ClockTime::from_hm(9, 0).unwrap();
        let b = ClockTime::from_hm(9, 30).unwrap();
        let c = ClockTime::from_hm(10, 0).unwrap();
        assert!(a < b && b < c);
        assert_eq!(b.minutes(), 570);
    }

    #[test]
    fn test_catalog_lookup() {
        let record = CourseRecord {
            id: "MATH101".into(),
            title: "Calculus".into(),
            term: 1,
            fields: BTreeSet::new(),
            schedule: vec![],
            start_date: None,
            end_date: None,
            url: None,
        };
        let catalog = Catalog::new(vec![record], vec![]);
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get("MATH101").is_some());
        assert!(catalog.get("MATH102").is_none());
    }
}
