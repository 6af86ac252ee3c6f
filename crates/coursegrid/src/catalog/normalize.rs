//! Catalog normalization.
//!
//! Raw course records arrive as arbitrary JSON. A single pass here produces
//! fully validated `CourseRecord`s so that no later component re-checks
//! shape. Malformed records are degraded, never dropped: a record whose
//! schedule fails validation stays in the catalog with an empty schedule and
//! simply contributes no overlap or layout obligations.

use super::types::{Catalog, ClockTime, CourseRecord, TimeSlot, Weekday, TERM_YEARLY};
use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::debug;

/// Placeholder id for records whose id cannot be coerced to a usable value.
pub const UNKNOWN_ID: &str = "Unknown ID";

const TIME_PATTERN: &str = r"^([01]?[0-9]|2[0-3]):[0-5][0-9]$";

pub struct Normalizer {
    time_re: Regex,
    priority_fields: Vec<String>,
}

impl Normalizer {
    /// Creates a normalizer. `priority_fields` is the group of field-of-study
    /// labels sorted to the front of the derived vocabulary, in the order
    /// given.
    pub fn new(priority_fields: Vec<String>) -> Self {
        Self {
            time_re: Regex::new(TIME_PATTERN).unwrap(),
            priority_fields,
        }
    }

    /// Normalizes a raw record list into a catalog: records sorted by title
    /// (case-folded lexical order) plus the derived field vocabulary.
    pub fn normalize(&self, raw: &[Value]) -> Catalog {
        let mut records: Vec<CourseRecord> = raw.iter().map(|v| self.normalize_record(v)).collect();
        records.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));

        let fields = self.field_vocabulary(&records);
        Catalog::new(records, fields)
    }

    /// Normalizes one raw record. Field-level coercions apply individually;
    /// the schedule is all-or-nothing: one invalid entry empties the whole
    /// list.
    fn normalize_record(&self, value: &Value) -> CourseRecord {
        let id = coerce_id(value.get("id"));
        let title = value
            .get("title")
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .unwrap_or_default();

        let term = coerce_term(value.get("term"));
        let fields = coerce_fields(value.get("fields"));
        let start_date = coerce_date(value.get("startDate"));
        let end_date = coerce_date(value.get("endDate"));
        let url = coerce_url(value.get("url"));

        let mut schedule = self.coerce_schedule(&id, value.get("schedule"));

        // A missing title is a structural failure: the record stays visible
        // but carries no meetings.
        if title.is_empty() && !schedule.is_empty() {
            debug!("record {id}: missing title, clearing schedule");
            schedule.clear();
        }

        CourseRecord {
            id,
            title,
            term,
            fields,
            schedule,
            start_date,
            end_date,
            url,
        }
    }

    /// Validates every schedule entry; if any entry is malformed the entire
    /// schedule is replaced with an empty list.
    fn coerce_schedule(&self, id: &str, value: Option<&Value>) -> Vec<TimeSlot> {
        let entries = match value {
            None | Some(Value::Null) => return Vec::new(),
            Some(Value::Array(entries)) => entries,
            Some(_) => {
                debug!("record {id}: schedule is not a list, clearing schedule");
                return Vec::new();
            }
        };

        let mut slots = Vec::with_capacity(entries.len());
        for entry in entries {
            match self.coerce_slot(entry) {
                Some(slot) => slots.push(slot),
                None => {
                    debug!("record {id}: invalid schedule entry, clearing schedule");
                    return Vec::new();
                }
            }
        }
        slots
    }

    fn coerce_slot(&self, value: &Value) -> Option<TimeSlot> {
        let day = Weekday::parse(value.get("day")?.as_str()?)?;
        let from_time = self.coerce_time(value.get("fromTime")?)?;
        let to_time = self.coerce_time(value.get("toTime")?)?;
        if from_time >= to_time {
            return None;
        }
        let location = value.get("location")?.as_str()?.trim();
        if location.is_empty() {
            return None;
        }
        Some(TimeSlot {
            day,
            from_time,
            to_time,
            location: location.to_string(),
        })
    }

    fn coerce_time(&self, value: &Value) -> Option<ClockTime> {
        let text = value.as_str()?.trim();
        if !self.time_re.is_match(text) {
            return None;
        }
        ClockTime::parse(text)
    }

    /// Distinct field labels across the catalog: the configured priority
    /// group first (in configured order), then the rest lexically.
    fn field_vocabulary(&self, records: &[CourseRecord]) -> Vec<String> {
        let distinct: BTreeSet<&String> = records.iter().flat_map(|r| &r.fields).collect();

        let mut vocabulary: Vec<String> = self
            .priority_fields
            .iter()
            .filter(|f| distinct.contains(f))
            .cloned()
            .collect();
        for field in distinct {
            if !self.priority_fields.contains(field) {
                vocabulary.push(field.clone());
            }
        }
        vocabulary
    }
}

fn coerce_id(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => UNKNOWN_ID.to_string(),
    }
}

fn coerce_term(value: Option<&Value>) -> i32 {
    match value {
        Some(Value::Number(n)) => n.as_i64().map(|t| t as i32).unwrap_or(TERM_YEARLY),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(TERM_YEARLY),
        _ => TERM_YEARLY,
    }
}

fn coerce_fields(value: Option<&Value>) -> BTreeSet<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => {
            BTreeSet::from([s.trim().to_string()])
        }
        _ => BTreeSet::new(),
    }
}

fn coerce_date(value: Option<&Value>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value?.as_str()?.trim(), "%Y-%m-%d").ok()
}

fn coerce_url(value: Option<&Value>) -> Option<String> {
    let text = value?.as_str()?.trim();
    url::Url::parse(text).ok().map(|_| text.to_string())
}
