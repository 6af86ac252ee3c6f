//! Calendar export and import.
//!
//! Chosen courses flatten into one weekly-recurring event per meeting slot,
//! bounded by the course's recurrence window, in iCalendar text form for
//! external calendar tools. Parsing previously exported text reconstructs
//! the same event records.

use crate::catalog::{ClockTime, CourseRecord, Weekday};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

const DATETIME_FORMAT: &str = "%Y%m%dT%H%M%S";
const DATE_FORMAT: &str = "%Y%m%d";

/// One weekly recurring calendar event derived from a meeting slot.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub summary: String,
    pub description: String,
    pub location: String,
    pub day: Weekday,
    /// First occurrence of the meeting.
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Last calendar date the weekly recurrence repeats within.
    pub repeat_until: NaiveDate,
}

#[derive(Debug, Error)]
pub enum IcsError {
    #[error("Event is missing {0}")]
    MissingField(&'static str),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid recurrence rule: {0}")]
    InvalidRule(String),
}

/// Flattens chosen courses into calendar events: one per `TimeSlot`, skipping
/// courses without a recurrence window (they have no dates to repeat within).
pub fn events_for_courses(courses: &[&CourseRecord]) -> Vec<CalendarEvent> {
    let mut events = Vec::new();
    for course in courses {
        let (Some(start_date), Some(end_date)) = (course.start_date, course.end_date) else {
            continue;
        };
        for slot in &course.schedule {
            let first = first_occurrence_on_or_after(start_date, slot.day);
            events.push(CalendarEvent {
                summary: course.title.clone(),
                description: format!("Course ID: {}", course.id),
                location: slot.location.clone(),
                day: slot.day,
                start: first.and_time(to_naive_time(slot.from_time)),
                end: first.and_time(to_naive_time(slot.to_time)),
                repeat_until: end_date,
            });
        }
    }
    events
}

/// Serializes events as an iCalendar document.
pub fn write_ics(events: &[CalendarEvent]) -> String {
    let mut out = String::new();
    out.push_str("BEGIN:VCALENDAR\r\n");
    out.push_str("VERSION:2.0\r\n");
    out.push_str("PRODID:-//coursegrid//EN\r\n");
    for event in events {
        out.push_str("BEGIN:VEVENT\r\n");
        out.push_str(&format!("SUMMARY:{}\r\n", event.summary));
        out.push_str(&format!("DESCRIPTION:{}\r\n", event.description));
        out.push_str(&format!("LOCATION:{}\r\n", event.location));
        out.push_str(&format!(
            "DTSTART:{}\r\n",
            event.start.format(DATETIME_FORMAT)
        ));
        out.push_str(&format!("DTEND:{}\r\n", event.end.format(DATETIME_FORMAT)));
        out.push_str(&format!(
            "RRULE:FREQ=WEEKLY;BYDAY={};UNTIL={}T000000Z\r\n",
            event.day.byday_code(),
            event.repeat_until.format(DATE_FORMAT)
        ));
        out.push_str("END:VEVENT\r\n");
    }
    out.push_str("END:VCALENDAR\r\n");
    out
}

/// Parses an iCalendar document previously produced by `write_ics` back into
/// event records.
pub fn parse_ics(text: &str) -> Result<Vec<CalendarEvent>, IcsError> {
    let mut events = Vec::new();
    let mut draft: Option<EventDraft> = None;

    for line in text.lines() {
        let line = line.trim_end_matches('\r');
        match line {
            "BEGIN:VEVENT" => draft = Some(EventDraft::default()),
            "END:VEVENT" => {
                if let Some(finished) = draft.take() {
                    events.push(finished.finish()?);
                }
            }
            _ => {
                let Some(current) = draft.as_mut() else {
                    continue;
                };
                if let Some((key, value)) = line.split_once(':') {
                    current.set(key, value)?;
                }
            }
        }
    }

    Ok(events)
}

/// Moves a recurrence start date forward to the first occurrence of the
/// meeting's weekday.
fn first_occurrence_on_or_after(date: NaiveDate, day: Weekday) -> NaiveDate {
    let current = date.weekday().num_days_from_sunday();
    let target = day.days_from_sunday();
    let days_ahead = (target + 7 - current) % 7;
    date + Duration::days(days_ahead as i64)
}

fn to_naive_time(time: ClockTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour as u32, time.minute as u32, 0).unwrap()
}

#[derive(Default)]
struct EventDraft {
    summary: Option<String>,
    description: Option<String>,
    location: Option<String>,
    day: Option<Weekday>,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
    repeat_until: Option<NaiveDate>,
}

impl EventDraft {
    fn set(&mut self, key: &str, value: &str) -> Result<(), IcsError> {
        match key {
            "SUMMARY" => self.summary = Some(value.to_string()),
            "DESCRIPTION" => self.description = Some(value.to_string()),
            "LOCATION" => self.location = Some(value.to_string()),
            "DTSTART" => self.start = Some(parse_datetime(value)?),
            "DTEND" => self.end = Some(parse_datetime(value)?),
            "RRULE" => self.set_rule(value)?,
            _ => {}
        }
        Ok(())
    }

    fn set_rule(&mut self, value: &str) -> Result<(), IcsError> {
        for part in value.split(';') {
            match part.split_once('=') {
                Some(("BYDAY", code)) => {
                    self.day = Some(
                        Weekday::from_byday_code(code)
                            .ok_or_else(|| IcsError::InvalidRule(value.to_string()))?,
                    );
                }
                Some(("UNTIL", stamp)) => {
                    let date = stamp
                        .split_once('T')
                        .map(|(d, _)| d)
                        .unwrap_or(stamp);
                    self.repeat_until = Some(
                        NaiveDate::parse_from_str(date, DATE_FORMAT)
                            .map_err(|_| IcsError::InvalidRule(value.to_string()))?,
                    );
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn finish(self) -> Result<CalendarEvent, IcsError> {
        Ok(CalendarEvent {
            summary: self.summary.ok_or(IcsError::MissingField("SUMMARY"))?,
            description: self
                .description
                .ok_or(IcsError::MissingField("DESCRIPTION"))?,
            location: self.location.ok_or(IcsError::MissingField("LOCATION"))?,
            day: self.day.ok_or(IcsError::MissingField("RRULE BYDAY"))?,
            start: self.start.ok_or(IcsError::MissingField("DTSTART"))?,
            end: self.end.ok_or(IcsError::MissingField("DTEND"))?,
            repeat_until: self
                .repeat_until
                .ok_or(IcsError::MissingField("RRULE UNTIL"))?,
        })
    }
}

fn parse_datetime(value: &str) -> Result<NaiveDateTime, IcsError> {
    NaiveDateTime::parse_from_str(value, DATETIME_FORMAT)
        .map_err(|_| IcsError::InvalidTimestamp(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TimeSlot;
    use std::collections::BTreeSet;

    fn course_with_window(id: &str, slots: Vec<TimeSlot>) -> CourseRecord {
        CourseRecord {
            id: id.into(),
            title: format!("Course {id}"),
            term: 1,
            fields: BTreeSet::new(),
            schedule: slots,
            start_date: NaiveDate::from_ymd_opt(2026, 10, 28),
            end_date: NaiveDate::from_ymd_opt(2027, 1, 22),
            url: None,
        }
    }

    fn slot(day: Weekday, from: (u8, u8), to: (u8, u8)) -> TimeSlot {
        TimeSlot {
            day,
            from_time: ClockTime::from_hm(from.0, from.1).unwrap(),
            to_time: ClockTime::from_hm(to.0, to.1).unwrap(),
            location: "Hall A".into(),
        }
    }

    #[test]
    fn test_first_occurrence_moves_forward_to_weekday() {
        // 2026-10-28 is a Wednesday.
        let window_start = NaiveDate::from_ymd_opt(2026, 10, 28).unwrap();
        assert_eq!(
            first_occurrence_on_or_after(window_start, Weekday::Sunday),
            NaiveDate::from_ymd_opt(2026, 11, 1).unwrap()
        );
        assert_eq!(
            first_occurrence_on_or_after(window_start, Weekday::Wednesday),
            window_start
        );
        assert_eq!(
            first_occurrence_on_or_after(window_start, Weekday::Thursday),
            NaiveDate::from_ymd_opt(2026, 10, 29).unwrap()
        );
    }

    #[test]
    fn test_one_event_per_slot() {
        let course = course_with_window(
            "CS101",
            vec![
                slot(Weekday::Sunday, (9, 0), (10, 30)),
                slot(Weekday::Tuesday, (14, 0), (15, 0)),
            ],
        );
        let events = events_for_courses(&[&course]);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].description, "Course ID: CS101");
        assert_eq!(
            events[0].start,
            NaiveDate::from_ymd_opt(2026, 11, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap()
        );
        assert_eq!(events[1].day, Weekday::Tuesday);
    }

    #[test]
    fn test_course_without_window_produces_no_events() {
        let mut course = course_with_window("X", vec![slot(Weekday::Sunday, (9, 0), (10, 0))]);
        course.end_date = None;
        assert!(events_for_courses(&[&course]).is_empty());
    }

    #[test]
    fn test_written_document_contains_recurrence() {
        let course = course_with_window("CS101", vec![slot(Weekday::Sunday, (9, 0), (10, 30))]);
        let text = write_ics(&events_for_courses(&[&course]));
        assert!(text.starts_with("BEGIN:VCALENDAR"));
        assert!(text.contains("DTSTART:20261101T090000"));
        assert!(text.contains("RRULE:FREQ=WEEKLY;BYDAY=SU;UNTIL=20270122T000000Z"));
        assert!(text.trim_end().ends_with("END:VCALENDAR"));
    }

    #[test]
    fn test_roundtrip_reconstructs_events() {
        let courses = [
            course_with_window(
                "CS101",
                vec![
                    slot(Weekday::Sunday, (9, 0), (10, 30)),
                    slot(Weekday::Wednesday, (16, 0), (18, 0)),
                ],
            ),
            course_with_window("HIST20", vec![slot(Weekday::Monday, (12, 0), (13, 0))]),
        ];
        let refs: Vec<&CourseRecord> = courses.iter().collect();
        let events = events_for_courses(&refs);

        let parsed = parse_ics(&write_ics(&events)).unwrap();
        assert_eq!(parsed, events);
    }

    #[test]
    fn test_parse_rejects_event_without_start() {
        let text = "BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nSUMMARY:X\r\nDESCRIPTION:Y\r\nLOCATION:Z\r\nRRULE:FREQ=WEEKLY;BYDAY=SU;UNTIL=20270122T000000Z\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";
        assert!(matches!(
            parse_ics(text),
            Err(IcsError::MissingField("DTSTART"))
        ));
    }

    #[test]
    fn test_parse_ignores_unknown_properties() {
        let course = course_with_window("CS101", vec![slot(Weekday::Sunday, (9, 0), (10, 30))]);
        let events = events_for_courses(&[&course]);
        let text = write_ics(&events).replace(
            "BEGIN:VEVENT",
            "BEGIN:VEVENT\r\nUID:ignored@example",
        );
        assert_eq!(parse_ics(&text).unwrap(), events);
    }
}
