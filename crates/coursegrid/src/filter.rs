//! Catalog filtering.
//!
//! A course is included iff every criteria dimension accepts it (AND across
//! dimensions); within `days` and `fields` membership is an OR over the
//! selected values. Empty dimensions accept everything.

use crate::catalog::{Catalog, ClockTime, CourseRecord, Weekday};
use crate::overlap::course_conflicts_with_selection;
use crate::selection::SelectionStore;
use serde::Deserialize;
use std::collections::BTreeSet;

/// A transient browse query. Never persisted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    /// Case-insensitive substring match against course id or title.
    pub search: String,
    pub term: Option<i32>,
    pub days: BTreeSet<Weekday>,
    pub fields: BTreeSet<String>,
    /// Earliest acceptable start time; satisfied by any one meeting.
    pub min_from_time: Option<ClockTime>,
    /// Exclude courses conflicting with the current selection.
    pub hide_conflicting: bool,
}

/// Evaluates the criteria against the whole catalog.
pub fn evaluate<'a>(
    catalog: &'a Catalog,
    criteria: &FilterCriteria,
    store: &SelectionStore,
) -> Vec<&'a CourseRecord> {
    catalog
        .records()
        .iter()
        .filter(|course| matches_criteria(course, criteria))
        .filter(|course| {
            !criteria.hide_conflicting || !course_conflicts_with_selection(course, store, catalog)
        })
        .collect()
}

/// Catalog courses not yet picked in any term list, for offering in search
/// completions without re-offering chosen courses.
pub fn available_for_picking<'a>(
    catalog: &'a Catalog,
    store: &SelectionStore,
) -> Vec<&'a CourseRecord> {
    catalog
        .records()
        .iter()
        .filter(|course| !store.is_selected_anywhere(&course.id))
        .collect()
}

fn matches_criteria(course: &CourseRecord, criteria: &FilterCriteria) -> bool {
    matches_search(course, &criteria.search)
        && criteria.term.map_or(true, |term| course.term == term)
        && matches_days(course, &criteria.days)
        && matches_fields(course, &criteria.fields)
        && matches_min_from_time(course, criteria.min_from_time)
}

fn matches_search(course: &CourseRecord, search: &str) -> bool {
    if search.is_empty() {
        return true;
    }
    let needle = search.to_lowercase();
    course.id.to_lowercase().contains(&needle) || course.title.to_lowercase().contains(&needle)
}

fn matches_days(course: &CourseRecord, days: &BTreeSet<Weekday>) -> bool {
    days.is_empty() || course.schedule.iter().any(|slot| days.contains(&slot.day))
}

fn matches_fields(course: &CourseRecord, fields: &BTreeSet<String>) -> bool {
    fields.is_empty() || course.fields.iter().any(|field| fields.contains(field))
}

fn matches_min_from_time(course: &CourseRecord, threshold: Option<ClockTime>) -> bool {
    match threshold {
        None => true,
        Some(earliest) => course
            .schedule
            .iter()
            .any(|slot| slot.from_time >= earliest),
    }
}
