//! Time-conflict predicates.
//!
//! Pure and stateless; both the filter engine and the layout engine's
//! clustering step are built on these.

use crate::catalog::{Catalog, CourseRecord, TimeSlot, TERM_YEARLY};
use crate::selection::SelectionStore;

/// Two terms can conflict iff they are the same term or either is the
/// reserved yearly term, which is active in every concrete term.
pub fn terms_compatible(a: i32, b: i32) -> bool {
    a == b || a == TERM_YEARLY || b == TERM_YEARLY
}

/// Same-day, half-open interval intersection. A slot ending exactly when
/// another starts does not overlap.
pub fn slots_overlap(a: &TimeSlot, b: &TimeSlot) -> bool {
    a.day == b.day && a.from_time < b.to_time && a.to_time > b.from_time
}

/// The full conflict predicate: day + time intersection + term
/// compatibility.
pub fn slots_conflict(a: &TimeSlot, a_term: i32, b: &TimeSlot, b_term: i32) -> bool {
    terms_compatible(a_term, b_term) && slots_overlap(a, b)
}

/// True iff any meeting of `course` conflicts with any meeting of any course
/// currently selected in any term list of the store. Selected ids are
/// rehydrated through the catalog; ids the catalog no longer knows are
/// skipped.
pub fn course_conflicts_with_selection(
    course: &CourseRecord,
    store: &SelectionStore,
    catalog: &Catalog,
) -> bool {
    store
        .terms()
        .values()
        .flatten()
        .filter_map(|id| catalog.get(id))
        .any(|picked| {
            course.schedule.iter().any(|slot| {
                picked
                    .schedule
                    .iter()
                    .any(|other| slots_conflict(slot, course.term, other, picked.term))
            })
        })
}
