//! Calendar layout engine.
//!
//! Converts the chosen time slots of a term into grid coordinates: five day
//! columns (Sunday = 1 .. Thursday = 5) and 15-minute rows counted from the
//! earliest displayed hour (09:00). Slots that conflict in time are clustered
//! and share their day column side by side via width/offset fractions.
//!
//! Clustering is the source behavior: each slot joins the first existing
//! group containing any slot it overlaps with (same day, intersecting times;
//! term compatibility does not gate visual clustering). This greedy
//! first-match rule is order-dependent for chains of partial overlaps and is
//! kept deliberately instead of a transitive-closure union.

use crate::catalog::{Catalog, ClockTime, CourseRecord, TimeSlot};
use crate::overlap::slots_overlap;
use crate::selection::SelectionStore;
use serde::Serialize;

/// Earliest displayed hour; row 1 starts here.
pub const BASE_HOUR: u8 = 9;

/// Minutes per grid row.
pub const ROW_MINUTES: i32 = 15;

/// Grid placement of one time slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutBlock {
    pub course_id: String,
    pub title: String,
    pub location: String,
    pub day_column: u8,
    pub start_row: i32,
    pub end_row: i32,
    pub from_time: ClockTime,
    pub to_time: ClockTime,
    /// 1/n for a group of n mutually displayed slots.
    pub width_fraction: f64,
    /// i/n for the i-th member of its group, in join order.
    pub offset_fraction: f64,
}

/// Lays out the schedule visible for `term`: the term's own selection plus
/// the yearly list. Every visible slot produces exactly one block.
pub fn layout_for_term(catalog: &Catalog, store: &SelectionStore, term: i32) -> Vec<LayoutBlock> {
    let courses: Vec<&CourseRecord> = store
        .visible_ids(term)
        .into_iter()
        .filter_map(|id| catalog.get(id))
        .collect();

    let slots: Vec<(&TimeSlot, &CourseRecord)> = courses
        .iter()
        .flat_map(|course| course.schedule.iter().map(move |slot| (slot, *course)))
        .collect();

    layout_slots(&slots)
}

/// Lays out an already-flattened slot list, preserving its order as the
/// clustering input order.
pub fn layout_slots(slots: &[(&TimeSlot, &CourseRecord)]) -> Vec<LayoutBlock> {
    let groups = group_slots(slots);

    let mut blocks = Vec::with_capacity(slots.len());
    for group in groups {
        let size = group.len() as f64;
        for (position, index) in group.into_iter().enumerate() {
            let (slot, course) = slots[index];
            blocks.push(LayoutBlock {
                course_id: course.id.clone(),
                title: course.title.clone(),
                location: slot.location.clone(),
                day_column: slot.day.column(),
                start_row: row_for(slot.from_time),
                end_row: row_for(slot.to_time),
                from_time: slot.from_time,
                to_time: slot.to_time,
                width_fraction: 1.0 / size,
                offset_fraction: position as f64 / size,
            });
        }
    }
    blocks
}

/// Greedy first-match grouping: scan open groups in order and join the first
/// one containing an overlapping slot, else open a new group. Returns slot
/// indices in join order.
fn group_slots(slots: &[(&TimeSlot, &CourseRecord)]) -> Vec<Vec<usize>> {
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for (index, (slot, _)) in slots.iter().enumerate() {
        let joined = groups.iter_mut().find(|group| {
            group
                .iter()
                .any(|&member| slots_overlap(slots[member].0, slot))
        });
        match joined {
            Some(group) => group.push(index),
            None => groups.push(vec![index]),
        }
    }
    groups
}

fn row_for(time: ClockTime) -> i32 {
    let offset = time.minutes() as i32 - BASE_HOUR as i32 * 60;
    offset.div_euclid(ROW_MINUTES) + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Weekday;
    use crate::selection::{MemorySnapshotStore, SelectionStore};
    use chrono::Duration;
    use std::collections::BTreeSet;

    fn slot(day: Weekday, from: (u8, u8), to: (u8, u8)) -> TimeSlot {
        TimeSlot {
            day,
            from_time: ClockTime::from_hm(from.0, from.1).unwrap(),
            to_time: ClockTime::from_hm(to.0, to.1).unwrap(),
            location: "Hall A".into(),
        }
    }

    fn course(id: &str, term: i32, slots: Vec<TimeSlot>) -> CourseRecord {
        CourseRecord {
            id: id.into(),
            title: id.into(),
            term,
            fields: BTreeSet::new(),
            schedule: slots,
            start_date: None,
            end_date: None,
            url: None,
        }
    }

    fn store() -> SelectionStore {
        SelectionStore::restore(
            Box::new(MemorySnapshotStore::default()),
            Duration::days(7),
            &[1, 2],
        )
    }

    fn assert_close(value: f64, expected: f64) {
        assert!(
            (value - expected).abs() < 1e-9,
            "expected {expected}, got {value}"
        );
    }

    #[test]
    fn test_row_computation() {
        // 09:00 is row 1; each row is 15 minutes.
        let nine = ClockTime::from_hm(9, 0).unwrap();
        let half_past_ten = ClockTime::from_hm(10, 30).unwrap();
        assert_eq!(row_for(nine), 1);
        assert_eq!(row_for(half_past_ten), 7);
    }

    #[test]
    fn test_row_before_base_hour_goes_negative() {
        // The formula is kept exact; clipping is the renderer's concern.
        let eight = ClockTime::from_hm(8, 0).unwrap();
        assert_eq!(row_for(eight), -3);
    }

    #[test]
    fn test_conflicting_pair_shares_column() {
        // Scenario: A on Sunday 09:00-10:00 and B on Sunday 09:30-10:30 are
        // rendered half-width, side by side.
        let a = course("A", 1, vec![slot(Weekday::Sunday, (9, 0), (10, 0))]);
        let b = course("B", 1, vec![slot(Weekday::Sunday, (9, 30), (10, 30))]);
        let catalog = Catalog::new(vec![a.clone(), b.clone()], vec![]);

        let mut store = store();
        store.add(&a);
        store.add(&b);
        assert_eq!(store.selected_for(1).len(), 2);

        let blocks = layout_for_term(&catalog, &store, 1);
        assert_eq!(blocks.len(), 2);

        let block_a = blocks.iter().find(|b| b.course_id == "A").unwrap();
        let block_b = blocks.iter().find(|b| b.course_id == "B").unwrap();
        assert_close(block_a.width_fraction, 0.5);
        assert_close(block_b.width_fraction, 0.5);
        assert_close(block_a.offset_fraction, 0.0);
        assert_close(block_b.offset_fraction, 0.5);
        assert_eq!(block_a.start_row, 1);
        assert_eq!(block_a.end_row, 5);
        assert_eq!(block_a.day_column, 1);
    }

    #[test]
    fn test_yearly_course_visible_in_every_term() {
        // Scenario: C under term 0 appears in the layout of term 1 and 2.
        let c = course("C", 0, vec![slot(Weekday::Monday, (14, 0), (15, 0))]);
        let catalog = Catalog::new(vec![c.clone()], vec![]);

        let mut store = store();
        store.add(&c);

        for term in [1, 2] {
            let blocks = layout_for_term(&catalog, &store, term);
            assert_eq!(blocks.len(), 1);
            assert_eq!(blocks[0].course_id, "C");
            assert_eq!(blocks[0].day_column, 2);
        }
    }

    #[test]
    fn test_every_slot_produces_one_block() {
        let a = course(
            "A",
            1,
            vec![
                slot(Weekday::Sunday, (9, 0), (10, 0)),
                slot(Weekday::Wednesday, (9, 0), (10, 0)),
            ],
        );
        let b = course("B", 1, vec![slot(Weekday::Sunday, (9, 30), (10, 30))]);
        let catalog = Catalog::new(vec![a.clone(), b.clone()], vec![]);

        let mut store = store();
        store.add(&a);
        store.add(&b);

        let blocks = layout_for_term(&catalog, &store, 1);
        assert_eq!(blocks.len(), 3);
    }

    #[test]
    fn test_group_widths_sum_to_one() {
        let slots_owned = [
            slot(Weekday::Sunday, (9, 0), (11, 0)),
            slot(Weekday::Sunday, (9, 30), (10, 30)),
            slot(Weekday::Sunday, (10, 0), (12, 0)),
            slot(Weekday::Monday, (9, 0), (10, 0)),
        ];
        let owner = course("X", 1, vec![]);
        let flattened: Vec<(&TimeSlot, &CourseRecord)> =
            slots_owned.iter().map(|s| (s, &owner)).collect();

        let blocks = layout_slots(&flattened);
        assert_eq!(blocks.len(), 4);

        // Sunday slots form one group of three, Monday one group of one.
        for block in &blocks {
            let group_size = (1.0 / block.width_fraction).round();
            assert_close(block.width_fraction * group_size, 1.0);
        }
    }

    #[test]
    fn test_non_overlapping_slots_get_full_width() {
        let a = course("A", 1, vec![slot(Weekday::Sunday, (9, 0), (10, 0))]);
        let b = course("B", 1, vec![slot(Weekday::Sunday, (10, 0), (11, 0))]);
        let catalog = Catalog::new(vec![a.clone(), b.clone()], vec![]);

        let mut store = store();
        store.add(&a);
        store.add(&b);

        let blocks = layout_for_term(&catalog, &store, 1);
        for block in &blocks {
            assert_close(block.width_fraction, 1.0);
            assert_close(block.offset_fraction, 0.0);
        }
    }

    #[test]
    fn test_cross_term_slots_cluster_visually() {
        // Term compatibility does not gate visual clustering: a yearly course
        // overlapping a term course shares the column.
        let a = course("A", 1, vec![slot(Weekday::Sunday, (9, 0), (10, 0))]);
        let y = course("Y", 0, vec![slot(Weekday::Sunday, (9, 30), (10, 30))]);
        let catalog = Catalog::new(vec![a.clone(), y.clone()], vec![]);

        let mut store = store();
        store.add(&a);
        store.add(&y);

        let blocks = layout_for_term(&catalog, &store, 1);
        assert_eq!(blocks.len(), 2);
        for block in &blocks {
            assert_close(block.width_fraction, 0.5);
        }
    }

    #[test]
    fn test_chained_overlaps_merge_into_first_matching_group() {
        // A overlaps B, B overlaps C, but A and C do not overlap. With input
        // order A, B, C the greedy first-match rule puts all three in one
        // group: B joins A's group, then C finds B inside that same group.
        let slots_owned = [
            slot(Weekday::Sunday, (9, 0), (10, 0)),
            slot(Weekday::Sunday, (9, 30), (10, 30)),
            slot(Weekday::Sunday, (10, 15), (11, 0)),
        ];
        let owner = course("X", 1, vec![]);
        let flattened: Vec<(&TimeSlot, &CourseRecord)> =
            slots_owned.iter().map(|s| (s, &owner)).collect();

        let blocks = layout_slots(&flattened);
        assert_eq!(blocks.len(), 3);
        for block in &blocks {
            assert_close(block.width_fraction, 1.0 / 3.0);
        }
        let offsets: Vec<f64> = blocks.iter().map(|b| b.offset_fraction).collect();
        assert_close(offsets[0], 0.0);
        assert_close(offsets[1], 1.0 / 3.0);
        assert_close(offsets[2], 2.0 / 3.0);
    }
}
