/// Selection store: which course sections are chosen per term
mod snapshot;

pub use snapshot::{
    MemorySnapshotStore, Snapshot, SnapshotError, SnapshotStore, SqliteSnapshotStore,
};

use crate::catalog::{CourseRecord, TERM_YEARLY};
use chrono::{Duration, Utc};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// The mapping of term → chosen course ids, with an injected persistence
/// port.
///
/// Insertion order within a term list is preserved (first-picked-first-shown)
/// and no id appears twice in the same list. Every mutation is followed by a
/// best-effort snapshot write: a failed write is logged and never fails the
/// in-memory mutation.
pub struct SelectionStore {
    terms: BTreeMap<i32, Vec<String>>,
    store: Box<dyn SnapshotStore>,
}

impl SelectionStore {
    /// Restores the store from persisted state, or builds a default empty
    /// store when no snapshot exists, the snapshot is older than `ttl`, or
    /// storage is unreadable. The yearly term and every term in `base_terms`
    /// always have a (possibly empty) list.
    pub fn restore(store: Box<dyn SnapshotStore>, ttl: Duration, base_terms: &[i32]) -> Self {
        let mut terms = match store.load() {
            Ok(Some(snapshot)) => {
                if Utc::now() - snapshot.saved_at <= ttl {
                    snapshot.terms
                } else {
                    debug!("Ignoring stale selection snapshot from {}", snapshot.saved_at);
                    BTreeMap::new()
                }
            }
            Ok(None) => BTreeMap::new(),
            Err(e) => {
                warn!("Failed to restore selection snapshot: {e}");
                BTreeMap::new()
            }
        };

        terms.entry(TERM_YEARLY).or_default();
        for &term in base_terms {
            terms.entry(term).or_default();
        }

        Self { terms, store }
    }

    /// Adds a course to its term's list. No-op if the id is already present
    /// there. Returns whether the selection changed.
    pub fn add(&mut self, course: &CourseRecord) -> bool {
        let list = self.terms.entry(course.term).or_default();
        if list.iter().any(|id| id == &course.id) {
            return false;
        }
        list.push(course.id.clone());
        self.persist();
        true
    }

    /// Removes an id from the given term's list. Removing from an absent
    /// term, or an id that is not present, is a no-op rather than an error.
    pub fn remove(&mut self, id: &str, term: i32) -> bool {
        let Some(list) = self.terms.get_mut(&term) else {
            debug!("remove: term {term} has no selection list");
            return false;
        };
        let Some(position) = list.iter().position(|picked| picked == id) else {
            return false;
        };
        list.remove(position);
        self.persist();
        true
    }

    /// Empties one term's list. An absent term is a no-op.
    pub fn clear_term(&mut self, term: i32) {
        let Some(list) = self.terms.get_mut(&term) else {
            debug!("clear: term {term} has no selection list");
            return;
        };
        list.clear();
        self.persist();
    }

    /// Empties every term list, keeping the term structure.
    pub fn clear_all(&mut self) {
        for list in self.terms.values_mut() {
            list.clear();
        }
        self.persist();
    }

    /// All term lists, keyed by term.
    pub fn terms(&self) -> &BTreeMap<i32, Vec<String>> {
        &self.terms
    }

    /// The ids chosen for one term, in insertion order.
    pub fn selected_for(&self, term: i32) -> &[String] {
        self.terms.get(&term).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The ids visible when viewing `term`: the term's own list followed by
    /// the yearly list, which is active in every concrete term.
    pub fn visible_ids(&self, term: i32) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .selected_for(term)
            .iter()
            .map(String::as_str)
            .collect();
        if term != TERM_YEARLY {
            ids.extend(self.selected_for(TERM_YEARLY).iter().map(String::as_str));
        }
        ids
    }

    /// True iff the id is chosen in any term list.
    pub fn is_selected_anywhere(&self, id: &str) -> bool {
        self.terms.values().flatten().any(|picked| picked == id)
    }

    fn persist(&self) {
        let snapshot = Snapshot {
            saved_at: Utc::now(),
            terms: self.terms.clone(),
        };
        if let Err(e) = self.store.save(&snapshot) {
            warn!("Failed to persist selection snapshot: {e}");
        }
    }
}

impl std::fmt::Debug for SelectionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionStore")
            .field("terms", &self.terms)
            .finish()
    }
}
